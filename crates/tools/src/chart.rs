//! create_echarts_visualization: render data as a standalone ECharts HTML page.
//!
//! Input data may be an object (`{"A": 10}`), an array of numbers, an array
//! of `{name, value}` items, an array of `[x, y]` pairs or `{x, y}` points,
//! or any of those encoded as a JSON string. It is normalized per chart type,
//! turned into an ECharts option and written into the workspace.

use std::sync::Arc;

use async_trait::async_trait;
use actloop_core::error::ToolError;
use actloop_core::tool::{Tool, ToolDefinition};
use actloop_core::Arguments;
use serde_json::{Value, json};
use tracing::debug;

use crate::workspace::Workspace;
use crate::{resolve, str_arg};

const NAME: &str = "create_echarts_visualization";

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5.4.3/dist/echarts.min.js";

pub struct ChartTool {
    workspace: Arc<Workspace>,
}

impl ChartTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ChartTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            NAME,
            "Create an interactive ECharts HTML visualization from data and a chart type",
        )
        .required(
            "data",
            "Chart data: an object, a list, or a JSON string",
        )
        .required(
            "chart_type",
            "Chart type: bar, line, pie or scatter",
        )
        .required("output_filename", "Output HTML file name (relative to the workspace)")
        .optional("title", "Chart title (optional)")
        .optional("x_axis_name", "X axis name (optional)")
        .optional("y_axis_name", "Y axis name (optional)")
        .optional(
            "theme",
            "Page theme: light, dark, vintage, roma, shine or infographic (optional, default light)",
        )
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let chart_type = str_arg(NAME, arguments, "chart_type")?.to_lowercase();
        let mut filename = str_arg(NAME, arguments, "output_filename")?.to_string();
        if !filename.ends_with(".html") {
            filename.push_str(".html");
        }
        let opt = |key: &str| arguments.get(key).and_then(Value::as_str).unwrap_or("");
        let title = opt("title");
        let x_axis_name = opt("x_axis_name");
        let y_axis_name = opt("y_axis_name");
        let theme = arguments
            .get("theme")
            .and_then(Value::as_str)
            .unwrap_or("light");

        let data = match arguments.get("data").cloned().unwrap_or(Value::Null) {
            Value::String(raw) => serde_json::from_str(&raw).map_err(|_| {
                ToolError::InvalidArguments("Invalid data format: could not parse JSON string".into())
            })?,
            other => other,
        };

        let processed = ChartData::from_value(&data, &chart_type);
        let option = chart_option(&chart_type, processed, title, x_axis_name, y_axis_name);
        let html = render_html(&option, &chart_title(title, &chart_type), theme);

        let path = resolve(NAME, &self.workspace, &filename)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, html).await?;
        debug!(path = %path.display(), chart_type = %chart_type, "Chart written");

        let mut result = format!("Successfully created {chart_type} chart: {filename}");
        if !title.is_empty() {
            result.push_str(&format!("\nTitle: {title}"));
        }
        result.push_str(&format!("\nFile path: {}", path.display()));
        Ok(result)
    }
}

/// Data normalized for one family of chart types.
#[derive(Debug, Clone, PartialEq)]
enum ChartData {
    /// bar / line: category labels and values
    Categories { labels: Vec<Value>, values: Vec<Value> },
    /// pie: `{name, value}` items
    Items(Vec<Value>),
    /// scatter: `[x, y]` pairs
    Points(Vec<Value>),
}

fn is_named_item(v: &Value) -> bool {
    v.get("name").is_some() && v.get("value").is_some()
}

impl ChartData {
    fn from_value(data: &Value, chart_type: &str) -> Self {
        match chart_type {
            "pie" => Self::items(data),
            "scatter" => Self::points(data),
            _ => Self::categories(data),
        }
    }

    fn categories(data: &Value) -> Self {
        match data {
            Value::Object(map) if !map.is_empty() => Self::Categories {
                labels: map.keys().map(|k| json!(k)).collect(),
                values: map.values().cloned().collect(),
            },
            Value::Array(items) if !items.is_empty() => {
                if is_named_item(&items[0]) {
                    Self::Categories {
                        labels: items.iter().map(|i| i["name"].clone()).collect(),
                        values: items.iter().map(|i| i["value"].clone()).collect(),
                    }
                } else {
                    Self::Categories {
                        labels: (1..=items.len()).map(|i| json!(format!("Item {i}"))).collect(),
                        values: items.clone(),
                    }
                }
            }
            _ => Self::Categories {
                labels: ["A", "B", "C", "D", "E"].iter().map(|l| json!(l)).collect(),
                values: [20, 30, 40, 50, 60].iter().map(|v| json!(v)).collect(),
            },
        }
    }

    fn items(data: &Value) -> Self {
        match data {
            Value::Object(map) if !map.is_empty() => Self::Items(
                map.iter()
                    .map(|(k, v)| json!({"name": k, "value": v}))
                    .collect(),
            ),
            Value::Array(items) if !items.is_empty() => {
                if is_named_item(&items[0]) {
                    Self::Items(items.clone())
                } else {
                    Self::Items(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, v)| json!({"name": format!("Category {}", i + 1), "value": v}))
                            .collect(),
                    )
                }
            }
            _ => Self::Items(
                [("A", 20), ("B", 30), ("C", 40), ("D", 50)]
                    .iter()
                    .map(|(n, v)| json!({"name": n, "value": v}))
                    .collect(),
            ),
        }
    }

    fn points(data: &Value) -> Self {
        match data {
            Value::Array(items) if !items.is_empty() => {
                let first = &items[0];
                if first.as_array().is_some_and(|p| p.len() >= 2) {
                    Self::Points(items.clone())
                } else if first.get("x").is_some() && first.get("y").is_some() {
                    Self::Points(
                        items
                            .iter()
                            .map(|p| json!([p["x"].clone(), p["y"].clone()]))
                            .collect(),
                    )
                } else {
                    Self::Points(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, v)| json!([i, v]))
                            .collect(),
                    )
                }
            }
            _ => Self::Points(
                [[10, 20], [15, 25], [20, 30], [25, 35], [30, 40]]
                    .iter()
                    .map(|p| json!(p))
                    .collect(),
            ),
        }
    }
}

fn chart_title(title: &str, chart_type: &str) -> String {
    if !title.is_empty() {
        return title.to_string();
    }
    let mut chars = chart_type.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    format!("{capitalized} Chart")
}

/// Build the ECharts option object.
fn chart_option(
    chart_type: &str,
    data: ChartData,
    title: &str,
    x_axis_name: &str,
    y_axis_name: &str,
) -> Value {
    let series_name = if y_axis_name.is_empty() { "Value" } else { y_axis_name };
    let mut option = json!({
        "title": { "text": chart_title(title, chart_type), "left": "center" },
        "tooltip": { "trigger": if chart_type == "pie" { "item" } else { "axis" } },
    });

    let body = match data {
        ChartData::Items(items) => json!({
            "legend": { "top": "10%" },
            "series": [{
                "name": "Data",
                "type": "pie",
                "radius": "50%",
                "data": items,
                "emphasis": {
                    "itemStyle": {
                        "shadowBlur": 10,
                        "shadowOffsetX": 0,
                        "shadowColor": "rgba(0, 0, 0, 0.5)"
                    }
                }
            }]
        }),
        ChartData::Points(points) => json!({
            "xAxis": { "type": "value", "name": x_axis_name },
            "yAxis": { "type": "value", "name": y_axis_name },
            "series": [{ "name": series_name, "type": "scatter", "data": points }]
        }),
        ChartData::Categories { labels, values } => {
            let series_type = if chart_type == "line" { "line" } else { "bar" };
            json!({
                "xAxis": { "type": "category", "data": labels, "name": x_axis_name },
                "yAxis": { "type": "value", "name": y_axis_name },
                "series": [{ "name": series_name, "type": series_type, "data": values }]
            })
        }
    };

    if let (Some(target), Value::Object(extra)) = (option.as_object_mut(), body) {
        target.extend(extra);
    }
    option
}

fn theme_style(theme: &str) -> &'static str {
    match theme {
        "dark" => "background-color: #2c3e50; color: #ecf0f1;",
        "vintage" => "background-color: #fef8e8; color: #8b4513;",
        "roma" => "background-color: #f5f5dc; color: #8b0000;",
        "shine" => "background-color: #f0f8ff; color: #4682b4;",
        "infographic" => "background-color: #f8f9fa; color: #495057;",
        _ => "background-color: #fff; color: #333;",
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the standalone page.
fn render_html(option: &Value, title: &str, theme: &str) -> String {
    let option_json = serde_json::to_string_pretty(option)
        .unwrap_or_else(|_| "{}".into())
        // keep a literal `</script>` in the data from closing the tag
        .replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{cdn}"></script>
    <style>
        body {{
            margin: 0;
            padding: 20px;
            font-family: Arial, sans-serif;
            {style}
        }}
        #chart {{
            width: 100%;
            height: 600px;
        }}
    </style>
</head>
<body>
    <div id="chart"></div>
    <script>
        var chartDom = document.getElementById('chart');
        var myChart = echarts.init(chartDom);
        var option = {option_json};
        myChart.setOption(option);
        window.addEventListener('resize', function() {{
            myChart.resize();
        }});
    </script>
</body>
</html>"#,
        title = escape_html(title),
        cdn = ECHARTS_CDN,
        style = theme_style(theme),
    )
}
