//! `actloop run`: run one task and print its progress.

use std::io::Write;
use std::sync::Arc;

use actloop_agent::{AgentEvent, AgentLoop, EventSink, RunStatus};
use actloop_config::AppConfig;

pub async fn run(
    task: String,
    max_iterations: Option<u32>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early, give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ACTLOOP_API_KEY=...   (preferred)");
        eprintln!("    OPENAI_API_KEY=...    (fallback)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = actloop_providers::build_from_config(&config)?;
    let tools = Arc::new(actloop_tools::default_registry(&config.tools)?);
    let mut agent = AgentLoop::from_config(provider, tools, &config);
    if let Some(max) = max_iterations {
        agent = agent.with_max_iterations(max);
    }

    let (sink, printer) = if quiet {
        (EventSink::disabled(), None)
    } else {
        let (sink, mut rx) = EventSink::channel(config.agent.event_buffer);
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                print_event(&event);
            }
        });
        (sink, Some(printer))
    };

    let outcome = agent.run_with_events(&task, &sink).await;
    drop(sink);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    tracing::info!(
        status = ?outcome.status,
        iterations = outcome.iterations,
        messages = outcome.memory.len(),
        "Run complete"
    );
    println!("{}", outcome.result);
    if outcome.status == RunStatus::Failed {
        return Err(outcome.result.into());
    }
    Ok(())
}

fn print_event(event: &AgentEvent) {
    let mut out = std::io::stdout().lock();
    let _ = match event {
        AgentEvent::ThinkingStream { content } => write!(out, "{content}"),
        AgentEvent::ThinkingComplete { .. } => writeln!(out),
        AgentEvent::ToolCall { name, arguments } => writeln!(out, "  -> {name} {arguments}"),
        AgentEvent::ToolResult { content } => writeln!(out, "  <- {content}\n"),
        AgentEvent::Error { message } => writeln!(out, "  [error] {message}"),
        _ => Ok(()),
    };
    let _ = out.flush();
}
