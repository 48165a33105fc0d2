//! Local REPL: one message per line on stdin, the reply and its stage on stdout.
//! Handy for tuning the corpus and thresholds without the HTTP layer.

use std::io::{self, BufRead, Write};

use otobot::config::AssistantConfig;
use otobot::{ChatRequest, Engine};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let engine = Engine::from_config(AssistantConfig::load()?);
    println!(
        "{} pronto ({} domande nel corpus). Ctrl-D per uscire.",
        engine.config().assistant.name,
        engine.corpus().len()
    );

    let stdin = io::stdin();
    let mut out = io::stdout();
    write!(out, "> ")?;
    out.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let reply = engine.reply(&ChatRequest::text(line)).await;
        writeln!(out, "[{}] {}", reply.stage.as_str(), reply.text)?;
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}
