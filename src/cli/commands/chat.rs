//! Chat command: a conversation with memory, saved to a log on exit.

use crate::chat::ChatSession;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::context::AgentContext;
use crate::error::Result;
use console::style;
use std::io::{self, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, log: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tolk doctor' for detailed diagnostics.");
        std::process::exit(1);
    }

    let log_path = match log {
        Some(path) => Settings::expand_path(&path),
        None => settings.chat_log_path(),
    };

    let context = AgentContext::from_settings(settings, model)?;
    let mut session = ChatSession::new(context.model.clone(), context.prompts.chat.system.as_deref());

    println!("\n{}", style("Tolk Chat").bold().cyan());
    println!("{}\n", style("Type your message, or 'exit' to quit.").dim());

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();
    let prompt = format!("{} ", style("Enter:").green().bold());

    // The log is written even when the session ends on an error.
    let result = session.run_console(&mut reader, &mut stdout, &prompt).await;
    stdout.flush()?;
    session.write_transcript(&log_path)?;
    result?;

    Output::success(&format!("Conversation saved to {}", log_path.display()));
    Ok(())
}
