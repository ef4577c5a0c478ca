//! Tools command: the model solves arithmetic by calling tools.

use crate::agent::{Agent, LoopObserver};
use crate::cli::preflight::{self, Operation};
use crate::cli::printer::StepPrinter;
use crate::cli::Output;
use crate::config::Settings;
use crate::console::{next_input, Input};
use crate::context::AgentContext;
use crate::error::Result;
use crate::message::{Conversation, Message};
use crate::tools::arithmetic_registry;
use console::style;
use std::io::{self, Write};
use tracing::debug;

/// Run the tools command. Runs `task` once, or reads tasks interactively.
pub async fn run_tools(task: Option<String>, model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Tools) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tolk doctor' for detailed diagnostics.");
        std::process::exit(1);
    }

    let context = AgentContext::from_settings(settings, model)?;
    let agent = Agent::new(context.model.clone(), arithmetic_registry())
        .with_system_prompt(&context.prompts.tools.system)
        .with_max_iterations(context.settings.agent.max_iterations);

    if let Some(task) = task {
        return run_task(&agent, &task).await;
    }

    println!("\n{}", style("Tolk Tools").bold().cyan());
    println!(
        "{}\n",
        style(format!("Available tools: {}. Type 'exit' to quit.", agent.tools().names().join(", "))).dim()
    );

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();
    let prompt = format!("{} ", style("Enter:").green().bold());

    loop {
        let task = match next_input(&mut reader, &mut stdout, &prompt)? {
            Input::Line(line) => line,
            Input::Exit => break,
        };
        run_task(&agent, &task).await?;
        stdout.flush()?;
    }

    Ok(())
}

/// Run one task from a fresh conversation, printing every step.
async fn run_task(agent: &Agent, task: &str) -> Result<()> {
    let mut printer = StepPrinter::new();
    let message = Message::user(task);
    printer.on_message(&message);

    let mut conversation = Conversation::new();
    conversation.push(message);

    let run = agent.run_observed(conversation, &mut printer).await?;
    debug!("Task finished after {} iterations, {} tool calls", run.iterations, run.tool_calls.len());
    Ok(())
}
