//! RAG command: ingest the PDF, then answer questions about it.

use crate::chunking::ChunkingConfig;
use crate::cli::preflight::{self, Operation};
use crate::cli::printer::RetrievalPrinter;
use crate::cli::Output;
use crate::config::Settings;
use crate::console::{next_input, Input};
use crate::context::AgentContext;
use crate::error::Result;
use crate::ingest::IngestionPipeline;
use crate::rag::{RagAgent, RetrieverTool};
use console::style;
use std::io::{self, Write};
use tracing::info;

/// Run the RAG command.
pub async fn run_rag(
    pdf: Option<String>,
    model: Option<String>,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let pdf_path = match pdf {
        Some(path) => Settings::expand_path(&path),
        None => settings.pdf_path(),
    };

    if let Err(e) = preflight::check(Operation::Rag { pdf: &pdf_path }) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tolk doctor' for detailed diagnostics.");
        std::process::exit(1);
    }

    let top_k = top_k.unwrap_or(settings.rag.top_k);
    let chunking = ChunkingConfig::new(settings.rag.chunk_size, settings.rag.chunk_overlap)?;

    let context = AgentContext::from_settings(settings, model)?;
    let embedder = context.embedder()?;
    let store = context.vector_store()?;

    let pipeline = IngestionPipeline::new(embedder.clone(), store.clone(), chunking);
    let spinner = Output::spinner(&format!("Indexing {}...", pdf_path.display()));
    let report = pipeline.ingest_pdf(&pdf_path).await;
    spinner.finish_and_clear();
    let report = report?;

    Output::success(&format!(
        "Indexed {} into collection '{}' ({} chunks, {} characters)",
        report.source, context.settings.rag.collection, report.chunks, report.characters
    ));
    info!("Index dimensions: {}", report.dimensions);

    let retriever = RetrieverTool::new(embedder, store, top_k, &report.source);
    let agent = RagAgent::new(
        context.model.clone(),
        retriever,
        &context.prompts,
        &report.source,
        context.settings.agent.max_iterations,
    )?;

    println!("\n{}", style("=== RAG AGENT ===").bold().cyan());

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();
    let mut printer = RetrievalPrinter;

    loop {
        let question = match next_input(&mut reader, &mut stdout, "\nWhat is your question: ")? {
            Input::Line(line) => line,
            Input::Exit => break,
        };

        let run = agent.ask(&question, &mut printer).await?;

        println!("\n{}", style("=== ANSWER ===").bold());
        println!("{}", run.answer);
        stdout.flush()?;
    }

    Ok(())
}
