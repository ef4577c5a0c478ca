//! Tolk - console LLM agents
//!
//! Three small agents built on one tool-calling loop.
//!
//! The name "Tolk" comes from the Norwegian word for "interpreter."
//!
//! # Overview
//!
//! Tolk allows you to:
//! - Chat with a model that remembers the whole session, saved to a log on exit
//! - Ask questions about a PDF, answered from retrieved passages
//! - Watch the model solve arithmetic by calling add, subtract and multiply tools
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `message` - Conversation messages and tool call requests
//! - `llm` - Chat model abstraction (OpenAI and scripted)
//! - `tools` - Tool trait, registry and arithmetic tools
//! - `agent` - The AskModel / RunTools / Done loop
//! - `chat` - Chat loop agent with transcript log
//! - `chunking` - Recursive character text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction
//! - `ingest` - PDF loading and index building
//! - `rag` - Retriever tool and RAG agent
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tolk::agent::Agent;
//! use tolk::llm::OpenAIChatModel;
//! use tolk::message::{Conversation, Message};
//! use tolk::tools::arithmetic_registry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = Arc::new(OpenAIChatModel::new("gpt-4o-mini")?);
//!     let agent = Agent::new(model, arithmetic_registry());
//!
//!     let mut conversation = Conversation::new();
//!     conversation.push(Message::user("Add 40 + 12 and then multiply the result by 6"));
//!
//!     let run = agent.run(conversation).await?;
//!     println!("{}", run.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod chat;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod console;
pub mod context;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod message;
pub mod openai;
pub mod rag;
pub mod tools;
pub mod vector_store;

pub use error::{Result, TolkError};
