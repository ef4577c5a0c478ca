//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod rag;
mod tools;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use rag::run_rag;
pub use tools::run_tools;
