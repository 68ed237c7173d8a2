//! Causerie is a terminal-first chat interface with a stubbed reply backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation session (ordered message log, send
//!   protocol, pending guard), the input editor, and configuration.
//! - [`ui`] renders the transcript and runs the interactive event loop that
//!   drives user input and display updates.
//! - [`api`] defines the [`api::ReplyProvider`] contract and the concrete
//!   transports (local file, HTTP resource) that stand in for a real backend.
//! - [`utils`] hosts scroll tracking, syntax highlighting, and logging.
//!
//! The runtime entrypoint lives in the binary crate (`src/main.rs`) and
//! routes through [`crate::cli::run`], which dispatches into
//! [`ui::chat_loop`] for the interactive session.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
