//! Line-oriented shell over the planner services.

pub mod commands;
pub mod output;
pub mod shell;

pub use shell::run_cli;

use thiserror::Error;

use crate::errors::PlannerError;

/// Fatal shell failure.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] PlannerError),
    #[error("Terminal error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single command; reported and the shell keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(String),
    #[error("{0}")]
    Planner(#[from] PlannerError),
}
