pub mod cli;
pub mod compose;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod llm;
pub mod process;
pub mod review;
pub mod ui;
pub mod warning;

pub use error::{GupError, LlmError, Result};
