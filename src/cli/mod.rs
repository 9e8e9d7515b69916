//! Command-line interface module.
//!
//! This module provides the CLI functionality for:
//! - Running completions against a vLLM model on Triton
//! - Probing server and model health

pub mod commands;
pub mod handlers;

pub use handlers::{handle_health, handle_infer};
