//! Core domain models for Pipeline
//!
//! This module defines the step description, the prompt templates each step
//! kind resolves to, and the run-time execution records.

pub mod config;
pub mod prompt;
pub mod state;
pub mod step;

pub use state::*;
pub use step::*;
