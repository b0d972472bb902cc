//! CLI modules for the mynah evaluation tool.

pub mod cli;
pub mod config;
pub mod run;
pub mod score;
