//! Command-line interface module.

mod args;
pub mod clean;
mod common;
pub mod run;

pub use args::{Cli, Commands, RunArgs};
