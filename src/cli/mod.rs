pub mod args;
pub mod commands;

pub use args::{AggregateBy, Cli, Commands, OutputFormat};
pub use commands::run;
