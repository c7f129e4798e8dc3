pub mod args;
pub mod audio;
pub mod commands;
pub mod context;
pub mod logging;
pub mod render;
pub mod repl;
pub mod runner;

pub use args::Args;
pub use context::CliContext;
