// CLI module - command line interface
pub mod args;

pub use args::Args;
