//! Library half of the `reelmatch` binary, split out so commands can be
//! driven from tests with an in-memory writer.
pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;

pub use cli::{Cli, Commands};
pub use commands::run;
