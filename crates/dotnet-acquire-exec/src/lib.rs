//! Command execution with elevation handling, probing, memoization and test
//! observation (spec §4.4).

mod command;
mod elevation;
mod error;
mod executor;
mod runner;

pub use command::{Command, CommandResult, ExecuteOptions};
pub use elevation::{is_wsl, AlwaysGrantElevation, ElevationPrompt};
pub use error::{ExecError, Result};
pub use executor::CommandExecutor;
pub use runner::{ProcessRunner, TokioProcessRunner};
