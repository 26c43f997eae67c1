//! # CLI Command Implementations
//!
//! Each subcommand of the `icon-mirror` command-line tool lives in its own
//! file. A command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `icon_mirror` library.

pub mod run;
pub mod validate;
