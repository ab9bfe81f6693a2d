//! # typed-settings-cli
//!
//! Read and write a typed settings store from the shell.
//!
//! ## Usage
//!
//! ```bash
//! settings set age 42 --type int
//! settings get age --type double          # 42
//! settings get theme --default dark       # dark
//! settings --backend json set window '{"width":800}' --type json
//! settings list
//! settings remove age
//! ```
//!
//! The store lives under the platform configuration directory unless
//! `--store` names another one.

pub mod args;
pub mod commands;

pub use args::{BackendChoice, Cli, Command, ValueType};
pub use commands::{execute, CliError};
