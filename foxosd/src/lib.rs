//! # FoxOS Host Runtime
//!
//! Runs the FoxOS shell as a host process.
//!
//! ## Responsibilities
//!
//! The host runtime:
//! - Boots the namespace table and restores it from a disk image file
//! - Feeds scripted keys or stdin lines through the line editor into the shell
//! - Saves the table whenever a command changed it, and on `sync`
//! - Prints shell output to stdout and structured logs to stderr
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Provide terminal emulation beyond clearing the screen
//! - Share the disk image between processes
//! - Repair damaged images; it refuses to boot from them

pub mod disk;
pub mod input_script;
pub mod output;
pub mod runtime;

pub use disk::FileDisk;
pub use input_script::{InputScript, InputScriptError};
pub use output::{StderrLog, StdoutConsole};
pub use runtime::{HostRuntime, HostRuntimeConfig, HostRuntimeError, RunSummary};
