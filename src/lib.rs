//! Scripting helpers: run external commands, write files.
//!
//! The crate offers two building blocks that share one error style: nothing
//! fails loudly, every failure is recorded on the returned object and read
//! back when the caller is ready.
//!
//! - [`Echo`] runs external commands. It normalizes the command line, expands
//!   `$NAME`/`${NAME}` references from its variable table, splits the line
//!   into words, spawns the program with stdout and stderr captured into one
//!   buffer, and keeps every resulting [`Proc`] in a process table.
//! - [`FileWriter`] writes strings, lines, bytes or a whole reader into a file,
//!   truncating or appending, and keeps the first error and the latest file
//!   metadata.
//!
//! The word splitter, the variable resolver and the log/panic hooks are
//! pluggable; see the traits in [`command`].

pub mod command;
pub mod config;
pub mod env;
mod error;
mod expand;
mod external;
pub mod fs;
pub mod lexer;
mod proc;
mod repl;
mod runner;

pub use config::Config;
pub use error::{ProcError, WriteError};
pub use expand::expand;
pub use fs::{FileWriter, OpenMode};
pub use proc::Proc;
pub use runner::{Echo, normalize};
