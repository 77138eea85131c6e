use crate::lexer::LexingError;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failure recorded on a [`Proc`](crate::Proc).
///
/// Errors are never raised by the runner itself; they are stored on the
/// process record and read back through [`Proc::err`](crate::Proc::err).
#[derive(Debug, Error)]
pub enum ProcError {
    /// The word splitter rejected the command line.
    #[error("cannot split command '{command}': {source}")]
    Split {
        command: String,
        #[source]
        source: LexingError,
    },

    /// The command line contained no words.
    #[error("empty command")]
    EmptyCommand,

    /// The OS could not spawn the executable.
    #[error("failed to start '{program}': {source}")]
    Start {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting on the child or draining its output failed.
    #[error("failed to wait for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The child terminated with a non-success status.
    #[error("'{command}' failed: {status}")]
    Exit { command: String, status: ExitStatus },
}

/// Failure recorded on a [`FileWriter`](crate::FileWriter).
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The payload was only partly written; the file is left as is.
    #[error("write to {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    /// Underlying I/O error, whichever step produced it.
    pub fn io_error(&self) -> &io::Error {
        match self {
            WriteError::Open { source, .. }
            | WriteError::Stat { source, .. }
            | WriteError::Write { source, .. } => source,
        }
    }
}
