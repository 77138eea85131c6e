use crate::error::ProcError;
use crate::external;
use std::io::{PipeReader, Read};
use std::process::{Child, ExitStatus};
use tracing::{debug, warn};

/// Record of one command execution.
///
/// A `Proc` is created when the runner tries to start a command, whether or
/// not the start succeeded. A started process is finished by [`Proc::wait`],
/// which fills in the captured output and the exit status; after that the
/// record no longer changes.
///
/// Check [`Proc::err`] before trusting [`Proc::result`].
#[derive(Debug)]
pub struct Proc {
    command: String,
    id: Option<u32>,
    child: Option<Child>,
    reader: Option<PipeReader>,
    output: Vec<u8>,
    status: Option<ExitStatus>,
    error: Option<ProcError>,
}

impl Proc {
    pub(crate) fn started(command: String, child: Child, reader: PipeReader) -> Self {
        Self {
            command,
            id: Some(child.id()),
            child: Some(child),
            reader: Some(reader),
            output: Vec::new(),
            status: None,
            error: None,
        }
    }

    pub(crate) fn failed(command: String, error: ProcError) -> Self {
        Self {
            command,
            id: None,
            child: None,
            reader: None,
            output: Vec::new(),
            status: None,
            error: Some(error),
        }
    }

    /// Blocks until the process exits and collects its output.
    ///
    /// Does nothing for a process that never started or was already waited
    /// on. A failed wait, and a non-success exit status, are recorded as the
    /// process error unless an earlier error is already present.
    pub fn wait(&mut self) -> &mut Self {
        let Some(mut child) = self.child.take() else {
            return self;
        };

        // Drain before waiting, a child blocked on a full pipe never exits.
        if let Some(mut reader) = self.reader.take() {
            if let Err(source) = reader.read_to_end(&mut self.output) {
                self.record(ProcError::Wait {
                    command: self.command.clone(),
                    source,
                });
            }
        }

        match child.wait() {
            Ok(status) => {
                debug!(pid = ?self.id, command = %self.command, %status, "process exited");
                self.status = Some(status);
                if !status.success() {
                    self.record(ProcError::Exit {
                        command: self.command.clone(),
                        status,
                    });
                }
            }
            Err(source) => self.record(ProcError::Wait {
                command: self.command.clone(),
                source,
            }),
        }
        self
    }

    fn record(&mut self, error: ProcError) {
        warn!(command = %self.command, %error, "command failed");
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// First error recorded at start or wait time.
    pub fn err(&self) -> Option<&ProcError> {
        self.error.as_ref()
    }

    /// Captured output decoded as text.
    ///
    /// Empty when an error was recorded; use [`Proc::output`] to inspect what
    /// a failing command printed.
    pub fn result(&self) -> String {
        if self.error.is_some() {
            return String::new();
        }
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Raw combined stdout and stderr bytes, empty until waited on.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// OS process id; `None` if the process never started.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// The normalized command line this process was started from.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Exit status, once the process has been waited on.
    pub fn status(&self) -> Option<ExitStatus> {
        self.status
    }

    /// Exit code once waited on; signals map to `128 + signal` on unix.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.map(external::exit_code)
    }

    /// Started and not yet waited on.
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_proc_reports_error_and_no_output() {
        let mut proc = Proc::failed("nope".into(), ProcError::EmptyCommand);
        assert!(proc.err().is_some());
        assert_eq!(proc.id(), None);
        assert!(!proc.is_running());
        assert_eq!(proc.result(), "");

        // waiting on a process that never started is a no-op
        proc.wait();
        assert!(matches!(proc.err(), Some(ProcError::EmptyCommand)));
        assert_eq!(proc.status(), None);
        assert_eq!(proc.exit_code(), None);
    }

    #[test]
    #[cfg(unix)]
    fn wait_collects_output_once() {
        let (reader, writer) = std::io::pipe().unwrap();
        let child = std::process::Command::new("sh")
            .args(["-c", "printf hi"])
            .stdout(writer)
            .spawn()
            .unwrap();

        let mut proc = Proc::started("sh -c 'printf hi'".into(), child, reader);
        assert!(proc.is_running());
        assert!(proc.id().is_some());

        proc.wait();
        assert!(!proc.is_running());
        assert!(proc.err().is_none());
        assert_eq!(proc.result(), "hi");
        assert_eq!(proc.exit_code(), Some(0));

        proc.wait();
        assert_eq!(proc.result(), "hi");
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_an_error() {
        let (reader, writer) = std::io::pipe().unwrap();
        let child = std::process::Command::new("sh")
            .args(["-c", "echo oops; exit 3"])
            .stdout(writer)
            .spawn()
            .unwrap();

        let mut proc = Proc::started("sh".into(), child, reader);
        proc.wait();
        assert!(matches!(proc.err(), Some(ProcError::Exit { .. })));
        assert_eq!(proc.exit_code(), Some(3));
        assert_eq!(proc.result(), "");
        assert_eq!(proc.output(), b"oops\n");
    }
}
