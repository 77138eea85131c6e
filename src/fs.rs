//! Fluent file writing with a deferred error.
//!
//! A [`FileWriter`] is bound to one path and an [`OpenMode`]. Every payload
//! call opens the file, refreshes the metadata snapshot, writes, and closes
//! the file again. The first failure is kept and turns later payload calls
//! into no-ops, so a chain can be checked once at the end:
//!
//! ```no_run
//! use echo_script::FileWriter;
//! let mut out = FileWriter::write("/tmp/report.txt");
//! out.lines(["a", "b", "c"]);
//! if let Some(err) = out.err() {
//!     eprintln!("{err}");
//! }
//! ```

use crate::error::WriteError;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Permission bits used when a payload call creates the file.
pub const DEFAULT_PERMISSIONS: u32 = 0o644;

/// What opening the file does to existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create if absent, truncate if present.
    Truncate,
    /// Create if absent, write at the end.
    Append,
}

#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    mode: OpenMode,
    permissions: u32,
    info: Option<Metadata>,
    error: Option<WriteError>,
}

impl FileWriter {
    /// Writer that replaces the content of `path`.
    pub fn write(path: impl AsRef<Path>) -> Self {
        Self::new(path.as_ref(), OpenMode::Truncate)
    }

    /// Writer that adds to the end of `path`.
    pub fn append(path: impl AsRef<Path>) -> Self {
        Self::new(path.as_ref(), OpenMode::Append)
    }

    /// Records metadata for an existing `path`; nothing is created or opened.
    fn new(path: &Path, mode: OpenMode) -> Self {
        Self {
            path: path.to_path_buf(),
            mode,
            permissions: DEFAULT_PERMISSIONS,
            info: fs::metadata(path).ok(),
            error: None,
        }
    }

    /// Permission bits for a newly created file. Ignored off unix.
    pub fn with_permissions(mut self, bits: u32) -> Self {
        self.permissions = bits;
        self
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether payload calls truncate or append.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// First recorded error.
    pub fn err(&self) -> Option<&WriteError> {
        self.error.as_ref()
    }

    /// Latest metadata snapshot, taken when the file was last opened (or at
    /// construction). `None` once an error has been recorded.
    pub fn info(&self) -> Option<&Metadata> {
        self.info.as_ref()
    }

    /// Writes `s` as is.
    pub fn string(&mut self, s: &str) -> &mut Self {
        self.with_file(|file| file.write_all(s.as_bytes()))
    }

    /// Writes `lines` separated by `\n`, without a trailing newline.
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_file(|file| {
            let mut lines = lines.into_iter().peekable();
            while let Some(line) = lines.next() {
                file.write_all(line.as_ref().as_bytes())?;
                if lines.peek().is_some() {
                    file.write_all(b"\n")?;
                }
            }
            Ok(())
        })
    }

    /// Writes raw `data`.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.with_file(|file| file.write_all(data))
    }

    /// Copies everything `reader` yields into the file.
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> &mut Self {
        self.with_file(|file| io::copy(&mut reader, file).map(drop))
    }

    fn with_file<F>(&mut self, op: F) -> &mut Self
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        if self.error.is_some() {
            return self;
        }

        let mut file = match self.open_options().open(&self.path) {
            Ok(file) => file,
            Err(source) => {
                let path = self.path.clone();
                return self.fail(WriteError::Open { path, source });
            }
        };

        match file.metadata() {
            Ok(info) => self.info = Some(info),
            Err(source) => {
                let path = self.path.clone();
                return self.fail(WriteError::Stat { path, source });
            }
        }

        if let Err(source) = op(&mut file) {
            let path = self.path.clone();
            return self.fail(WriteError::Write { path, source });
        }
        self
    }

    fn fail(&mut self, error: WriteError) -> &mut Self {
        self.info = None;
        self.error = Some(error);
        self
    }

    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.create(true);
        match self.mode {
            OpenMode::Truncate => options.write(true).truncate(true),
            OpenMode::Append => options.append(true),
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.permissions);
        }
        options
    }
}
