//! Per-run transcript file.
//!
//! Each run appends to `winstrap-YYYYMMDD-HHMMSS.log` in the log directory.
//! The transcript is the writer of the `tracing` subscriber, so every console
//! report and every command executed ends up in it. `close` writes a footer
//! and releases the file; anything logged afterwards is dropped.

use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

struct Inner {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn finish(&self, status: &str) -> io::Result<()> {
        let Some(mut file) = self.lock().take() else {
            return Ok(());
        };
        writeln!(
            file,
            "==== winstrap transcript closed {} ({}) ====",
            Local::now().format(TIMESTAMP_FORMAT),
            status
        )?;
        file.flush()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let _ = self.finish("interrupted");
    }
}

/// Shared handle to the open transcript file
#[derive(Clone)]
pub struct Transcript {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("path", &self.inner.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Transcript {
    /// File name for a run started at `at`
    pub fn file_name(at: DateTime<Local>) -> String {
        at.format("winstrap-%Y%m%d-%H%M%S.log").to_string()
    }

    /// Open a transcript for a run starting now
    pub fn open(log_dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_at(log_dir, Local::now())
    }

    /// Open (creating the directory if needed) the transcript for a run
    /// started at `at` and write the header
    pub fn open_at(log_dir: impl AsRef<Path>, at: DateTime<Local>) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(Self::file_name(at));
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        writeln!(
            file,
            "==== winstrap {} transcript started {} ====",
            env!("CARGO_PKG_VERSION"),
            at.format(TIMESTAMP_FORMAT)
        )?;
        let args: Vec<String> = std::env::args().collect();
        writeln!(file, "Command line: {}", args.join(" "))?;
        file.flush()?;

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                file: Mutex::new(Some(file)),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Write the footer with the final `status` and close the file.
    ///
    /// Closing twice is a no-op.
    pub fn close(&self, status: &str) -> Result<()> {
        self.inner.finish(status)?;
        Ok(())
    }
}

/// Writer handed out to the `tracing` subscriber for each event
pub struct TranscriptWriter {
    inner: Arc<Inner>,
}

impl Write for TranscriptWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Events logged after close are dropped
        if let Some(file) = self.inner.lock().as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for Transcript {
    type Writer = TranscriptWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TranscriptWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}
