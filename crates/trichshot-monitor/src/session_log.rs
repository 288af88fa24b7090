//! Append-only alert log, one JSON object per line.
//!
//! Timestamps never go backwards within a log: an event stamped earlier than
//! the previous line (wall clock adjusted) is written with the previous
//! timestamp instead.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use trichshot_models::AlertLogEvent;
use trichshot_vision::{AlertSink, VisionError, VisionResult};

use crate::error::{MonitorError, MonitorResult};

struct Inner {
    writer: BufWriter<File>,
    last_timestamp: Option<DateTime<Utc>>,
    written: u64,
}

/// JSON Lines alert log.
pub struct SessionLog {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl SessionLog {
    /// Open (or create) the log for appending.
    pub fn open(path: impl AsRef<Path>) -> MonitorResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Resume monotonic ordering from an existing log.
        let (last_timestamp, unterminated) = if path.exists() {
            Self::resume(&path)?
        } else {
            (None, false)
        };

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if unterminated {
            // A torn final line must not swallow the next event.
            file.write_all(b"\n")?;
        }
        info!(path = %path.display(), "Session log opened");

        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                writer: BufWriter::new(file),
                last_timestamp,
                written: 0,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Events appended through this handle.
    pub fn events_written(&self) -> u64 {
        self.lock().written
    }

    /// Append one event and flush it. Returns the event as written.
    pub fn append(&self, event: &AlertLogEvent) -> MonitorResult<AlertLogEvent> {
        let mut inner = self.lock();

        let mut event = event.clone();
        if let Some(last) = inner.last_timestamp {
            if event.timestamp < last {
                debug!(
                    event_ts = %event.timestamp,
                    last_ts = %last,
                    "Clock went backwards, clamping alert timestamp"
                );
                event.timestamp = last;
            }
        }

        let line = serde_json::to_string(&event)?;
        inner.writer.write_all(line.as_bytes())?;
        inner.writer.write_all(b"\n")?;
        inner.writer.flush()?;
        inner.last_timestamp = Some(event.timestamp);
        inner.written += 1;

        Ok(event)
    }

    /// Read every event from a log file.
    pub fn read_all(path: impl AsRef<Path>) -> MonitorResult<Vec<AlertLogEvent>> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut events = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|e| {
                MonitorError::session_log(format!("line {}: {}", number + 1, e))
            })?;
            events.push(event);
        }
        Ok(events)
    }

    /// Last readable timestamp and whether the file ends mid-line.
    ///
    /// Unparseable lines are skipped so a torn write never blocks startup.
    fn resume(path: &Path) -> MonitorResult<(Option<DateTime<Utc>>, bool)> {
        let content = std::fs::read(path)?;
        let unterminated = content.last().is_some_and(|b| *b != b'\n');

        let mut last = None;
        for (number, line) in content.split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<AlertLogEvent>(line) {
                Ok(event) => last = last.max(Some(event.timestamp)),
                Err(e) => warn!(
                    path = %path.display(),
                    line = number + 1,
                    error = %e,
                    "Skipping unreadable session log line"
                ),
            }
        }
        Ok((last, unterminated))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AlertSink for SessionLog {
    fn record(&self, event: &AlertLogEvent) -> VisionResult<()> {
        self.append(event)
            .map(|_| ())
            .map_err(|e| VisionError::internal(format!("session log: {}", e)))
    }
}
