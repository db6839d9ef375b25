use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Append-only progress sink recording which pipeline stages completed.
///
/// Separate from diagnostic tracing: a truncated progress file localizes where
/// a failed run stopped. Logging is fire-and-forget, a write failure must not
/// abort extraction, transform or load.
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Appends `"<timestamp> : <message>"` to the sink. Never fails; I/O
    /// errors are reported through tracing and swallowed.
    pub fn record(&self, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("{timestamp} : {message}\n");
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        if let Err(e) = result {
            warn!("progress log write to {} failed: {}", self.path.display(), e);
        }
    }
}
