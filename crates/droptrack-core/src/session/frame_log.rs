use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat, Utc};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::Timestamp;
use crate::protocol::Envelope;

/// Separator between the columns of a frame log line.
pub const LOG_SEPARATOR: &str = " ||| ";

/// Frames with a known prefix go here; others get one file per prefix.
pub const PACKET_LOG_FILE: &str = "packet_log.txt";

/// Raw frame log of a capture session.
///
/// Each session writes to its own directory under `base_dir`.
pub struct FrameLog {
    base_dir: PathBuf,
    current_session: Option<PathBuf>,
}

impl FrameLog {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            current_session: None,
        }
    }

    /// Start a new session directory named after the local date and time.
    pub fn start_session(&mut self) -> Result<PathBuf> {
        let now: DateTime<Local> = Local::now();
        let session_dir = self
            .base_dir
            .join(now.format("%Y-%m-%d").to_string())
            .join(format!("session_{}", now.format("%H%M%S")));
        fs::create_dir_all(&session_dir)?;

        self.current_session = Some(session_dir.clone());
        Ok(session_dir)
    }

    /// Append one frame; does nothing without an active session.
    pub fn append(&self, envelope: &Envelope, time: Timestamp) -> Result<()> {
        let Some(dir) = &self.current_session else {
            return Ok(());
        };

        let file_name = if envelope.kind().is_some() {
            PACKET_LOG_FILE.to_string()
        } else {
            prefix_file_name(&envelope.prefix)
        };
        let line = LoggedFrame {
            time,
            prefix: envelope.prefix.clone(),
            payload: envelope.payload.clone(),
        }
        .to_line();

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(file_name))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    pub fn current_session_path(&self) -> Option<&Path> {
        self.current_session.as_deref()
    }
}

/// `3;19;` -> `3_19.txt`
fn prefix_file_name(prefix: &str) -> String {
    let name: String = prefix
        .trim_end_matches(';')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.txt", name)
}

/// One line of a frame log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedFrame {
    pub time: Timestamp,
    pub prefix: String,
    pub payload: String,
}

impl LoggedFrame {
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut columns = line.splitn(3, LOG_SEPARATOR);
        let (Some(time), Some(prefix), Some(payload)) =
            (columns.next(), columns.next(), columns.next())
        else {
            return Err(Error::LogParseError(format!("missing columns: {:?}", line)));
        };

        let time = DateTime::parse_from_rfc3339(time.trim())
            .map_err(|e| Error::LogParseError(format!("bad time {:?}: {}", time, e)))?
            .with_timezone(&Utc);

        Ok(Self {
            time,
            prefix: prefix.trim().to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.time.to_rfc3339_opts(SecondsFormat::Micros, true),
            LOG_SEPARATOR,
            self.prefix,
            LOG_SEPARATOR,
            self.payload
        )
    }

    pub fn envelope(&self) -> Envelope {
        Envelope {
            prefix: self.prefix.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// Read every parseable line of a frame log; bad lines are skipped with a warning.
pub fn read_frame_log<P: AsRef<Path>>(path: P) -> Result<Vec<LoggedFrame>> {
    let content = fs::read_to_string(path)?;
    let mut frames = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match LoggedFrame::parse_line(line) {
            Ok(frame) => frames.push(frame),
            Err(e) => warn!("Skipping frame log line {}: {}", number + 1, e),
        }
    }
    Ok(frames)
}
