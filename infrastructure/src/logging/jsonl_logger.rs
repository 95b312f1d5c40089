//! Append-only JSONL transcript of ask outcomes.
//!
//! Every [`ConversationEvent`] becomes one JSON object per line: the event's
//! fields, its `type` tag, and a `timestamp`. The file is opened in append
//! mode so the transcript accumulates across runs.

use imgchat_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path`.
    ///
    /// Returns `None` when the file cannot be opened; the caller then runs
    /// without a transcript.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(dir = %parent.display(), error = %e, "Cannot create conversation log directory");
            return None;
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot open conversation log");
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: &ConversationEvent, timestamp: String) -> Option<Value> {
    let mut record = serde_json::to_value(event).ok()?;
    if let Value::Object(map) = &mut record {
        map.insert("timestamp".to_string(), Value::from(timestamp));
    }
    Some(record)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let Some(line) = to_record(&event, timestamp).and_then(|r| serde_json::to_string(&r).ok())
        else {
            warn!(event = event.kind(), "Cannot serialize conversation event");
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}
