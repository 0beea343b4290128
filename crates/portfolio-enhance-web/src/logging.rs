//! Log subscriber that forwards formatted lines to a console sink.
//!
//! The page chooses its level with a `log_level` key in the inline
//! configuration block, using `EnvFilter` directive syntax
//! (`"debug"`, `"portfolio_enhance=trace,warn"`).

use std::io;

use anyhow::Context;
use serde_json::Value;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVE: &str = "info";

/// Pick the level directive out of an inline configuration block.
pub fn log_directive(config_json: Option<&str>) -> String {
    config_json
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .and_then(|value| value.get("log_level")?.as_str().map(str::to_string))
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Buffers bytes and hands each complete line to `sink`, without its
/// newline. A trailing partial line is emitted on drop.
pub struct ConsoleWriter<F: FnMut(&str)> {
    buf: Vec<u8>,
    sink: F,
}

impl<F: FnMut(&str)> ConsoleWriter<F> {
    pub fn new(sink: F) -> Self {
        Self {
            buf: Vec::new(),
            sink,
        }
    }

    fn emit_complete_lines(&mut self) {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            (self.sink)(String::from_utf8_lossy(&line[..pos]).trim_end_matches('\r'));
        }
    }
}

impl<F: FnMut(&str)> io::Write for ConsoleWriter<F> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        self.emit_complete_lines();
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_complete_lines();
        Ok(())
    }
}

impl<F: FnMut(&str)> Drop for ConsoleWriter<F> {
    fn drop(&mut self) {
        self.emit_complete_lines();
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            (self.sink)(&String::from_utf8_lossy(&rest));
        }
    }
}

/// Build a fmt subscriber writing through `sink`. Timestamps are omitted;
/// the browser console adds its own.
pub fn build_subscriber<S>(directive: &str, sink: S) -> anyhow::Result<impl Subscriber + Send + Sync>
where
    S: Fn(&str) + Clone + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log directive {directive:?}"))?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || ConsoleWriter::new(sink.clone()))
        .without_time()
        .with_target(false)
        .finish())
}

/// Install the subscriber globally.
pub fn init<S>(directive: &str, sink: S) -> anyhow::Result<()>
where
    S: Fn(&str) + Clone + Send + Sync + 'static,
{
    let subscriber = build_subscriber(directive, sink)?;
    tracing::subscriber::set_global_default(subscriber)
        .context("a global log subscriber is already installed")
}
