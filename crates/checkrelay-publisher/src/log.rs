use std::io::Write;
use tracing::info;

/// Sink for human-readable lines shown in the build's own log
pub trait BuildLog: Send {
    fn log(&mut self, line: &str);
}

/// Strip carriage returns and newlines so user data cannot forge log lines
///
/// # Examples
///
/// ```
/// use checkrelay_publisher::sanitize_log_line;
///
/// assert_eq!(sanitize_log_line("name: a\r\nstatus: forged"), "name: astatus: forged");
/// ```
pub fn sanitize_log_line(line: &str) -> String {
    line.replace(['\r', '\n'], "")
}

/// Writes build-log lines to a console stream, prefixed like a CI plugin
pub struct ConsoleBuildLog<W: Write + Send> {
    writer: W,
    prefix: String,
}

impl<W: Write + Send> ConsoleBuildLog<W> {
    pub fn new(writer: W) -> Self {
        Self::with_prefix(writer, "[GitHub Checks]")
    }

    pub fn with_prefix(writer: W, prefix: impl Into<String>) -> Self {
        Self {
            writer,
            prefix: prefix.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> BuildLog for ConsoleBuildLog<W> {
    fn log(&mut self, line: &str) {
        // A broken console must not abort publishing
        let _ = writeln!(self.writer, "{} {}", self.prefix, line);
    }
}

/// Forwards build-log lines to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBuildLog;

impl BuildLog for TracingBuildLog {
    fn log(&mut self, line: &str) {
        info!(target: "build_log", "{}", sanitize_log_line(line));
    }
}
