use crate::record::LogRecord;
use crate::sink::Sink;
use serde::Deserialize;
use std::io::{self, Write};

/// Which standard stream a console sink writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Writes one rendered line per record to stdout or stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &LogRecord) -> io::Result<()> {
        let line = record.render_line();
        match self.stream {
            ConsoleStream::Stdout => writeln!(io::stdout().lock(), "{line}"),
            ConsoleStream::Stderr => writeln!(io::stderr().lock(), "{line}"),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().flush(),
            ConsoleStream::Stderr => io::stderr().flush(),
        }
    }

    fn kind(&self) -> &'static str {
        "console"
    }
}
