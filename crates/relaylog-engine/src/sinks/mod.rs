//! Built-in sinks.

mod console;
mod file;
mod memory;
mod viewer;

pub use console::{ConsoleSink, ConsoleStream};
pub use file::FileSink;
pub use memory::MemorySink;
pub use viewer::{Protocol, SinkAddress, ViewerSink, ViewerTarget};
