//! Asynchronous delivery wrapper.
//!
//! Decouples callers from slow sinks: `write` enqueues onto a bounded queue
//! and returns, a dedicated worker thread drains the queue into the wrapped
//! sink. When the queue is full new records are discarded and counted.

use crate::record::LogRecord;
use crate::sink::Sink;
use relaylog_core::{LogError, Result};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Records buffered before the wrapper starts discarding.
pub const DEFAULT_QUEUE_LIMIT: usize = 10_000;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

enum Message {
    Record(LogRecord),
    Flush(mpsc::Sender<()>),
}

/// Wraps a synchronous sink behind a queue and a worker thread.
pub struct AsyncSinkWrapper {
    name: String,
    inner: Arc<dyn Sink>,
    sender: Option<SyncSender<Message>>,
    worker: Option<JoinHandle<()>>,
    dropped: AtomicU64,
}

impl AsyncSinkWrapper {
    /// Start the worker for `inner`.
    ///
    /// `name` is the name the wrapper is registered under; it also names the
    /// worker thread.
    ///
    /// # Errors
    ///
    /// Returns `LogError::Io` if the worker thread cannot be spawned.
    pub fn new(name: impl Into<String>, inner: Arc<dyn Sink>, queue_limit: usize) -> Result<Self> {
        let name = name.into();
        let (sender, receiver) = mpsc::sync_channel(queue_limit.max(1));
        let worker_sink = Arc::clone(&inner);
        let worker = thread::Builder::new()
            .name(format!("relaylog-async-{name}"))
            .spawn(move || drain(receiver, worker_sink))
            .map_err(|e| LogError::io("async_wrapper_spawn", e))?;

        Ok(Self {
            name,
            inner,
            sender: Some(sender),
            worker: Some(worker),
            dropped: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sink records are delivered to.
    pub fn inner(&self) -> &Arc<dyn Sink> {
        &self.inner
    }

    /// Records discarded because the queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn sender(&self) -> io::Result<&SyncSender<Message>> {
        self.sender
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "async wrapper closed"))
    }
}

fn drain(receiver: Receiver<Message>, sink: Arc<dyn Sink>) {
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Record(record) => {
                if let Err(err) = sink.write(&record) {
                    tracing::warn!(
                        op = "async_write",
                        sink_kind = sink.kind(),
                        error = %err,
                        "wrapped sink rejected a record"
                    );
                }
            }
            Message::Flush(ack) => {
                if let Err(err) = sink.flush() {
                    tracing::warn!(op = "async_flush", sink_kind = sink.kind(), error = %err);
                }
                let _ = ack.send(());
            }
        }
    }
    let _ = sink.flush();
}

impl Sink for AsyncSinkWrapper {
    fn write(&self, record: &LogRecord) -> io::Result<()> {
        match self.sender()?.try_send(Message::Record(record.clone())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    tracing::warn!(
                        op = "async_write",
                        target_name = %self.name,
                        dropped,
                        "async queue full, discarding records"
                    );
                }
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "async worker stopped",
            )),
        }
    }

    /// Wait until everything queued before this call reached the wrapped sink.
    fn flush(&self) -> io::Result<()> {
        let (ack_tx, ack_rx) = mpsc::channel();
        self.sender()?
            .send(Message::Flush(ack_tx))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "async worker stopped"))?;
        ack_rx
            .recv_timeout(FLUSH_TIMEOUT)
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "async flush timed out"))
    }

    fn kind(&self) -> &'static str {
        "async"
    }
}

impl Drop for AsyncSinkWrapper {
    fn drop(&mut self) {
        // Closing the queue ends the worker once it has drained.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl fmt::Debug for AsyncSinkWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncSinkWrapper")
            .field("name", &self.name)
            .field("inner", &self.inner.kind())
            .field("dropped", &self.dropped_count())
            .finish()
    }
}
