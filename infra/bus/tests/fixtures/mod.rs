#![allow(dead_code)]

use parking_lot::Mutex;
use radio_bus::{Handler, Value};
use std::io;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

pub type Calls = Arc<Mutex<Vec<Vec<Value>>>>;

/// A handler that records the arguments of every call.
pub fn recorder() -> (Handler, Calls) {
    let calls: Calls = Arc::default();
    let sink = calls.clone();
    (Handler::effect(move |_, args| sink.lock().push(args.to_vec())), calls)
}

/// A handler that answers its first argument.
pub fn echo() -> Handler {
    Handler::new(|_, args| args.first().cloned().unwrap_or(Value::Null))
}

/// In-memory sink for formatted `tracing` output.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Runs `f` with a thread-local subscriber writing into this capture.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock()).lines().map(str::to_owned).collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|line| line.contains(needle)).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
