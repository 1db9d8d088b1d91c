#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = BufferGuard;

    fn make_writer(&'a self) -> Self::Writer {
        BufferGuard {
            buffer: self.buffer.clone(),
        }
    }
}

struct BufferGuard {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for BufferGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.buffer.lock().expect("log buffer lock");
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `action` under a buffering subscriber and returns its result with the log text.
pub fn capture_logs<F, T>(action: F) -> (T, String)
where
    F: FnOnce() -> T,
{
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = BufferWriter {
        buffer: buffer.clone(),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let result = with_default(subscriber, action);

    let contents = buffer.lock().expect("log buffer lock");
    let output = String::from_utf8(contents.clone()).expect("utf8 logs");
    (result, output)
}

pub fn warning_lines(output: &str) -> Vec<&str> {
    output.lines().filter(|line| line.contains("WARN")).collect()
}
