//! Line input shared by the chat loop and the terminal speech host.
//!
//! Both read from the same stream, so the reader sits behind an async mutex
//! and whoever asks first gets the next line. Once the stream reports end of
//! input the source stays closed.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;

type BoxedReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// A cloneable handle to a line-oriented input stream.
#[derive(Clone)]
pub struct LineSource {
    lines: Arc<Mutex<Lines<BoxedReader>>>,
    closed: Arc<AtomicBool>,
}

impl LineSource {
    /// Lines typed on standard input.
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let boxed: BoxedReader = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(boxed.lines())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Read the next line without its terminator.
    ///
    /// Returns `Ok(None)` at end of input. Cancel-safe: dropping the future
    /// loses no input.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        if self.is_closed() {
            return Ok(None);
        }
        let line = self.lines.lock().await.next_line().await?;
        if line.is_none() {
            self.closed.store(true, Ordering::SeqCst);
        }
        Ok(line)
    }

    /// End of input has been reached.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Print `label` without a newline and flush it.
pub fn prompt(label: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{label}")?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_reads_lines_then_closes() {
        let source = LineSource::from_reader(Cursor::new(b"hello\r\nworld\n".to_vec()));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("hello"));
        assert!(!source.is_closed());
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("world"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert!(source.is_closed());
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_the_stream() {
        let source = LineSource::from_reader(Cursor::new(b"one\ntwo\n".to_vec()));
        let other = source.clone();
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("one"));
        assert_eq!(other.next_line().await.unwrap().as_deref(), Some("two"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert!(other.is_closed());
    }
}
