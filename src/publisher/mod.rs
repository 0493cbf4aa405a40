//! Publisher module for outbound notifications
//!
//! Writes one line per published message to the output stream.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::Result;

/// Line-oriented publisher over any async writer
pub struct Publisher<W> {
    sink: W,
    published: u64,
}

impl<W: AsyncWrite + Unpin> Publisher<W> {
    /// Create a new publisher
    pub fn new(sink: W) -> Self {
        Self { sink, published: 0 }
    }

    /// Publish a single message as one line
    pub async fn publish(&mut self, message: &str) -> Result<()> {
        let mut line = Vec::with_capacity(message.len() + 1);
        line.extend_from_slice(message.as_bytes());
        line.push(b'\n');

        if let Err(e) = self.sink.write_all(&line).await {
            warn!(error = %e, "Failed to write notification");
            return Err(e.into());
        }

        self.published += 1;
        debug!(content = %message, published = self.published, "Published message");
        Ok(())
    }

    /// Flush buffered output
    pub async fn flush(&mut self) -> Result<()> {
        self.sink.flush().await.map_err(|e| {
            warn!(error = %e, "Failed to flush output");
            e.into()
        })
    }

    /// Number of lines published so far
    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
