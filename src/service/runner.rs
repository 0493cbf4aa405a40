//! Command loop
//!
//! Reads one line at a time, processes it completely and publishes the
//! resulting messages before reading the next line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tracing::{error, info, info_span, warn, Instrument};

use super::{CommandProcessor, RequestContext};
use crate::error::{MarketDataError, Result};
use crate::metrics::ServiceMetrics;
use crate::parser::{ParseError, ParsedLine};
use crate::publisher::Publisher;

/// Totals for one run of the command loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines read, excluding `quit`
    pub commands: u64,
    pub failures: u64,
    pub notifications: u64,
    /// Stopped by `quit` rather than end of input
    pub quit: bool,
}

/// Single-writer loop over an input stream
pub struct CommandLoop<W> {
    processor: CommandProcessor,
    publisher: Publisher<W>,
    metrics: ServiceMetrics,
}

impl<W: AsyncWrite + Unpin> CommandLoop<W> {
    pub fn new(
        processor: CommandProcessor,
        publisher: Publisher<W>,
        metrics: ServiceMetrics,
    ) -> Self {
        Self {
            processor,
            publisher,
            metrics,
        }
    }

    /// Run until `quit` or end of input
    ///
    /// Command failures are logged and counted; only I/O failures on the
    /// input or output streams end the loop early. A line that is not valid
    /// UTF-8 is a malformed command like any other.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, mut input: R) -> Result<RunSummary> {
        let mut buf = Vec::new();
        let mut summary = RunSummary::default();
        let mut sequence = 0u64;

        loop {
            sequence += 1;
            let ctx = RequestContext::new(sequence);
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                info!(correlation_id = %ctx.correlation_id, "CHECKPOINT: end of input");
                break;
            }

            let span = info_span!("command", correlation_id = %ctx.correlation_id, sequence);
            let keep_going = self
                .process_line(strip_line_ending(&buf), &ctx, &mut summary)
                .instrument(span)
                .await?;
            if !keep_going {
                break;
            }
        }

        Ok(summary)
    }

    /// Process one raw line; false once `quit` is read
    async fn process_line(
        &mut self,
        raw: &[u8],
        ctx: &RequestContext,
        summary: &mut RunSummary,
    ) -> Result<bool> {
        let line = String::from_utf8_lossy(raw);
        let parsed = std::str::from_utf8(raw)
            .map_err(|_| ParseError::InvalidEncoding)
            .and_then(ParsedLine::parse);
        if parsed == Ok(ParsedLine::Quit) {
            info!(
                correlation_id = %ctx.correlation_id,
                command = %line.trim(),
                "CHECKPOINT: Exit"
            );
            summary.quit = true;
            return Ok(false);
        }

        summary.commands += 1;
        info!(
            correlation_id = %ctx.correlation_id,
            command = %line,
            "CHECKPOINT: start processing command"
        );

        let outcome = parsed
            .map_err(MarketDataError::from)
            .and_then(|parsed| match parsed {
                ParsedLine::Command(command) => {
                    self.metrics.record_command(command.verb().as_str());
                    self.processor.execute(&command, ctx)
                }
                ParsedLine::Quit => Ok(Vec::new()),
            });

        match outcome {
            Ok(messages) => {
                for message in &messages {
                    self.publisher.publish(message).await?;
                    info!(
                        correlation_id = %ctx.correlation_id,
                        content = %message,
                        "published notification"
                    );
                }
                self.publisher.flush().await?;
                self.metrics.record_notifications(messages.len());
                summary.notifications += messages.len() as u64;
            }
            Err(e) => {
                self.report(&e, &line, ctx);
                summary.failures += 1;
            }
        }

        self.metrics
            .set_active_subscriptions(self.processor.index().len());
        info!(
            correlation_id = %ctx.correlation_id,
            command = %line,
            "CHECKPOINT: end processing command"
        );
        Ok(true)
    }

    fn report(&self, err: &MarketDataError, line: &str, ctx: &RequestContext) {
        self.metrics.record_failure(err.kind());
        match err {
            MarketDataError::Parse(ParseError::Blank) => {
                warn!(correlation_id = %ctx.correlation_id, command = %line, "blank command");
            }
            MarketDataError::Parse(ParseError::UnknownVerb(_)) => {
                error!(
                    correlation_id = %ctx.correlation_id,
                    command = %line,
                    error = %err,
                    "unknown command"
                );
            }
            MarketDataError::Parse(ParseError::InvalidArgs { .. }) => {
                error!(
                    correlation_id = %ctx.correlation_id,
                    command = %line,
                    error = %err,
                    "invalid args"
                );
            }
            MarketDataError::Parse(ParseError::PriceOutOfRange(_)) => {
                error!(
                    correlation_id = %ctx.correlation_id,
                    command = %line,
                    error = %err,
                    "price out of decimal range"
                );
            }
            MarketDataError::Parse(ParseError::InvalidEncoding) => {
                error!(
                    correlation_id = %ctx.correlation_id,
                    command = %line,
                    error = %err,
                    "malformed command"
                );
            }
            _ => {
                error!(
                    correlation_id = %ctx.correlation_id,
                    command = %line,
                    error = %err,
                    "command failed"
                );
            }
        }
    }

    pub fn processor(&self) -> &CommandProcessor {
        &self.processor
    }

    pub fn publisher(&self) -> &Publisher<W> {
        &self.publisher
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    pub fn into_publisher(self) -> Publisher<W> {
        self.publisher
    }
}

/// Drop a trailing `\n` or `\r\n`
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending(b"tick SYM 1\n"), b"tick SYM 1");
        assert_eq!(strip_line_ending(b"tick SYM 1\r\n"), b"tick SYM 1");
        assert_eq!(strip_line_ending(b"quit"), b"quit");
        assert_eq!(strip_line_ending(b"\n"), b"");
    }
}
