//! Where the article topic comes from.
//!
//! The scrape entry points take a plain `&str`; this trait is the seam the
//! binary uses to choose between a command-line argument and an interactive
//! prompt.

use crate::error::ScrapeError;
use std::io::{self, BufRead, Write};

/// Text shown when asking for a topic interactively.
pub const PROMPT: &str = "Enter a topic to scrape from Wikipedia: ";

/// Supplies the topic to scrape.
pub trait TopicProvider {
    fn topic(&mut self) -> Result<String, ScrapeError>;
}

/// A topic fixed up front, e.g. from the command line.
#[derive(Debug, Clone)]
pub struct ArgTopic(pub String);

impl TopicProvider for ArgTopic {
    fn topic(&mut self) -> Result<String, ScrapeError> {
        non_empty(&self.0)
    }
}

/// Asks on `writer` and reads one line from `reader`.
pub struct PromptTopic<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> PromptTopic<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl PromptTopic<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on stdout, read from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TopicProvider for PromptTopic<R, W> {
    fn topic(&mut self) -> Result<String, ScrapeError> {
        let io_err = |e: io::Error| ScrapeError::Internal(format!("reading topic: {e}"));
        write!(self.writer, "{PROMPT}").map_err(io_err)?;
        self.writer.flush().map_err(io_err)?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(io_err)?;
        non_empty(&line)
    }
}

fn non_empty(raw: &str) -> Result<String, ScrapeError> {
    let topic = raw.trim();
    if topic.is_empty() {
        return Err(ScrapeError::InvalidTopic {
            topic: raw.to_string(),
        });
    }
    Ok(topic.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn arg_topic_is_trimmed() {
        assert_eq!(ArgTopic("  Cat ".into()).topic().unwrap(), "Cat");
    }

    #[test]
    fn blank_arg_rejected() {
        let err = ArgTopic("   ".into()).topic().unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidTopic { .. }));
    }

    #[test]
    fn prompt_reads_one_line() {
        let mut out = Vec::new();
        let mut provider = PromptTopic::new(Cursor::new("Albert Einstein\nignored\n"), &mut out);
        assert_eq!(provider.topic().unwrap(), "Albert Einstein");
        drop(provider);
        assert_eq!(String::from_utf8(out).unwrap(), PROMPT);
    }

    #[test]
    fn prompt_at_eof_is_invalid() {
        let mut provider = PromptTopic::new(Cursor::new(""), Vec::new());
        assert!(matches!(
            provider.topic(),
            Err(ScrapeError::InvalidTopic { .. })
        ));
    }
}
