// src/prompt.rs

use reqwest::Url;
use std::io::{self, BufRead, Write};

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Accepts absolute URLs only.
pub fn validate_url(input: &str) -> Option<Url> {
    Url::parse(input.trim()).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Url(Url),
    /// `max_attempts` invalid entries in a row.
    TooManyInvalidAttempts,
    EndOfInput,
}

/// Asks for URLs on `output` and reads them from `input`, one per line.
pub struct UrlPrompt<R, W> {
    input: R,
    output: W,
    max_attempts: usize,
}

impl<R: BufRead, W: Write> UrlPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Keeps asking until a valid URL arrives, input ends, or the attempt
    /// budget runs out. Each call starts with a fresh budget.
    pub fn next_url(&mut self) -> io::Result<PromptOutcome> {
        let mut attempts = 0;
        let mut line = String::new();
        while attempts < self.max_attempts {
            write!(self.output, "Enter url: ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(PromptOutcome::EndOfInput);
            }
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }
            if let Some(url) = validate_url(entry) {
                return Ok(PromptOutcome::Url(url));
            }
            attempts += 1;
            writeln!(self.output, "Invalid url, please enter a valid url!")?;
        }
        writeln!(self.output, "You entered an invalid url too many times!")?;
        Ok(PromptOutcome::TooManyInvalidAttempts)
    }
}
