//! Input sources for the driver loop.
//!
//! - [`ConsoleInput`]: interactive; re-prompts until a `0` or `1` arrives.
//! - [`ScriptedInput`]: a fixed bit sequence for tests and replays.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use thiserror::Error;

use signalbox_core::{InputSource, SignalError};

/// Prompt shown before reading a console line.
pub const PROMPT: &str = "Please enter 0 or 1 to indicate traffic light status!";

/// Interactive console source.
///
/// Bytes are consumed one at a time, skipping ASCII whitespace, so a line such
/// as `1 1 0` supplies three samples. Any other byte, including ones that are
/// not valid UTF-8, is discarded and the prompt is shown again once the line
/// is used up. End of stream ends the run.
pub struct ConsoleInput<R, W> {
    reader: R,
    prompt: W,
    pending: VecDeque<u8>,
    rejected: u64,
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    /// Source reading from `reader` and prompting on `prompt`.
    pub fn new(reader: R, prompt: W) -> Self {
        Self {
            reader,
            prompt,
            pending: VecDeque::new(),
            rejected: 0,
        }
    }

    /// Bytes discarded as invalid so far.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    fn refill(&mut self) -> std::io::Result<bool> {
        writeln!(self.prompt, "{PROMPT}")?;
        self.prompt.flush()?;
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(false);
        }
        self.pending.extend(line);
        Ok(true)
    }
}

impl<R: BufRead, W: Write> InputSource for ConsoleInput<R, W> {
    fn sample(&mut self) -> Result<Option<bool>, SignalError> {
        loop {
            while let Some(byte) = self.pending.pop_front() {
                match byte {
                    b'1' => return Ok(Some(true)),
                    b'0' => return Ok(Some(false)),
                    b if b.is_ascii_whitespace() => {}
                    _ => self.rejected += 1,
                }
            }
            if !self.refill()? {
                return Ok(None);
            }
        }
    }
}

/// Invalid character in a bit script.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid input {found:?} at position {position}, expected 0 or 1")]
pub struct ParseScriptError {
    pub position: usize,
    pub found: char,
}

/// Fixed sequence of samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedInput {
    samples: VecDeque<bool>,
}

impl ScriptedInput {
    /// Source replaying `samples` in order.
    #[must_use]
    pub fn new(samples: impl IntoIterator<Item = bool>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// Parse a script such as `"1101"` or `"1,1,0"`. Whitespace, commas and
    /// underscores separate samples; anything else is rejected.
    pub fn parse(script: &str) -> Result<Self, ParseScriptError> {
        parse_bits(script).map(Self::new)
    }

    /// Samples not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl FromIterator<bool> for ScriptedInput {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> Result<Option<bool>, SignalError> {
        Ok(self.samples.pop_front())
    }
}

/// Parse a `0`/`1` script into samples. See [`ScriptedInput::parse`].
pub fn parse_bits(script: &str) -> Result<Vec<bool>, ParseScriptError> {
    let mut samples = Vec::with_capacity(script.len());
    for (position, ch) in script.chars().enumerate() {
        match ch {
            '1' => samples.push(true),
            '0' => samples.push(false),
            ',' | '_' => {}
            c if c.is_whitespace() => {}
            found => return Err(ParseScriptError { position, found }),
        }
    }
    Ok(samples)
}

/// Render samples as a `0`/`1` string.
#[must_use]
pub fn render_bits(samples: &[bool]) -> String {
    samples.iter().map(|&b| if b { '1' } else { '0' }).collect()
}
