//! Splitting of a command line into argv-style words.
//!
//! The splitter is a small finite state machine. Words are separated by
//! unquoted spaces and tabs. Single quotes keep their content verbatim, double
//! quotes group their content but honor `\"`, `\\` and `\$` escapes, and a
//! backslash outside quotes escapes the next character. Variable references
//! are not interpreted here; the runner expands them before splitting.

use crate::command::WordSplitter;
use thiserror::Error;

/// Errors that can occur while splitting a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("unfinished quote")]
    UnfinishedQuote,
    /// The line ended right after an escaping backslash.
    #[error("dangling escape at end of input")]
    DanglingEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole input and returns the collected words.
    ///
    /// A word that was opened by a quote is emitted even when it is empty,
    /// so `''` yields one empty argument.
    fn make_words(&mut self) -> Result<Vec<String>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch)?,
                LexingState::ReadingWord => self.handle_word(ch, &mut out)?,
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch),
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(LexingError::UnfinishedQuote);
            }
            LexingState::ReadingWord => out.push(std::mem::take(&mut self.buffer)),
            LexingState::Start => {}
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_start(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            ' ' | '\t' => {}
            _ => {
                self.state = LexingState::ReadingWord;
                self.consume_word_char(ch)?;
            }
        }
        Ok(())
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), LexingError> {
        match ch {
            ' ' | '\t' => {
                out.push(std::mem::take(&mut self.buffer));
                self.state = LexingState::Start;
            }
            c => self.consume_word_char(c)?,
        }
        Ok(())
    }

    fn consume_word_char(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => {
                let escaped = self.read_char().ok_or(LexingError::DanglingEscape)?;
                self.buffer.push(escaped);
            }
            c => self.buffer.push(c),
        }
        Ok(())
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' if matches!(self.peek_char(), Some('"' | '\\' | '$')) => {
                if let Some(escaped) = self.read_char() {
                    self.buffer.push(escaped);
                }
            }
            c => self.buffer.push(c),
        }
    }
}

/// Splits `line` into words.
pub fn split_into_words(line: &str) -> Result<Vec<String>, LexingError> {
    LexingFSM::new(line).make_words()
}

/// Default [`WordSplitter`]: shell-like quoting rules backed by
/// [`split_into_words`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellWords;

impl WordSplitter for ShellWords {
    fn split(&self, command: &str) -> Result<Vec<String>, LexingError> {
        split_into_words(command)
    }
}
