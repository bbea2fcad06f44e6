//! Confirmation gate for destructive actions.

use std::io::{BufRead, Write};

pub trait ConfirmGate {
    /// Ask `question`; `true` only on an explicit yes.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Asks on stderr and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl ConfirmGate for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{question} [y/N] ");
        let _ = stderr.flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

/// Answers every question the same way and remembers what was asked.
///
/// Backs `--yes` on the CLI.
#[derive(Debug, Default)]
pub struct PresetAnswer {
    answer: bool,
    asked: Vec<String>,
}

impl PresetAnswer {
    pub fn yes() -> Self {
        Self {
            answer: true,
            asked: Vec::new(),
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl ConfirmGate for PresetAnswer {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answer
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
