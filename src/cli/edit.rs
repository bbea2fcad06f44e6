//! Interactive edit loop shared by `config edit`, `rules edit` and
//! `rules new`.

use std::io::{BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use crate::client::Transport;
use crate::editor::TextEditor;
use crate::notify::NotificationSurface;
use crate::page::config::ConfigKind;
use crate::page::{ActionOutcome, DocumentPage, RulesPage, ViewState};

/// What the operator picked after closing the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Save,
    Apply,
    EditAgain,
    Cancel,
}

impl Choice {
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "s" | "save" => Some(Self::Save),
            "a" | "apply" => Some(Self::Apply),
            "e" | "edit" => Some(Self::EditAgain),
            "c" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// A page with an open document the operator can iterate on.
pub trait EditablePage {
    fn focus(&mut self) -> Result<()>;
    fn save(&mut self) -> ActionOutcome;
    fn apply(&mut self) -> ActionOutcome;
    fn cancel(&mut self) -> ActionOutcome;
    fn state(&self) -> ViewState;
}

impl<T, E, N> EditablePage for DocumentPage<ConfigKind, T, E, N>
where
    T: Transport,
    E: TextEditor,
    N: NotificationSurface,
{
    fn focus(&mut self) -> Result<()> {
        DocumentPage::focus(self)
    }

    fn save(&mut self) -> ActionOutcome {
        DocumentPage::save(self)
    }

    fn apply(&mut self) -> ActionOutcome {
        DocumentPage::apply(self)
    }

    fn cancel(&mut self) -> ActionOutcome {
        DocumentPage::cancel(self)
    }

    fn state(&self) -> ViewState {
        DocumentPage::state(self)
    }
}

impl<T, E, N> EditablePage for RulesPage<T, E, N>
where
    T: Transport,
    E: TextEditor,
    N: NotificationSurface,
{
    fn focus(&mut self) -> Result<()> {
        RulesPage::focus(self)
    }

    fn save(&mut self) -> ActionOutcome {
        RulesPage::save(self)
    }

    fn apply(&mut self) -> ActionOutcome {
        RulesPage::apply(self)
    }

    fn cancel(&mut self) -> ActionOutcome {
        RulesPage::cancel(self)
    }

    fn state(&self) -> ViewState {
        RulesPage::state(self)
    }
}

/// Drive an open document until it is saved or cancelled.
///
/// The editor reopens after "edit again" and after a failed write, so the
/// operator can fix what the backend rejected.
pub fn run_loop<P: EditablePage>(
    page: &mut P,
    mut choose: impl FnMut() -> Result<Choice>,
) -> Result<ActionOutcome> {
    let mut reopen = true;
    while page.state() == ViewState::Editing {
        if reopen {
            page.focus()?;
        }

        reopen = match choose()? {
            Choice::Save => {
                let outcome = page.save();
                if outcome.is_completed() {
                    return Ok(outcome);
                }
                outcome == ActionOutcome::Failed
            }
            Choice::Apply => page.apply() == ActionOutcome::Failed,
            Choice::EditAgain => true,
            Choice::Cancel => return Ok(page.cancel()),
        };
    }
    Ok(ActionOutcome::Ignored)
}

/// Ask on stderr until the answer is one of the four choices.
pub fn ask_choice() -> Result<Choice> {
    let stdin = std::io::stdin();
    loop {
        {
            let mut stderr = std::io::stderr().lock();
            write!(
                stderr,
                "{} [s]ave, [a]pply, [e]dit again, [c]ancel: ",
                "?".cyan().bold()
            )?;
            stderr.flush()?;
        }

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer)? == 0 {
            return Ok(Choice::Cancel);
        }
        if let Some(choice) = Choice::parse(&answer) {
            return Ok(choice);
        }
    }
}
