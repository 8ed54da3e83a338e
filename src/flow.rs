//! Screen flow between title, level select, a running level and exit
//!
//! Only the transitions live here; drawing menus is the frontend's job.

use serde::{Deserialize, Serialize};

use crate::sim::{LevelId, Outcome};

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Title,
    LevelSelect,
    Running(LevelId),
    Quit,
}

/// What the player picked on a menu screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Confirm on the title screen
    Start,
    Select(LevelId),
    /// Escape: level select returns to the title
    Back,
    Quit,
}

/// Choice made on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavChoice {
    Restart,
    LevelSelect,
    Quit,
}

impl NavChoice {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "restart" | "r" => Some(NavChoice::Restart),
            "level_select" | "select" | "menu" => Some(NavChoice::LevelSelect),
            "quit" | "q" => Some(NavChoice::Quit),
            _ => None,
        }
    }
}

/// Navigation after a level ends
///
/// Win and lose go through the results screen, so the player's choice
/// stands. Quitting mid-level skips the results screen and goes back to
/// level select.
pub fn results_navigation(outcome: Outcome, choice: NavChoice) -> NavChoice {
    match outcome {
        Outcome::Win | Outcome::Lose => choice,
        Outcome::Quit | Outcome::Running => NavChoice::LevelSelect,
    }
}

impl Screen {
    /// Transition out of a menu screen
    pub fn next(self, action: MenuAction) -> Screen {
        match (self, action) {
            (_, MenuAction::Quit) => Screen::Quit,
            (Screen::Title, MenuAction::Start) => Screen::LevelSelect,
            (Screen::LevelSelect, MenuAction::Select(id)) => Screen::Running(id),
            (Screen::LevelSelect, MenuAction::Back) => Screen::Title,
            (screen, action) => {
                log::debug!("Ignoring {action:?} on {screen:?}");
                screen
            }
        }
    }

    /// Transition out of a running level
    pub fn after_level(self, nav: NavChoice) -> Screen {
        match (self, nav) {
            (Screen::Running(id), NavChoice::Restart) => Screen::Running(id),
            (Screen::Running(_), NavChoice::LevelSelect) => Screen::LevelSelect,
            (_, NavChoice::Quit) => Screen::Quit,
            (screen, _) => screen,
        }
    }

    /// Transition out of a running level that ended with `outcome`
    pub fn after_outcome(self, outcome: Outcome, choice: NavChoice) -> Screen {
        self.after_level(results_navigation(outcome, choice))
    }

    pub fn is_quit(&self) -> bool {
        *self == Screen::Quit
    }
}
