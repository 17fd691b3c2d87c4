//! What rules can be matched against

use nirimgr_config::{Match, RuleType};
use serde::Serialize;

use super::keys::PossibleKeys;
use crate::niri_ipc::{Window, Workspace};

/// A compositor object that rules target
///
/// Implementors remember whether the last evaluation matched, so a rule only
/// fires when that flips from `false` to `true`.
pub trait Entity: Serialize + Send + Sync {
    /// Rule type that targets this entity
    const KIND: RuleType;

    fn id(&self) -> u64;

    fn is_matched(&self) -> bool;

    fn set_matched(&mut self, matched: bool);

    /// Whether a single match entry applies to this entity
    fn matches(&self, entry: &Match) -> bool;

    /// Keys this entity lends to the actions of a rule it triggered
    fn possible_keys(&self) -> PossibleKeys;
}

impl Entity for Window {
    const KIND: RuleType = RuleType::Window;

    fn id(&self) -> u64 {
        self.id
    }

    fn is_matched(&self) -> bool {
        self.matched
    }

    fn set_matched(&mut self, matched: bool) {
        self.matched = matched;
    }

    fn matches(&self, entry: &Match) -> bool {
        entry.matches_window(&self.title, &self.app_id)
    }

    fn possible_keys(&self) -> PossibleKeys {
        PossibleKeys::from(self)
    }
}

impl Entity for Workspace {
    const KIND: RuleType = RuleType::Workspace;

    fn id(&self) -> u64 {
        self.id
    }

    fn is_matched(&self) -> bool {
        self.matched
    }

    fn set_matched(&mut self, matched: bool) {
        self.matched = matched;
    }

    fn matches(&self, entry: &Match) -> bool {
        entry.matches_workspace(&self.name, &self.output)
    }

    fn possible_keys(&self) -> PossibleKeys {
        PossibleKeys::from(self)
    }
}
