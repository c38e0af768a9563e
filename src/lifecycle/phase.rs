use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Milestones of an application run, in broadcast order
///
/// A run moves forward through the phases one at a time and ends in either
/// [`StartupPhase::Running`] or [`StartupPhase::Failed`]. `Failed` can follow
/// any phase that is not itself terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StartupPhase {
    Starting,
    EnvironmentPrepared,
    ContextPrepared,
    ContextLoaded,
    Started,
    Running,
    Failed,
}

impl StartupPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, StartupPhase::Running | StartupPhase::Failed)
    }

    /// The phase a successful run enters next
    pub fn next(self) -> Option<StartupPhase> {
        match self {
            StartupPhase::Starting => Some(StartupPhase::EnvironmentPrepared),
            StartupPhase::EnvironmentPrepared => Some(StartupPhase::ContextPrepared),
            StartupPhase::ContextPrepared => Some(StartupPhase::ContextLoaded),
            StartupPhase::ContextLoaded => Some(StartupPhase::Started),
            StartupPhase::Started => Some(StartupPhase::Running),
            StartupPhase::Running | StartupPhase::Failed => None,
        }
    }

    /// Whether a run may move from `self` to `to`
    pub fn can_transition_to(self, to: StartupPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == StartupPhase::Failed || self.next() == Some(to)
    }
}
