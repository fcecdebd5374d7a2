use std::fmt;
use std::str::FromStr;

use crate::error::FramestepError;

/// One named stage of a render frame.
///
/// The set of steps and their order are fixed: within a frame, queues are
/// drained in declaration order (`start`, `update`, `render`, `end`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Start,
    Update,
    Render,
    End,
}

impl Step {
    /// All steps, in execution order.
    pub const ALL: [Step; 4] = [Step::Start, Step::Update, Step::Render, Step::End];

    /// Number of steps in a frame.
    pub const COUNT: usize = Self::ALL.len();

    /// The step that opens every frame.
    pub const fn first() -> Self {
        Step::Start
    }

    /// Position in execution order.
    pub const fn index(self) -> usize {
        match self {
            Step::Start => 0,
            Step::Update => 1,
            Step::Render => 2,
            Step::End => 3,
        }
    }

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::Update => "update",
            Step::Render => "render",
            Step::End => "end",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Step {
    type Err = FramestepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for step in Self::ALL {
            if step.name() == s {
                return Ok(step);
            }
        }
        Err(FramestepError::unknown_step(s))
    }
}
