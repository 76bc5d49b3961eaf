use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// A named curriculum: an ordered sequence of steps a participant works
/// through. String forms match the persisted `appType` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Ast,
    Ia,
}

impl Track {
    pub fn all() -> &'static [Track] {
        &[Track::Ast, Track::Ia]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Track::Ast => "ast",
            Track::Ia => "ia",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Track::Ast => "AllStarTeams",
            Track::Ia => "Imaginal Agility",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Track {
    type Err = crate::error::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ast" | "allstarteams" => Ok(Track::Ast),
            "ia" | "imaginal-agility" => Ok(Track::Ia),
            _ => Err(crate::error::StrideError::UnknownTrack(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StepKind
// ---------------------------------------------------------------------------

/// The atomic unit of curriculum content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Video,
    Assessment,
    Reflection,
    Activity,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Video => "video",
            StepKind::Assessment => "assessment",
            StepKind::Reflection => "reflection",
            StepKind::Activity => "activity",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
