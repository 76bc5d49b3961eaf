//! Curriculum catalog — the static ordered graph of steps per track.
//!
//! Step order is defined by position in the track's list, never by parsing
//! the step id. Built-in tracks cover AllStarTeams and Imaginal Agility; a
//! deployment can override either track from a YAML file without touching
//! code. All lookups are pure and return `Option` for unknown ids so legacy
//! references degrade to a placeholder instead of a panic.

use crate::error::{Result, StrideError};
use crate::types::{StepKind, Track};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// Completion criteria for a single step. Every field is optional; an
/// absent field is vacuously satisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Requirements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_watch_percent: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub all_questions_answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_word_count: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sliders_completed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub data_submitted: bool,
}

impl Requirements {
    pub fn is_empty(&self) -> bool {
        *self == Requirements::default()
    }

    /// One-line human summary, used by the CLI step listing.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(pct) = self.min_watch_percent {
            parts.push(format!("watch >= {pct}%"));
        }
        if self.all_questions_answered {
            parts.push("all questions answered".to_string());
        }
        if let Some(n) = self.exact_word_count {
            parts.push(format!("exactly {n} words selected"));
        }
        if self.sliders_completed {
            parts.push("sliders completed".to_string());
        }
        if self.data_submitted {
            parts.push("submission required".to_string());
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

// ---------------------------------------------------------------------------
// StepDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    pub kind: StepKind,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_label: Option<String>,
}

impl StepDefinition {
    fn new(id: &str, kind: StepKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            requirements: Requirements::default(),
            next_label: None,
        }
    }

    fn video(id: &str, min_watch_percent: f64) -> Self {
        let mut step = Self::new(id, StepKind::Video);
        step.requirements.min_watch_percent = Some(min_watch_percent);
        step
    }

    fn assessment(id: &str) -> Self {
        let mut step = Self::new(id, StepKind::Assessment);
        step.requirements.data_submitted = true;
        step
    }

    fn reflection(id: &str) -> Self {
        let mut step = Self::new(id, StepKind::Reflection);
        step.requirements.all_questions_answered = true;
        step
    }

    fn activity(id: &str) -> Self {
        let mut step = Self::new(id, StepKind::Activity);
        step.requirements.data_submitted = true;
        step
    }

    fn label(mut self, label: &str) -> Self {
        self.next_label = Some(label.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    tracks: BTreeMap<Track, Vec<StepDefinition>>,
}

impl Default for Catalog {
    fn default() -> Self {
        let mut tracks = BTreeMap::new();
        tracks.insert(Track::Ast, default_ast_steps());
        tracks.insert(Track::Ia, default_ia_steps());
        Self { tracks }
    }
}

fn default_ast_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::video("1-1", 1.0).label("Next: Intro to Star Strengths"),
        StepDefinition::video("2-1", 1.0),
        StepDefinition::assessment("2-2").label("Next: Review Your Star Card"),
        StepDefinition::video("2-3", 1.0),
        StepDefinition::reflection("2-4"),
        StepDefinition::video("3-1", 1.0),
        StepDefinition::assessment("3-2").label("Next: Rounding Out"),
        StepDefinition::video("3-3", 1.0),
        {
            // Pick exactly four flow attributes to add to the star card.
            let mut step = StepDefinition::new("3-4", StepKind::Activity);
            step.requirements.exact_word_count = Some(4);
            step
        },
        {
            // Cantril Ladder: watch the intro and set both well-being sliders.
            let mut step = StepDefinition::video("4-1", 1.0);
            step.requirements.sliders_completed = true;
            step
        },
        StepDefinition::reflection("4-2"),
        StepDefinition::activity("4-3"),
        StepDefinition::video("4-4", 1.0),
        StepDefinition::reflection("4-5").label("Finish Workshop"),
    ]
}

fn default_ia_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::video("ia-1-1", 1.0).label("Next: The Triple Challenge"),
        StepDefinition::video("ia-2-1", 1.0),
        StepDefinition::video("ia-3-1", 1.0),
        StepDefinition::assessment("ia-4-1").label("Next: Assessment Results"),
        StepDefinition::activity("ia-5-1"),
        StepDefinition::video("ia-6-1", 1.0),
        StepDefinition::video("ia-7-1", 1.0),
        StepDefinition::video("ia-8-1", 1.0),
        StepDefinition::new("ia-9-1", StepKind::Activity),
    ]
}

/// On-disk override shape: `tracks:` mapping track name to a step list.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    tracks: BTreeMap<Track, Vec<StepDefinition>>,
}

impl Catalog {
    /// Built-in catalog with an override file merged on top. Tracks present
    /// in the file replace the built-in definition wholesale; absent tracks
    /// keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        let mut catalog = Catalog::default();
        for (track, steps) in file.tracks {
            if steps.is_empty() {
                return Err(StrideError::EmptyTrack(track.to_string()));
            }
            let mut seen = std::collections::BTreeSet::new();
            for step in &steps {
                if !seen.insert(step.id.as_str()) {
                    return Err(StrideError::DuplicateStep {
                        track: track.to_string(),
                        step: step.id.clone(),
                    });
                }
            }
            catalog.tracks.insert(track, steps);
        }
        Ok(catalog)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StrideError::CatalogNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    // ---------------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------------

    pub fn ordered_steps(&self, track: Track) -> &[StepDefinition] {
        self.tracks.get(&track).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn step(&self, track: Track, step_id: &str) -> Option<&StepDefinition> {
        self.ordered_steps(track).iter().find(|s| s.id == step_id)
    }

    pub fn first_step_id(&self, track: Track) -> Option<&str> {
        self.ordered_steps(track).first().map(|s| s.id.as_str())
    }

    pub fn next_step_id(&self, track: Track, step_id: &str) -> Option<&str> {
        let steps = self.ordered_steps(track);
        let idx = steps.iter().position(|s| s.id == step_id)?;
        steps.get(idx + 1).map(|s| s.id.as_str())
    }

    pub fn previous_step_id(&self, track: Track, step_id: &str) -> Option<&str> {
        let steps = self.ordered_steps(track);
        let idx = steps.iter().position(|s| s.id == step_id)?;
        idx.checked_sub(1).and_then(|i| steps.get(i)).map(|s| s.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
