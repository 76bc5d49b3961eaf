//! Progression state store — the canonical in-memory record of where a
//! participant is in a track, and the sole writer of that record.
//!
//! Unlocking is strictly sequential: the first step is always unlocked and
//! completing a step unlocks its immediate successor. Completion is
//! re-validated here against the evaluator even when the UI has already
//! checked, so the unlock invariants survive a buggy or stale caller.

use crate::curriculum::Catalog;
use crate::evaluate::{self, Blocker, Evidence};
use crate::types::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// ProgressionState
// ---------------------------------------------------------------------------

/// Wire names are camelCase to match the persisted JSON payloads. The
/// aliases accept field names from earlier schema versions; serialization
/// always emits the canonical names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionState {
    pub completed_steps: Vec<String>,
    #[serde(alias = "currentUnlockedStep")]
    pub current_step_id: String,
    #[serde(alias = "unlockedSections")]
    pub unlocked_steps: Vec<String>,
    #[serde(alias = "videoProgress")]
    pub video_watch_progress: BTreeMap<String, f64>,
    pub assessment_results: BTreeMap<String, Value>,
    pub last_visited_at: DateTime<Utc>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            completed_steps: Vec::new(),
            current_step_id: String::new(),
            unlocked_steps: Vec::new(),
            video_watch_progress: BTreeMap::new(),
            assessment_results: BTreeMap::new(),
            last_visited_at: Utc::now(),
        }
    }
}

impl ProgressionState {
    /// Fresh state for a track: first step unlocked and current, nothing
    /// completed.
    pub fn initial(track: Track, catalog: &Catalog) -> Self {
        let mut state = Self::default();
        if let Some(first) = catalog.first_step_id(track) {
            state.current_step_id = first.to_string();
            state.unlocked_steps.push(first.to_string());
        }
        state
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed_steps.iter().any(|s| s == step_id)
    }

    pub fn is_unlocked(&self, step_id: &str) -> bool {
        self.unlocked_steps.iter().any(|s| s == step_id)
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Result of a completion attempt. A `Blocked` attempt leaves the state
/// untouched; the blocker carries the user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Completed { unlocked: Option<String> },
    AlreadyCompleted,
    Blocked(Blocker),
}

impl Completion {
    pub fn is_completed(&self) -> bool {
        matches!(self, Completion::Completed { .. })
    }
}

// ---------------------------------------------------------------------------
// ProgressTracker
// ---------------------------------------------------------------------------

/// Owns the state for one (user, track) session. All mutation goes through
/// these operations; readers use the query methods. The catalog is passed
/// into operations rather than held globally so tests can run independent
/// trackers side by side.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    track: Track,
    state: ProgressionState,
}

impl ProgressTracker {
    pub fn new(track: Track, catalog: &Catalog) -> Self {
        Self {
            track,
            state: ProgressionState::initial(track, catalog),
        }
    }

    /// Adopt a state produced by the reconciliation layer.
    pub fn initialize(track: Track, state: ProgressionState) -> Self {
        Self { track, state }
    }

    pub fn track(&self) -> Track {
        self.track
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn into_state(self) -> ProgressionState {
        self.state
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Record a watch-percentage tick. The stored value never decreases, so
    /// seeking backward cannot undo progress. Does not complete the step.
    pub fn record_video_progress(&mut self, step_id: &str, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        let entry = self
            .state
            .video_watch_progress
            .entry(step_id.to_string())
            .or_insert(0.0);
        if percent > *entry {
            *entry = percent;
        }
        self.state.last_visited_at = Utc::now();
    }

    /// Store an opaque assessment result payload. The engine only cares
    /// about presence or absence.
    pub fn record_assessment_result(&mut self, step_id: &str, result: Value) {
        self.state
            .assessment_results
            .insert(step_id.to_string(), result);
        self.state.last_visited_at = Utc::now();
    }

    /// Attempt to complete a step. Idempotent; re-validates requirements
    /// against the supplied evidence merged with the tracker's own video
    /// record; on success unlocks the successor and advances the current
    /// step to it (at the last step the current step stays put).
    pub fn mark_step_completed(
        &mut self,
        step_id: &str,
        evidence: &Evidence,
        catalog: &Catalog,
    ) -> Completion {
        if self.state.is_completed(step_id) {
            return Completion::AlreadyCompleted;
        }
        let Some(definition) = catalog.step(self.track, step_id) else {
            return Completion::Blocked(Blocker::UnknownStep);
        };
        if !self.state.is_unlocked(step_id) {
            return Completion::Blocked(Blocker::StepLocked);
        }

        // The tracker's own watch record is evidence too: a threshold the
        // user crossed earlier in the session still counts.
        let mut merged = evidence.clone();
        if let Some(&recorded) = self.state.video_watch_progress.get(step_id) {
            let supplied = merged.watched_percent.unwrap_or(0.0);
            merged.watched_percent = Some(supplied.max(recorded));
        }

        if let Some(blocker) = evaluate::first_unmet(&definition.requirements, &merged) {
            return Completion::Blocked(blocker);
        }

        self.state.completed_steps.push(step_id.to_string());
        let unlocked = catalog.next_step_id(self.track, step_id).map(String::from);
        if let Some(next) = &unlocked {
            if !self.state.is_unlocked(next) {
                self.state.unlocked_steps.push(next.clone());
            }
            self.state.current_step_id = next.clone();
        }
        self.state.last_visited_at = Utc::now();
        Completion::Completed { unlocked }
    }

    /// Administrative reset back to defaults.
    pub fn reset(&mut self, catalog: &Catalog) {
        self.state = ProgressionState::initial(self.track, catalog);
    }

    pub fn touch(&mut self) {
        self.state.last_visited_at = Utc::now();
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn is_step_completed(&self, step_id: &str) -> bool {
        self.state.is_completed(step_id)
    }

    pub fn is_step_unlocked(&self, step_id: &str) -> bool {
        self.state.is_unlocked(step_id)
    }

    pub fn current_step_id(&self) -> &str {
        &self.state.current_step_id
    }

    pub fn video_progress(&self, step_id: &str) -> f64 {
        self.state
            .video_watch_progress
            .get(step_id)
            .copied()
            .unwrap_or(0.0)
    }

    /// First step, in track order, that is unlocked and not completed.
    pub fn next_unlocked_incomplete_step<'c>(&self, catalog: &'c Catalog) -> Option<&'c str> {
        catalog
            .ordered_steps(self.track)
            .iter()
            .map(|s| s.id.as_str())
            .find(|id| self.state.is_unlocked(id) && !self.state.is_completed(id))
    }

    /// Completed and total step counts for the track. Completed ids the
    /// catalog no longer defines are not counted, so completed never
    /// exceeds total even for a state reconciled from a legacy payload.
    pub fn progress_count(&self, catalog: &Catalog) -> (usize, usize) {
        let steps = catalog.ordered_steps(self.track);
        let done = steps
            .iter()
            .filter(|s| self.state.is_completed(&s.id))
            .count();
        (done, steps.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
