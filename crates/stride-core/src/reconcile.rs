//! Reconciliation of persisted progression payloads.
//!
//! Remote records come in several historical shapes: the canonical object,
//! an older object with a bare `completed` list, or a plain array of step
//! ids. An ordered list of matchers maps any recognized shape onto the
//! canonical [`ProgressionState`]; anything unrecognized falls back to the
//! default state. Unlock lists are never trusted verbatim — they are
//! re-derived from the completed set on every load so historical drift
//! heals itself.

use crate::curriculum::Catalog;
use crate::progress::ProgressionState;
use crate::types::Track;
use serde_json::Value;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Renamed keys
// ---------------------------------------------------------------------------

/// Assessment-result keys superseded by newer names. The old value is
/// copied under the new key when the new key is absent; the old key is
/// then retired.
const RENAMED_RESULT_KEYS: &[(&str, &str)] = &[
    ("flowScore", "flowAssessment"),
    ("ladder", "cantrilLadder"),
];

/// Field renames inside individual result blobs, applied the same way.
const RENAMED_RESULT_FIELDS: &[(&str, &str)] = &[
    ("totalScore", "score"),
    ("wellBeingLevel", "currentRating"),
];

// ---------------------------------------------------------------------------
// Shape classification
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum PersistedShape {
    Canonical(ProgressionState),
    CompletedList(Vec<String>),
    Unrecognized,
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}

fn classify(payload: &Value) -> PersistedShape {
    // Bare array of completed step ids — the oldest persisted shape.
    if let Some(list) = string_list(payload) {
        return PersistedShape::CompletedList(list);
    }

    if let Some(object) = payload.as_object() {
        // Canonical (or near-canonical: serde aliases heal renamed fields).
        if object.contains_key("completedSteps") || object.contains_key("completed_steps") {
            match serde_json::from_value::<ProgressionState>(payload.clone()) {
                Ok(state) => return PersistedShape::Canonical(state),
                Err(e) => {
                    warn!(error = %e, "canonical-looking payload failed to parse");
                    return PersistedShape::Unrecognized;
                }
            }
        }
        // Legacy object carrying a `completed` list plus assorted keys.
        if let Some(list) = object.get("completed").and_then(string_list) {
            return PersistedShape::CompletedList(list);
        }
    }

    PersistedShape::Unrecognized
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Unlocked set derived from the completed set: the first step, every
/// completed step, and each completed step's successor, in track order.
/// Completed ids unknown to the catalog are kept at the end so no recorded
/// work is dropped.
pub fn derive_unlocked(track: Track, catalog: &Catalog, completed: &[String]) -> Vec<String> {
    let steps = catalog.ordered_steps(track);
    let done = |id: &str| completed.iter().any(|c| c == id);

    let mut unlocked: Vec<String> = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        let first = i == 0;
        let predecessor_done = i > 0 && done(&steps[i - 1].id);
        if first || done(&step.id) || predecessor_done {
            unlocked.push(step.id.clone());
        }
    }
    for id in completed {
        if !unlocked.iter().any(|u| u == id) {
            unlocked.push(id.clone());
        }
    }
    unlocked
}

/// Current step derived as the first unlocked-but-incomplete step in track
/// order, falling back to the last completed step, then the first step.
fn derive_current(
    track: Track,
    catalog: &Catalog,
    completed: &[String],
    unlocked: &[String],
) -> String {
    let in_unlocked = |id: &str| unlocked.iter().any(|u| u == id);
    let done = |id: &str| completed.iter().any(|c| c == id);

    for step in catalog.ordered_steps(track) {
        if in_unlocked(&step.id) && !done(&step.id) {
            return step.id.clone();
        }
    }
    completed
        .last()
        .cloned()
        .or_else(|| catalog.first_step_id(track).map(String::from))
        .unwrap_or_default()
}

fn migrate_result_keys(state: &mut ProgressionState) {
    for &(old, new) in RENAMED_RESULT_KEYS {
        if state.assessment_results.contains_key(new) {
            state.assessment_results.remove(old);
        } else if let Some(value) = state.assessment_results.remove(old) {
            debug!(old, new, "migrated renamed assessment key");
            state.assessment_results.insert(new.to_string(), value);
        }
    }
    for blob in state.assessment_results.values_mut() {
        let Some(object) = blob.as_object_mut() else {
            continue;
        };
        for &(old, new) in RENAMED_RESULT_FIELDS {
            if object.contains_key(new) {
                object.remove(old);
            } else if let Some(value) = object.remove(old) {
                object.insert(new.to_string(), value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a persisted payload of unknown shape into the canonical
/// state. Never fails: an unrecognized payload yields the default state
/// for the track, logged for diagnostics.
pub fn normalize(track: Track, catalog: &Catalog, payload: Value) -> ProgressionState {
    let mut state = match classify(&payload) {
        PersistedShape::Canonical(state) => state,
        PersistedShape::CompletedList(completed) => {
            debug!(track = %track, steps = completed.len(), "legacy completed-list payload");
            ProgressionState {
                completed_steps: completed,
                ..ProgressionState::default()
            }
        }
        PersistedShape::Unrecognized => {
            warn!(track = %track, "unrecognized progression payload, starting fresh");
            return ProgressionState::initial(track, catalog);
        }
    };

    // Heal drift regardless of the shape we accepted.
    state.unlocked_steps = derive_unlocked(track, catalog, &state.completed_steps);
    state.current_step_id = derive_current(
        track,
        catalog,
        &state.completed_steps,
        &state.unlocked_steps,
    );
    for percent in state.video_watch_progress.values_mut() {
        *percent = percent.clamp(0.0, 100.0);
    }
    migrate_result_keys(&mut state);
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
