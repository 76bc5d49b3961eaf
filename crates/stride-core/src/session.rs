//! Workshop session — the top-level façade a host application drives.
//!
//! Owns the tracker, the persistence gateway, and the debounced-save
//! bookkeeping for one (user, track) pair. High-frequency events (video
//! ticks) are coalesced; milestone events (completion, assessment results,
//! reset) save immediately. The host forwards its own clock through the
//! event methods so the session never spawns timers of its own.

use crate::curriculum::Catalog;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::evaluate::Evidence;
use crate::progress::{Completion, ProgressionState, ProgressTracker};
use crate::reconcile;
use crate::sync::{ProgressGateway, SaveOutcome};
use crate::types::Track;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Coalescing window for video-tick saves.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

pub struct WorkshopSession {
    user_id: String,
    catalog: Catalog,
    tracker: ProgressTracker,
    gateway: ProgressGateway,
    debounce: Debouncer,
}

impl WorkshopSession {
    /// Open a session: fetch whatever the remote holds, normalize it into
    /// the canonical shape, and adopt it. A failed load logs and starts
    /// from defaults rather than blocking the user.
    pub fn start(
        user_id: impl Into<String>,
        track: Track,
        catalog: Catalog,
        gateway: ProgressGateway,
        debounce_delay: Duration,
    ) -> Self {
        let user_id = user_id.into();
        let tracker = match gateway.load(&user_id, track) {
            Ok(Some(payload)) => {
                let state = reconcile::normalize(track, &catalog, payload);
                ProgressTracker::initialize(track, state)
            }
            Ok(None) => {
                info!(user_id = %user_id, track = %track, "no stored progress, starting fresh");
                ProgressTracker::new(track, &catalog)
            }
            Err(e) => {
                warn!(user_id = %user_id, track = %track, error = %e, "load failed, starting from defaults");
                ProgressTracker::new(track, &catalog)
            }
        };
        Self {
            user_id,
            catalog,
            tracker,
            gateway,
            debounce: Debouncer::new(debounce_delay),
        }
    }

    // ---------------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------------

    /// A video player tick. Recorded immediately; the save is debounced.
    pub fn on_video_tick(&mut self, step_id: &str, percent: f64, now: Instant) {
        self.tracker.record_video_progress(step_id, percent);
        self.debounce.note_change(now);
    }

    /// Attempt to complete a step. A successful completion is a milestone
    /// and saves right away; a blocked attempt changes nothing and saves
    /// nothing.
    pub fn complete_step(&mut self, step_id: &str, evidence: &Evidence) -> Completion {
        let result = self
            .tracker
            .mark_step_completed(step_id, evidence, &self.catalog);
        if result.is_completed() {
            self.debounce.cancel();
            self.save_now();
        }
        result
    }

    /// Store an assessment result payload and save immediately.
    pub fn record_assessment(&mut self, step_id: &str, result: serde_json::Value) {
        self.tracker.record_assessment_result(step_id, result);
        self.debounce.cancel();
        self.save_now();
    }

    /// Page hidden / app backgrounded: flush any coalesced write now so a
    /// closing tab cannot drop the last few ticks.
    pub fn on_visibility_hidden(&mut self) {
        if self.debounce.flush() {
            self.save_now();
        }
    }

    /// Periodic housekeeping tick from the host. Fires a due debounced
    /// save and opportunistically replays a deferred one.
    pub fn on_interval_tick(&mut self, now: Instant) {
        if self.debounce.take_due(now) {
            self.save_now();
        }
        if self.gateway.has_pending(&self.user_id, self.tracker.track()) {
            match self.gateway.flush_pending(&self.user_id, self.tracker.track()) {
                Ok(true) => info!(user_id = %self.user_id, "deferred save replayed"),
                Ok(false) => {}
                Err(e) => warn!(user_id = %self.user_id, error = %e, "deferred save still failing"),
            }
        }
    }

    /// Administrative reset: wipe local state, the remote record, and any
    /// pending cache, then persist the fresh state.
    pub fn reset(&mut self) -> Result<()> {
        self.tracker.reset(&self.catalog);
        self.debounce.cancel();
        self.gateway.clear(&self.user_id, self.tracker.track())?;
        self.save_now();
        Ok(())
    }

    fn save_now(&mut self) -> SaveOutcome {
        self.gateway
            .save(&self.user_id, self.tracker.track(), self.tracker.state())
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn state(&self) -> &ProgressionState {
        self.tracker.state()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.debounce.is_dirty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::GatewayConfig;
    use tempfile::TempDir;

    fn gateway(server: &mockito::ServerGuard, cache: &TempDir) -> ProgressGateway {
        ProgressGateway::new(GatewayConfig {
            base_url: server.url(),
            max_retries: 0,
            backoff_ms: 1,
            timeout_seconds: 5,
            cache_dir: Some(cache.path().to_path_buf()),
        })
        .unwrap()
    }

    fn start(server: &mockito::ServerGuard, cache: &TempDir) -> WorkshopSession {
        WorkshopSession::start(
            "u1",
            Track::Ast,
            Catalog::default(),
            gateway(server, cache),
            Duration::from_secs(2),
        )
    }

    #[test]
    fn start_adopts_a_legacy_payload() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _m = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["1-1", "2-1"]"#)
            .create();
        let session = start(&server, &cache);
        assert!(session.tracker().is_step_completed("1-1"));
        assert!(session.tracker().is_step_completed("2-1"));
        assert!(session.tracker().is_step_unlocked("2-2"));
        assert_eq!(session.tracker().current_step_id(), "2-2");
    }

    #[test]
    fn start_survives_an_unreachable_remote() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _m = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(500)
            .create();
        let session = start(&server, &cache);
        assert_eq!(session.tracker().current_step_id(), "1-1");
        assert!(session.state().completed_steps.is_empty());
    }

    #[test]
    fn video_ticks_debounce_into_one_save() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _get = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(404)
            .create();
        let post = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();

        let mut session = start(&server, &cache);
        let t0 = Instant::now();
        session.on_video_tick("1-1", 10.0, t0);
        session.on_video_tick("1-1", 20.0, t0 + Duration::from_millis(500));
        session.on_video_tick("1-1", 30.0, t0 + Duration::from_secs(1));
        assert!(session.has_unsaved_changes());

        // Not due yet.
        session.on_interval_tick(t0 + Duration::from_secs(2));
        // Due: one save for three ticks.
        session.on_interval_tick(t0 + Duration::from_secs(4));
        post.assert();
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.tracker().video_progress("1-1"), 30.0);
    }

    #[test]
    fn completion_saves_immediately() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _get = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(404)
            .create();
        let post = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();

        let mut session = start(&server, &cache);
        session.on_video_tick("1-1", 95.0, Instant::now());
        let result = session.complete_step("1-1", &Evidence::default());
        assert!(result.is_completed());
        post.assert();
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn blocked_completion_does_not_save() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _get = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(404)
            .create();
        let post = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(0)
            .create();

        let mut session = start(&server, &cache);
        // 1-1 requires a minimum watch percentage; no evidence supplied.
        let result = session.complete_step("1-1", &Evidence::default());
        assert!(!result.is_completed());
        post.assert();
    }

    #[test]
    fn hidden_page_flushes_the_pending_write() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _get = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(404)
            .create();
        let post = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();

        let mut session = start(&server, &cache);
        session.on_video_tick("1-1", 42.0, Instant::now());
        session.on_visibility_hidden();
        post.assert();
        // A second hide with nothing dirty saves nothing further.
        session.on_visibility_hidden();
        post.assert();
    }

    #[test]
    fn interval_tick_replays_a_deferred_save() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _get = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(404)
            .create();
        let fail = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(500)
            .expect(1)
            .create();

        let mut session = start(&server, &cache);
        session.on_video_tick("1-1", 42.0, Instant::now());
        session.on_visibility_hidden();
        fail.assert();

        let ok = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();
        session.on_interval_tick(Instant::now());
        ok.assert();
    }

    #[test]
    fn reset_clears_remote_and_persists_fresh_state() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _get = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["1-1"]"#)
            .create();
        let delete = server
            .mock("DELETE", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();
        let post = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();

        let mut session = start(&server, &cache);
        assert!(session.tracker().is_step_completed("1-1"));
        session.reset().unwrap();
        delete.assert();
        post.assert();
        assert!(session.state().completed_steps.is_empty());
        assert_eq!(session.tracker().current_step_id(), "1-1");
    }
}
