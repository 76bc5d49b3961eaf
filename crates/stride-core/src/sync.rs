//! Persistence gateway — synchronizes progression state with the remote
//! store keyed by (user, track).
//!
//! The remote is an external collaborator: loads that fail leave the
//! caller free to start from defaults, and saves retry with backoff and
//! then fall back to an on-disk pending cache that is replayed
//! opportunistically. A failed save never propagates as a hard error to
//! the caller.

use crate::error::{Result, StrideError};
use crate::io;
use crate::paths;
use crate::progress::ProgressionState;
use crate::types::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// GatewayConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Pending-cache directory; defaults to `~/.stride`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            timeout_seconds: default_timeout_seconds(),
            cache_dir: None,
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_timeout_seconds() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// SaveOutcome / PendingSave
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Accepted by the remote store.
    Synced,
    /// Remote unreachable; payload parked in the local pending cache.
    Deferred,
    /// Remote unreachable and the pending cache could not be written.
    Failed,
}

impl SaveOutcome {
    pub fn is_synced(self) -> bool {
        matches!(self, SaveOutcome::Synced)
    }
}

/// On-disk shape of a deferred save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingSave {
    saved_at: DateTime<Utc>,
    state: ProgressionState,
}

// ---------------------------------------------------------------------------
// ProgressGateway
// ---------------------------------------------------------------------------

pub struct ProgressGateway {
    cfg: GatewayConfig,
    http: reqwest::blocking::Client,
    cache_dir: PathBuf,
}

impl ProgressGateway {
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;
        let cache_dir = cfg
            .cache_dir
            .clone()
            .unwrap_or_else(paths::default_cache_dir);
        Ok(Self {
            cfg,
            http,
            cache_dir,
        })
    }

    fn progress_url(&self, user_id: &str, track: Track) -> String {
        format!(
            "{}/api/users/{}/navigation-progress/{}",
            self.cfg.base_url.trim_end_matches('/'),
            user_id,
            track
        )
    }

    fn pending_path(&self, user_id: &str, track: Track) -> PathBuf {
        paths::pending_path(&self.cache_dir, user_id, track)
    }

    // ---------------------------------------------------------------------------
    // Load
    // ---------------------------------------------------------------------------

    /// Fetch the persisted payload, in whatever historical shape the remote
    /// holds. Absence of a record (404 or JSON null) is `Ok(None)`, not an
    /// error; transport failures are `Err` and the caller proceeds with
    /// defaults.
    pub fn load(&self, user_id: &str, track: Track) -> Result<Option<Value>> {
        let url = self.progress_url(user_id, track);
        let response = self.http.get(&url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StrideError::Remote(format!(
                "load returned {} for {url}",
                response.status()
            )));
        }
        let payload: Value = response.json()?;
        if payload.is_null() {
            return Ok(None);
        }
        Ok(Some(payload))
    }

    // ---------------------------------------------------------------------------
    // Save
    // ---------------------------------------------------------------------------

    /// Upsert the state. Retries with linear backoff; after the last
    /// attempt the payload is parked in the pending cache for later replay.
    pub fn save(&self, user_id: &str, track: Track, state: &ProgressionState) -> SaveOutcome {
        let attempts = self.cfg.max_retries + 1;
        for attempt in 1..=attempts {
            match self.post_state(user_id, track, state) {
                Ok(()) => {
                    debug!(user_id, track = %track, attempt, "progress saved");
                    return SaveOutcome::Synced;
                }
                Err(e) => {
                    warn!(user_id, track = %track, attempt, error = %e, "save attempt failed");
                    if attempt < attempts {
                        std::thread::sleep(Duration::from_millis(
                            self.cfg.backoff_ms * u64::from(attempt),
                        ));
                    }
                }
            }
        }

        let pending = PendingSave {
            saved_at: Utc::now(),
            state: state.clone(),
        };
        match io::write_json(&self.pending_path(user_id, track), &pending) {
            Ok(()) => {
                warn!(user_id, track = %track, "save deferred to local cache");
                SaveOutcome::Deferred
            }
            Err(e) => {
                warn!(user_id, track = %track, error = %e, "pending cache write failed");
                SaveOutcome::Failed
            }
        }
    }

    fn post_state(&self, user_id: &str, track: Track, state: &ProgressionState) -> Result<()> {
        let url = self.progress_url(user_id, track);
        let response = self.http.post(&url).json(state).send()?;
        if !response.status().is_success() {
            return Err(StrideError::Remote(format!(
                "save returned {} for {url}",
                response.status()
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Pending cache replay
    // ---------------------------------------------------------------------------

    /// Replay a deferred save if one exists. Returns true when a pending
    /// payload was accepted and the cache file removed. A still-failing
    /// remote leaves the cache in place for the next tick.
    pub fn flush_pending(&self, user_id: &str, track: Track) -> Result<bool> {
        let path = self.pending_path(user_id, track);
        let Some(pending) = io::read_json::<PendingSave>(&path)? else {
            return Ok(false);
        };
        self.post_state(user_id, track, &pending.state)?;
        std::fs::remove_file(&path)?;
        debug!(user_id, track = %track, "pending save replayed");
        Ok(true)
    }

    pub fn has_pending(&self, user_id: &str, track: Track) -> bool {
        self.pending_path(user_id, track).exists()
    }

    // ---------------------------------------------------------------------------
    // Administrative reset
    // ---------------------------------------------------------------------------

    /// Clear the remote record and any pending cache. Absence of either is
    /// not an error.
    pub fn clear(&self, user_id: &str, track: Track) -> Result<()> {
        let path = self.pending_path(user_id, track);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        let url = self.progress_url(user_id, track);
        let response = self.http.delete(&url).send()?;
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(StrideError::Remote(format!(
                "clear returned {} for {url}",
                response.status()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Catalog;
    use tempfile::TempDir;

    fn gateway(server: &mockito::ServerGuard, cache: &TempDir) -> ProgressGateway {
        let cfg = GatewayConfig {
            base_url: server.url(),
            max_retries: 1,
            backoff_ms: 1,
            timeout_seconds: 5,
            cache_dir: Some(cache.path().to_path_buf()),
        };
        ProgressGateway::new(cfg).unwrap()
    }

    fn sample_state() -> ProgressionState {
        let catalog = Catalog::default();
        ProgressionState::initial(Track::Ast, &catalog)
    }

    #[test]
    fn load_missing_record_is_none() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _m = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(404)
            .create();
        let gw = gateway(&server, &cache);
        assert!(gw.load("u1", Track::Ast).unwrap().is_none());
    }

    #[test]
    fn load_null_body_is_none() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _m = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("null")
            .create();
        let gw = gateway(&server, &cache);
        assert!(gw.load("u1", Track::Ast).unwrap().is_none());
    }

    #[test]
    fn load_returns_payload_as_is() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _m = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["1-1","2-1"]"#)
            .create();
        let gw = gateway(&server, &cache);
        let payload = gw.load("u1", Track::Ast).unwrap().unwrap();
        assert!(payload.is_array());
    }

    #[test]
    fn load_server_error_is_err() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _m = server
            .mock("GET", "/api/users/u1/navigation-progress/ast")
            .with_status(500)
            .create();
        let gw = gateway(&server, &cache);
        assert!(gw.load("u1", Track::Ast).is_err());
    }

    #[test]
    fn save_succeeds_first_try() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let m = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();
        let gw = gateway(&server, &cache);
        assert_eq!(gw.save("u1", Track::Ast, &sample_state()), SaveOutcome::Synced);
        m.assert();
        assert!(!gw.has_pending("u1", Track::Ast));
    }

    #[test]
    fn save_retries_then_succeeds() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        // mockito serves the oldest matching mock with remaining expected
        // hits, so the 503 registered first takes the first attempt and
        // the retry falls through to the 200.
        let fail = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(503)
            .expect(1)
            .create();
        let ok = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();
        let gw = gateway(&server, &cache);
        assert_eq!(gw.save("u1", Track::Ast, &sample_state()), SaveOutcome::Synced);
        fail.assert();
        ok.assert();
        assert!(!gw.has_pending("u1", Track::Ast));
    }

    #[test]
    fn exhausted_retries_defer_to_pending_cache() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let m = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(500)
            .expect(2) // initial + one retry
            .create();
        let gw = gateway(&server, &cache);
        assert_eq!(
            gw.save("u1", Track::Ast, &sample_state()),
            SaveOutcome::Deferred
        );
        m.assert();
        assert!(gw.has_pending("u1", Track::Ast));
    }

    #[test]
    fn flush_pending_replays_and_clears() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _fail = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(500)
            .expect(2)
            .create();
        let gw = gateway(&server, &cache);
        gw.save("u1", Track::Ast, &sample_state());
        assert!(gw.has_pending("u1", Track::Ast));

        let _ok = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(200)
            .expect(1)
            .create();
        assert!(gw.flush_pending("u1", Track::Ast).unwrap());
        assert!(!gw.has_pending("u1", Track::Ast));
        // Nothing left to replay.
        assert!(!gw.flush_pending("u1", Track::Ast).unwrap());
    }

    #[test]
    fn flush_pending_keeps_cache_while_remote_fails() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _fail = server
            .mock("POST", "/api/users/u1/navigation-progress/ast")
            .with_status(500)
            .expect_at_least(3)
            .create();
        let gw = gateway(&server, &cache);
        gw.save("u1", Track::Ast, &sample_state());
        assert!(gw.flush_pending("u1", Track::Ast).is_err());
        assert!(gw.has_pending("u1", Track::Ast));
    }

    #[test]
    fn clear_tolerates_missing_remote_record() {
        let mut server = mockito::Server::new();
        let cache = TempDir::new().unwrap();
        let _m = server
            .mock("DELETE", "/api/users/u1/navigation-progress/ast")
            .with_status(404)
            .create();
        let gw = gateway(&server, &cache);
        assert!(gw.clear("u1", Track::Ast).is_ok());
    }
}
