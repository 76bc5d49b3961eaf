use crate::types::Track;
use std::path::{Path, PathBuf};

pub const CACHE_DIR_NAME: &str = ".stride";

/// Default location for pending-save caches: `~/.stride`, falling back to
/// the system temp dir when no home directory exists.
pub fn default_cache_dir() -> PathBuf {
    home::home_dir()
        .map(|h| h.join(CACHE_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(CACHE_DIR_NAME))
}

/// Pending-save cache file for one (user, track) pair.
pub fn pending_path(cache_dir: &Path, user_id: &str, track: Track) -> PathBuf {
    cache_dir.join(format!("pending-{}-{}.json", sanitize(user_id), track))
}

/// User ids come from an external auth system; keep only filename-safe
/// characters when embedding them in a cache path.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
