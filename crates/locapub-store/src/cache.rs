use crate::error::Result;

/// Best-effort string cache scoped to one client session.
///
/// Entries are snapshots: nothing invalidates them except an explicit
/// [`invalidate`](CacheStore::invalidate) or an overwrite. Concurrent writers
/// race with last-write-wins.
pub trait CacheStore: Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn invalidate(&self, key: &str) -> Result<()>;
}
