//! Guards for mutating process environment variables in tests.
//!
//! Every mutation takes a global re-entrant lock and returns an
//! [`EnvVarGuard`] that puts the previous value back when dropped, removing
//! the variable if it was absent. Stacked guards for one key restore in LIFO
//! order.
//!
//! Tests that read the environment while resolving a schema should hold an
//! [`EnvScope`] for their whole body so no other test can change the
//! variables underneath them.
//!
//! # Examples
//!
//! ```
//! use asp_test_helpers::env;
//!
//! let _g = env::set_var("ASP_DOC_KEY", "VALUE");
//! assert_eq!(std::env::var("ASP_DOC_KEY").as_deref(), Ok("VALUE"));
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// # Safety
///
/// Callers must hold `ENV_MUTEX`.
unsafe fn env_set_var(key: &str, value: &OsStr) {
    unsafe { env::set_var(key, value) };
}

/// # Safety
///
/// Callers must hold `ENV_MUTEX`.
unsafe fn env_remove_var(key: &str) {
    unsafe { env::remove_var(key) };
}

fn mutate_locked<F>(key: String, mutator: F, _guard: &ReentrantMutexGuard<'static, ()>) -> EnvVarGuard
where
    F: FnOnce(&str),
{
    let original = env::var_os(&key);
    mutator(&key);
    EnvVarGuard { key, original }
}

/// Restores an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _guard = ENV_MUTEX.lock();
        if let Some(val) = self.original.take() {
            // SAFETY: `ENV_MUTEX` is held.
            unsafe { env_set_var(&self.key, &val) };
        } else {
            // SAFETY: `ENV_MUTEX` is held.
            unsafe { env_remove_var(&self.key) };
        }
    }
}

/// Holds the global environment lock until dropped.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    guard: ReentrantMutexGuard<'static, ()>,
}

impl EnvVarLock {
    /// Sets `key` under the held lock.
    pub fn set_var<K, V>(&self, key: K, value: V) -> EnvVarGuard
    where
        K: Into<String>,
        V: AsRef<OsStr>,
    {
        mutate_locked(
            key.into(),
            // SAFETY: the lock is held for the lifetime of `self`.
            |k| unsafe { env_set_var(k, value.as_ref()) },
            &self.guard,
        )
    }

    /// Removes `key` under the held lock.
    pub fn remove_var<K>(&self, key: K) -> EnvVarGuard
    where
        K: Into<String>,
    {
        // SAFETY: the lock is held for the lifetime of `self`.
        mutate_locked(key.into(), |k| unsafe { env_remove_var(k) }, &self.guard)
    }

    /// Removes every variable whose name starts with `prefix`.
    ///
    /// Variables with non-unicode names are left alone.
    pub fn clear_prefixed(&self, prefix: &str) -> Vec<EnvVarGuard> {
        let keys: Vec<String> = env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.into_iter().map(|key| self.remove_var(key)).collect()
    }
}

impl fmt::Debug for EnvVarLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarLock").finish_non_exhaustive()
    }
}

/// Holds the environment lock together with the guards created under it.
///
/// Guards are restored before the lock is released.
#[must_use = "dropping releases the environment lock and restores guards"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvVarLock,
}

impl fmt::Debug for EnvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvScope")
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

/// Sets `key` and returns a guard restoring its prior value.
///
/// ```
/// use asp_test_helpers::env;
///
/// let _g = env::set_var("ASP_DOC_FOO", "bar");
/// assert!(matches!(std::env::var("ASP_DOC_FOO"), Ok(ref value) if value == "bar"));
/// ```
pub fn set_var<K, V>(key: K, value: V) -> EnvVarGuard
where
    K: Into<String>,
    V: AsRef<OsStr>,
{
    lock().set_var(key, value)
}

/// Removes `key` and returns a guard restoring its prior value.
///
/// ```
/// use asp_test_helpers::env;
///
/// let _g = env::remove_var("ASP_DOC_FOO");
/// assert!(std::env::var("ASP_DOC_FOO").is_err());
/// ```
pub fn remove_var<K>(key: K) -> EnvVarGuard
where
    K: Into<String>,
{
    lock().remove_var(key)
}

/// Acquires the global environment lock.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        guard: ENV_MUTEX.lock(),
    }
}

/// Runs `builder` under the lock and keeps both the lock and the returned
/// guards alive in an [`EnvScope`].
///
/// ```
/// use asp_test_helpers::env;
///
/// let _scope = env::scope_with(|lock| {
///     let mut guards = lock.clear_prefixed("ASP_DOC_");
///     guards.push(lock.set_var("ASP_DOC_PORT", "8080"));
///     guards
/// });
/// assert_eq!(std::env::var("ASP_DOC_PORT").as_deref(), Ok("8080"));
/// ```
pub fn scope_with<F>(builder: F) -> EnvScope
where
    F: FnOnce(&EnvVarLock) -> Vec<EnvVarGuard>,
{
    let held = lock();
    let guards = builder(&held);
    EnvScope {
        guards,
        _lock: held,
    }
}

/// Runs `f` while holding the global environment lock.
pub fn with_lock<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock();
    f()
}
