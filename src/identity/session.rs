use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::role::{Role, RoleParseError};
use crate::storage::{KvBackend, StorageError};
use crate::tprintln;

/// Storage key holding the active role literal.
pub const ROLE_KEY: &str = "userRole";

/// Single source of truth for who is acting.
///
/// Holds at most one role in memory and mirrors it to a [`KvBackend`] so a restart
/// keeps the session. Storage failures never surface to callers: the store keeps
/// working in memory and flips [`SessionStore::is_degraded`].
pub struct SessionStore {
    role: RwLock<Option<Role>>,
    backend: Box<dyn KvBackend>,
    degraded: AtomicBool,
}

impl SessionStore {
    /// Build the store and initialize the role from persisted storage.
    pub fn open(backend: Box<dyn KvBackend>) -> Self {
        let s = Self { role: RwLock::new(None), backend, degraded: AtomicBool::new(false) };
        let initial = match s.backend.get(ROLE_KEY) {
            Ok(Some(raw)) => match raw.parse::<Role>() {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(target: "session", "discarding persisted role: {}", e);
                    if let Err(e) = s.backend.remove(ROLE_KEY) { s.note_failure("open", &e); }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => { s.note_failure("open", &e); None }
        };
        *s.role.write() = initial;
        debug!(target: "session", backend = s.backend.kind(), role = ?initial, "session opened");
        s
    }

    pub fn role(&self) -> Option<Role> { *self.role.read() }

    /// Memory and storage change under one write guard, so concurrent logins
    /// cannot leave them holding different roles.
    pub fn set_role(&self, role: Role) {
        let mut current = self.role.write();
        *current = Some(role);
        if let Err(e) = self.backend.set(ROLE_KEY, role.as_str()) { self.note_failure("set_role", &e); }
        tprintln!("session.set_role role={}", role);
    }

    /// Parse an untrusted role string and apply it. Nothing changes on rejection.
    pub fn set_role_str(&self, raw: &str) -> Result<Role, RoleParseError> {
        let role = raw.parse::<Role>()?;
        self.set_role(role);
        Ok(role)
    }

    pub fn clear_role(&self) {
        let mut current = self.role.write();
        *current = None;
        if let Err(e) = self.backend.remove(ROLE_KEY) { self.note_failure("clear_role", &e); }
        tprintln!("session.clear_role");
    }

    /// True once any storage call has failed; the session is then memory-only.
    pub fn is_degraded(&self) -> bool { self.degraded.load(Ordering::Relaxed) }

    pub fn backend_kind(&self) -> &'static str { self.backend.kind() }

    fn note_failure(&self, op: &str, err: &StorageError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!(target: "session", op, "storage failed, continuing in memory: {}", err);
        } else {
            debug!(target: "session", op, "storage failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKv, MemoryKv, UnavailableKv};
    use tempfile::tempdir;

    #[test]
    fn read_after_write_and_clear() {
        let s = SessionStore::open(Box::new(MemoryKv::new()));
        assert_eq!(s.role(), None);
        s.set_role(Role::Lgu);
        assert_eq!(s.role(), Some(Role::Lgu));
        assert_eq!(s.role(), Some(Role::Lgu));
        s.clear_role();
        assert_eq!(s.role(), None);
        assert!(!s.is_degraded());
    }

    #[test]
    fn initializes_from_backend() {
        let kv = MemoryKv::new();
        kv.set(ROLE_KEY, "BusinessOwner").unwrap();
        let s = SessionStore::open(Box::new(kv));
        assert_eq!(s.role(), Some(Role::BusinessOwner));
    }

    #[test]
    fn garbage_persisted_value_opens_as_absent() {
        let kv = MemoryKv::new();
        kv.set(ROLE_KEY, "Admin").unwrap();
        let s = SessionStore::open(Box::new(kv));
        assert_eq!(s.role(), None);
        assert!(!s.is_degraded());
    }

    #[test]
    fn rejected_string_leaves_state_alone() {
        let s = SessionStore::open(Box::new(MemoryKv::new()));
        s.set_role(Role::Lgu);
        assert!(s.set_role_str("superuser").is_err());
        assert_eq!(s.role(), Some(Role::Lgu));
        assert_eq!(s.set_role_str("businessowner").unwrap(), Role::BusinessOwner);
        assert_eq!(s.role(), Some(Role::BusinessOwner));
    }

    #[test]
    fn unavailable_storage_degrades_to_memory() {
        let s = SessionStore::open(Box::new(UnavailableKv::new("headless")));
        assert_eq!(s.role(), None);
        assert!(s.is_degraded());
        s.set_role(Role::BusinessOwner);
        assert_eq!(s.role(), Some(Role::BusinessOwner));
        s.clear_role();
        assert_eq!(s.role(), None);
    }

    #[test]
    fn concurrent_logins_agree_with_disk() {
        for _ in 0..20 {
            let tmp = tempdir().unwrap();
            let s = SessionStore::open(Box::new(FileKv::open(tmp.path(), "session").unwrap()));
            std::thread::scope(|scope| {
                for t in 0..8 {
                    let s = &s;
                    scope.spawn(move || {
                        for i in 0..20 {
                            let role = if (t + i) % 2 == 0 { Role::Lgu } else { Role::BusinessOwner };
                            s.set_role(role);
                        }
                    });
                }
            });
            assert!(!s.is_degraded());
            let in_memory = s.role();
            drop(s);
            let reopened = SessionStore::open(Box::new(FileKv::open(tmp.path(), "session").unwrap()));
            assert_eq!(reopened.role(), in_memory);
        }
    }
}
