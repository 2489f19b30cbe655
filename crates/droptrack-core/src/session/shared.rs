use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use super::Session;
use crate::error::Result;
use crate::model::Timestamp;
use crate::storage::Repository;

/// A session behind one mutex, shared by the capture thread and readers.
pub struct SharedSession<R: Repository> {
    inner: Arc<Mutex<Session<R>>>,
}

impl<R: Repository> Clone for SharedSession<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Repository> SharedSession<R> {
    pub fn new(session: Session<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Lock the session; a poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Session<R>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Session lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Feed one chunk under the lock.
    pub fn feed(&self, chunk: &[u8], time: Timestamp) -> Result<usize> {
        self.lock().feed(chunk, time)
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<T>(&self, f: impl FnOnce(&mut Session<R>) -> T) -> T {
        f(&mut self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, Preferences};
    use crate::storage::MemoryRepository;
    use chrono::Utc;
    use std::thread;

    #[test]
    fn test_feed_from_another_thread() {
        let session = Session::new(
            MemoryRepository::new(),
            GameConfig::default(),
            Preferences::new(),
        )
        .unwrap();
        let shared = SharedSession::new(session);

        let writer = shared.clone();
        thread::spawn(move || {
            writer.feed(b"36;0;1,Bone,7\0", Utc::now()).unwrap();
        })
        .join()
        .unwrap();

        let value = shared.with(|s| s.repo().item_price("Bone").unwrap().unwrap().value);
        assert_eq!(value, 7);
    }
}
