//! Per-run pool of remote repository sessions

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::error::{Error, Result};
use crate::svn::{RemoteSession, SessionFactory};

/// Caches one open session per repository URL.
///
/// Sessions are created lazily. Creation happens while the map lock is held,
/// so concurrent callers asking for the same URL never open two sessions.
/// A pool lives for one run: build it, pass it by reference, then `close` it.
pub struct SessionPool {
    factory: Box<dyn SessionFactory>,
    sessions: Mutex<HashMap<String, Arc<dyn RemoteSession>>>,
}

impl SessionPool {
    pub fn new(factory: Box<dyn SessionFactory>) -> Self {
        Self {
            factory,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session for `url`, opening and caching it if not present
    pub fn repo_for(&self, url: &str) -> Result<Arc<dyn RemoteSession>> {
        let mut sessions = self.lock()?;
        if let Some(session) = sessions.get(url) {
            return Ok(Arc::clone(session));
        }

        let session = self.factory.open(url)?;
        sessions.insert(url.to_string(), Arc::clone(&session));
        Ok(session)
    }

    /// Number of open sessions
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Drop every cached session, ending the pool's lifetime.
    pub fn close(self) -> Result<()> {
        let mut sessions = self.lock()?;
        debug!("closing {} svn session(s)", sessions.len());
        sessions.clear();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Arc<dyn RemoteSession>>>> {
        self.sessions.lock().map_err(|_| Error::LockPoisoned {
            context: "svn session pool".to_string(),
        })
    }
}
