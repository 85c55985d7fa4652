// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Login sessions.
//!
//! A [`Session`] is created by [`login`] once the token has been accepted
//! upstream and lives in the [`SessionRegistry`] until logout. Handlers get
//! the session by id; nothing reads the token from ambient state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::client::VideoApiClient;
use crate::error::{CamviewError, Result};
use crate::models::{Camera, UserProfile};
use crate::playback::PlaybackSession;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub token: String,
    pub user: UserProfile,
    pub cameras: Vec<Camera>,
    pub created_at: DateTime<Utc>,
    /// Open playbacks keyed by camera id.
    pub playbacks: HashMap<String, PlaybackSession>,
}

impl Session {
    pub fn camera(&self, camera_id: &str) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id == camera_id)
    }
}

/// Validate `token` upstream and build a new session with the shared cameras.
pub async fn login(client: &VideoApiClient, token: &str) -> Result<Session> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CamviewError::MissingToken);
    }
    let user = client.me(token).await?;
    let cameras = client.shared_cameras(token).await?;

    let session = Session {
        id: Uuid::new_v4().to_string(),
        token: token.to_string(),
        user,
        cameras,
        created_at: Utc::now(),
        playbacks: HashMap::new(),
    };
    info!(
        session = session.id,
        user = session.user.id,
        cameras = session.cameras.len(),
        "Logged in"
    );
    Ok(session)
}

/// Shared map of live sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.inner.write().insert(session.id.clone(), session);
    }

    /// Snapshot of the session. Callers must not hold registry locks across
    /// upstream requests, so they work on a copy and write back with `update`.
    pub fn get(&self, id: &str) -> Result<Session> {
        self.inner
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CamviewError::SessionNotFound { id: id.to_string() })
    }

    /// Apply `f` to the stored session.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> Result<R> {
        let mut sessions = self.inner.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| CamviewError::SessionNotFound { id: id.to_string() })?;
        Ok(f(session))
    }

    /// Logout: forget the session and everything it holds.
    pub fn remove(&self, id: &str) -> Result<Session> {
        let removed = self
            .inner
            .write()
            .remove(id)
            .ok_or_else(|| CamviewError::SessionNotFound { id: id.to_string() })?;
        info!(session = id, "Logged out");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
