use crate::domain::ports::{Clock, Identity, IdentityProvider};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Identity provider that always reports the same user, or nobody.
///
/// Used by the CLI and by tests in place of a real sign-in service.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Arc<Mutex<Option<Identity>>>,
}

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        let identity = Identity {
            user_id: user_id.into(),
            email: email.into(),
        };
        Self {
            user: Arc::new(Mutex::new(Some(identity))),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Switches the signed-in user for every clone of this provider.
    pub fn sign_in(&self, user_id: impl Into<String>, email: impl Into<String>) {
        let identity = Identity {
            user_id: user_id.into(),
            email: email.into(),
        };
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = Some(identity);
    }

    pub fn sign_out(&self) {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<Option<Identity>> {
        Ok(self.user.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
