use async_trait::async_trait;

use crate::domain::entities::UserId;

/// IdentityProvider trait - abstraction for the external sign-in system
///
/// Services never consult it implicitly; callers resolve the acting user id
/// here and pass it in explicitly.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Stable id of the signed-in user, if any.
    async fn current_user(&self) -> Option<UserId>;

    /// Whether a session is active.
    async fn session_active(&self) -> bool {
        self.current_user().await.is_some()
    }
}

/// Always-signed-in identity for tests and local tools.
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    user: UserId,
}

impl FixedIdentity {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: UserId::new(user),
        }
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn current_user(&self) -> Option<UserId> {
        Some(self.user.clone())
    }
}
