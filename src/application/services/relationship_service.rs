use std::sync::Arc;

use crate::application::errors::CoreError;
use crate::application::profiles::ProfileRepository;
use crate::domain::entities::{Profile, UserId};
use crate::domain::traits::DocumentStore;

/// Service for the friend-request and friendship lifecycle
///
/// Friendship is one edge recorded on both profile documents. The two
/// writes of accept and removal are ordered but not atomic; every write is
/// a commuting set operation, so interrupted flows converge when re-driven
/// through `repair_friendship`.
pub struct RelationshipService {
    profiles: ProfileRepository,
}

impl RelationshipService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            profiles: ProfileRepository::new(store),
        }
    }

    /// Record a friend request on the target's document. Requesting an
    /// existing friend, or re-requesting, is a quiet no-op.
    pub async fn send_friend_request(&self, from: &UserId, to: &UserId) -> Result<(), CoreError> {
        if from == to {
            return Err(CoreError::InvalidTarget);
        }
        let target = self.profiles.require(to).await?;
        if target.has_request_from(from) || target.is_friend(from) {
            tracing::debug!("Friend request {} -> {} already covered", from, to);
            return Ok(());
        }
        self.profiles
            .apply(to, vec![Profile::add_friend_request(from)])
            .await?;
        tracing::info!("Friend request sent: {} -> {}", from, to);
        Ok(())
    }

    /// Accept a pending request. The caller's own document is updated first
    /// in one atomic batch; the sender's side follows. A failure between the
    /// two leaves an asymmetric edge that `repair_friendship` finishes.
    pub async fn accept_friend_request(
        &self,
        self_id: &UserId,
        from: &UserId,
    ) -> Result<(), CoreError> {
        let me = self.profiles.require(self_id).await?;
        if !me.has_request_from(from) {
            return Err(CoreError::NoSuchRequest(from.to_string()));
        }

        self.profiles
            .apply(
                self_id,
                vec![Profile::add_friend(from), Profile::remove_friend_request(from)],
            )
            .await?;
        self.profiles
            .apply(from, vec![Profile::add_friend(self_id)])
            .await?;

        tracing::info!("Friendship established: {} <-> {}", self_id, from);
        Ok(())
    }

    /// Drop a pending request. Idempotent; declining an absent request does
    /// nothing.
    pub async fn decline_friend_request(
        &self,
        self_id: &UserId,
        from: &UserId,
    ) -> Result<(), CoreError> {
        self.profiles
            .apply(self_id, vec![Profile::remove_friend_request(from)])
            .await?;
        tracing::debug!("Friend request declined: {} dropped {}", self_id, from);
        Ok(())
    }

    /// Remove the edge from both sides, caller's side first. Each half is
    /// idempotent.
    pub async fn remove_friend(&self, self_id: &UserId, other: &UserId) -> Result<(), CoreError> {
        self.profiles
            .apply(self_id, vec![Profile::remove_friend(other)])
            .await?;
        self.profiles
            .apply(other, vec![Profile::remove_friend(self_id)])
            .await?;
        tracing::info!("Friendship removed: {} <-> {}", self_id, other);
        Ok(())
    }

    /// Re-drive the unfinished half of an interrupted accept or removal.
    /// The caller's own document is the authority: edge present means an
    /// accept to finish, absent means a removal to finish.
    pub async fn repair_friendship(
        &self,
        self_id: &UserId,
        other: &UserId,
    ) -> Result<(), CoreError> {
        let me = self.profiles.require(self_id).await?;
        if me.is_friend(other) {
            self.profiles
                .apply(other, vec![Profile::add_friend(self_id)])
                .await?;
            tracing::info!("Repaired friendship {} <-> {}: re-added missing edge", self_id, other);
        } else {
            self.profiles
                .apply(other, vec![Profile::remove_friend(self_id)])
                .await?;
            tracing::info!("Repaired friendship {} <-> {}: re-removed stale edge", self_id, other);
        }
        Ok(())
    }

    pub async fn friends_of(&self, user: &UserId) -> Result<Vec<UserId>, CoreError> {
        Ok(self.profiles.require(user).await?.friends)
    }

    pub async fn requests_for(&self, user: &UserId) -> Result<Vec<UserId>, CoreError> {
        Ok(self.profiles.require(user).await?.friend_requests)
    }
}
