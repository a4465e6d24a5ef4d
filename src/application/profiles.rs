//! Typed access to user-profile documents.

use std::sync::Arc;

use crate::application::errors::{CoreError, StoreError};
use crate::domain::entities::{Document, FieldUpdate, Profile, UserId};
use crate::domain::traits::DocumentStore;

/// Typed reads and field-level writes against the `users` collection.
///
/// Decoding happens here; a document missing required fields is a schema
/// error, never a silently defaulted profile.
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create the profile document for a new user id. Returns the stored
    /// profile with server-assigned timestamps filled in.
    pub async fn create(&self, id: &UserId, document: Document) -> Result<Profile, CoreError> {
        let stored = self
            .store
            .create(Profile::COLLECTION, id.as_str(), document)
            .await?;
        Ok(Profile::from_document(id, &stored)?)
    }

    pub async fn get(&self, id: &UserId) -> Result<Option<Profile>, CoreError> {
        match self.store.get(Profile::COLLECTION, id.as_str()).await? {
            Some(doc) => Ok(Some(Profile::from_document(id, &doc)?)),
            None => Ok(None),
        }
    }

    /// Like `get`, but an absent profile is an error naming the document.
    pub async fn require(&self, id: &UserId) -> Result<Profile, CoreError> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("users/{}", id)))
    }

    /// Lookup by normalized username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, CoreError> {
        let rows = self
            .store
            .query(Profile::COLLECTION, &Profile::with_username(username))
            .await?;
        match rows.into_iter().next() {
            Some((id, doc)) => {
                let id = UserId::new(id);
                Ok(Some(Profile::from_document(&id, &doc)?))
            }
            None => Ok(None),
        }
    }

    /// Apply a batch of field updates to one profile document.
    pub async fn apply(&self, id: &UserId, updates: Vec<FieldUpdate>) -> Result<(), CoreError> {
        match self
            .store
            .apply(Profile::COLLECTION, id.as_str(), updates)
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::Missing(_)) => Err(CoreError::NotFound(format!("users/{}", id))),
            Err(e) => Err(e.into()),
        }
    }
}
