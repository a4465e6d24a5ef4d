use std::sync::Arc;

use crate::application::errors::CoreError;
use crate::application::profiles::ProfileRepository;
use crate::domain::entities::{Avatar, Presence, Profile, UserId};
use crate::domain::traits::DocumentStore;

/// What a freshly registered profile starts with.
#[derive(Debug, Clone)]
pub struct RegistrationDefaults {
    pub starting_balance: u64,
    pub bio: String,
    pub avatar: Avatar,
}

impl Default for RegistrationDefaults {
    fn default() -> Self {
        Self {
            starting_balance: 0,
            bio: "Hello! I'm new to Creatoplay!".to_string(),
            avatar: Avatar::default(),
        }
    }
}

/// Service for registration, profile settings, and presence
pub struct AccountService {
    profiles: ProfileRepository,
    defaults: RegistrationDefaults,
}

impl AccountService {
    pub fn new(store: Arc<dyn DocumentStore>, defaults: RegistrationDefaults) -> Self {
        Self {
            profiles: ProfileRepository::new(store),
            defaults,
        }
    }

    /// Create the profile document for a new user id. The username must be
    /// 3-20 characters and free under normalized lookup; everything else
    /// starts from the configured defaults.
    pub async fn register(&self, user_id: &UserId, username: &str) -> Result<Profile, CoreError> {
        if username.chars().count() < 3 || username.chars().count() > 20 {
            return Err(CoreError::InvalidUsername);
        }
        if self.profiles.find_by_username(username).await?.is_some() {
            return Err(CoreError::UsernameTaken(username.to_string()));
        }
        let document = Profile::registration_document(
            username,
            self.defaults.starting_balance,
            &self.defaults.bio,
            &self.defaults.avatar,
        );
        let profile = self.profiles.create(user_id, document).await?;
        tracing::info!("Registered {} as {}", user_id, username);
        Ok(profile)
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<Profile, CoreError> {
        self.profiles.require(user_id).await
    }

    /// Lookup by display name, case-insensitive.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, CoreError> {
        self.profiles.find_by_username(username).await
    }

    pub async fn update_bio(&self, user_id: &UserId, bio: &str) -> Result<(), CoreError> {
        self.profiles
            .apply(user_id, vec![Profile::set_bio(bio)])
            .await?;
        tracing::debug!("Updated bio for {}", user_id);
        Ok(())
    }

    pub async fn update_avatar(&self, user_id: &UserId, avatar: &Avatar) -> Result<(), CoreError> {
        self.profiles
            .apply(user_id, vec![Profile::set_avatar(avatar)])
            .await?;
        tracing::debug!("Updated avatar for {}", user_id);
        Ok(())
    }

    /// Set presence and stamp `lastOnline`, the login/logout side effect.
    pub async fn set_presence(&self, user_id: &UserId, status: Presence) -> Result<(), CoreError> {
        self.profiles
            .apply(user_id, Profile::presence_updates(status))
            .await?;
        tracing::debug!("{} is now {}", user_id, status.as_str());
        Ok(())
    }

    /// Bump the lifetime play counter, called when a launch link is handed
    /// to the native client.
    pub async fn record_game_played(&self, user_id: &UserId) -> Result<(), CoreError> {
        let profile = self.profiles.require(user_id).await?;
        self.profiles
            .apply(
                user_id,
                vec![Profile::set_games_played(profile.games_played + 1)],
            )
            .await?;
        Ok(())
    }
}
