//! Native-client launch links.
//!
//! The web layer hands the native game client a deep link carrying the
//! player's name and avatar colors. The link is fire-and-forget; nothing is
//! read back from the client.

use std::fmt;

use crate::domain::entities::{Avatar, Profile};

/// One assembled launch link:
/// `scheme://play/{game}?user={name}&server={ip}&head=..&torso=..&arms=..&legs=..`
#[derive(Debug, Clone)]
pub struct LaunchLink {
    scheme: String,
    server: String,
    game_id: String,
    username: String,
    avatar: Avatar,
}

impl LaunchLink {
    pub fn new(
        scheme: impl Into<String>,
        server: impl Into<String>,
        game_id: impl Into<String>,
        profile: &Profile,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            server: server.into(),
            game_id: game_id.into(),
            username: profile.username.clone(),
            avatar: profile.avatar.clone(),
        }
    }

    /// Point the link at a specific game server instead of the default.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn url(&self) -> String {
        format!(
            "{}://play/{}?user={}&server={}&head={}&torso={}&arms={}&legs={}",
            self.scheme,
            self.game_id,
            escape_component(&self.username),
            self.server,
            bare_hex(&self.avatar.head_color),
            bare_hex(&self.avatar.torso_color),
            bare_hex(&self.avatar.arms_color),
            bare_hex(&self.avatar.legs_color),
        )
    }
}

impl fmt::Display for LaunchLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Color values travel as bare hex digits.
fn bare_hex(color: &str) -> &str {
    color.strip_prefix('#').unwrap_or(color)
}

/// Percent-encode a query component. Leaves the same characters bare that
/// JavaScript's `encodeURIComponent` does.
fn escape_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
        {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
