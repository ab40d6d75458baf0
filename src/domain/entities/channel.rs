//! Channel entity.
//!
//! Maps to the `channel` table in the database schema. Channels are only
//! read through a guild the requesting user belongs to, so the fetch lives
//! on [`crate::domain::GuildRepository`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A communication space inside a guild.
///
/// Maps to the `channel` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - guild_id: BIGINT NOT NULL REFERENCES guild(id) ON DELETE CASCADE
/// - name: VARCHAR(100) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,

    /// Owning guild
    pub guild_id: i64,

    /// Display name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Channel {
    pub fn new(id: i64, guild_id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            created_at: None,
        }
    }
}
