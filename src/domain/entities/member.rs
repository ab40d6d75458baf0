//! Guild membership.
//!
//! Maps to the `member` table in the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's membership in a guild.
///
/// Maps to the `member` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - guild_id: BIGINT NOT NULL REFERENCES guild(id) ON DELETE CASCADE
/// - user_id: BIGINT NOT NULL REFERENCES auth(id)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - UNIQUE (guild_id, user_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    pub guild_id: i64,
    pub user_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GuildMember {
    pub fn new(guild_id: i64, user_id: i64) -> Self {
        Self {
            guild_id,
            user_id,
            created_at: None,
        }
    }
}
