use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::GroupRole;

/// Persisted group row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub group_id: u64,
    pub name: String,
    /// Empty string means the group is open: anyone may join without a
    /// password.
    pub password: String,
    pub owner_uid: u64,
    pub created_at: DateTime<Utc>,
}

/// Persisted membership row (group × user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: u64,
    pub uid: u64,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}
