use serde::{Deserialize, Serialize};

/// Role of a user inside a group. The variant order is the authority
/// order (Member < Manager < Owner), so role comparisons are ordinary
/// `Ord` comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Member,
    Manager,
    Owner,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Member => "member",
            GroupRole::Manager => "manager",
            GroupRole::Owner => "owner",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "member" => Some(GroupRole::Member),
            "manager" => Some(GroupRole::Manager),
            "owner" => Some(GroupRole::Owner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_ordering() {
        assert!(GroupRole::Owner > GroupRole::Manager);
        assert!(GroupRole::Manager > GroupRole::Member);
        assert!(GroupRole::Member >= GroupRole::Member);
    }

    #[test]
    fn test_parse_round_trip() {
        for role in [GroupRole::Member, GroupRole::Manager, GroupRole::Owner] {
            assert_eq!(GroupRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(GroupRole::parse("admin"), None);
        assert_eq!(GroupRole::parse(""), None);
    }
}
