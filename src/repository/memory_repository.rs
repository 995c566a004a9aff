use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::{Group, GroupRole, Membership};
use crate::error::{ServiceError, ServiceResult};

use super::GroupRepository;

#[derive(Default)]
struct MemoryState {
    next_group_id: u64,
    groups: HashMap<u64, Group>,
    // group_id -> memberships in join order
    members: HashMap<u64, Vec<Membership>>,
}

/// In-memory store used by tests and the no-database development mode.
/// A single mutex serializes all access, which trivially satisfies the
/// per-group atomicity contract.
#[derive(Default)]
pub struct MemoryGroupRepository {
    state: Mutex<MemoryState>,
}

impl MemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl GroupRepository for MemoryGroupRepository {
    async fn create_group(&self, name: &str, owner_uid: u64) -> ServiceResult<u64> {
        let mut state = self.state.lock().await;
        state.next_group_id += 1;
        let group_id = state.next_group_id;
        let now = Utc::now();

        state.groups.insert(
            group_id,
            Group {
                group_id,
                name: name.to_string(),
                password: String::new(),
                owner_uid,
                created_at: now,
            },
        );
        state.members.insert(
            group_id,
            vec![Membership {
                group_id,
                uid: owner_uid,
                role: GroupRole::Owner,
                joined_at: now,
            }],
        );
        Ok(group_id)
    }

    async fn get_group(&self, group_id: u64) -> ServiceResult<Option<Group>> {
        let state = self.state.lock().await;
        Ok(state.groups.get(&group_id).cloned())
    }

    async fn update_group_name(&self, group_id: u64, name: &str) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        let group = state
            .groups
            .get_mut(&group_id)
            .ok_or(ServiceError::GroupNotFound)?;
        group.name = name.to_string();
        Ok(())
    }

    async fn update_group_password(&self, group_id: u64, password: &str) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        let group = state
            .groups
            .get_mut(&group_id)
            .ok_or(ServiceError::GroupNotFound)?;
        group.password = password.to_string();
        Ok(())
    }

    async fn list_members(&self, group_id: u64) -> ServiceResult<Vec<Membership>> {
        let state = self.state.lock().await;
        Ok(state.members.get(&group_id).cloned().unwrap_or_default())
    }

    async fn get_membership(&self, group_id: u64, uid: u64) -> ServiceResult<Option<GroupRole>> {
        let state = self.state.lock().await;
        Ok(state
            .members
            .get(&group_id)
            .and_then(|members| members.iter().find(|m| m.uid == uid))
            .map(|m| m.role))
    }

    async fn add_membership(&self, group_id: u64, uid: u64, role: GroupRole) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        let members = state.members.entry(group_id).or_default();
        if members.iter().any(|m| m.uid == uid) {
            return Err(ServiceError::AlreadyMember);
        }
        members.push(Membership {
            group_id,
            uid,
            role,
            joined_at: Utc::now(),
        });
        Ok(())
    }

    async fn remove_membership(&self, group_id: u64, uid: u64) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        let members = state.members.get_mut(&group_id).ok_or(ServiceError::NotMember)?;
        let before = members.len();
        members.retain(|m| m.uid != uid);
        if members.len() == before {
            return Err(ServiceError::NotMember);
        }
        Ok(())
    }

    async fn set_membership_role(
        &self,
        group_id: u64,
        uid: u64,
        role: GroupRole,
    ) -> ServiceResult<()> {
        let mut state = self.state.lock().await;
        let membership = state
            .members
            .get_mut(&group_id)
            .and_then(|members| members.iter_mut().find(|m| m.uid == uid))
            .ok_or(ServiceError::NotMember)?;
        membership.role = role;
        Ok(())
    }

    async fn list_groups_by_uid(&self, uid: u64) -> ServiceResult<Vec<Group>> {
        let state = self.state.lock().await;
        let mut groups: Vec<(chrono::DateTime<Utc>, Group)> = Vec::new();
        for members in state.members.values() {
            if let Some(m) = members.iter().find(|m| m.uid == uid) {
                if let Some(group) = state.groups.get(&m.group_id) {
                    groups.push((m.joined_at, group.clone()));
                }
            }
        }
        groups.sort_by_key(|(joined_at, group)| (*joined_at, group.group_id));
        Ok(groups.into_iter().map(|(_, group)| group).collect())
    }
}
