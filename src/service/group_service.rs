use std::sync::Arc;

use tracing::info;

use crate::domain::{Group, GroupRole};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::GroupRepository;
use crate::resolver::UserResolver;

/// One roster row of `group_info`, username already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub uid: u64,
    pub name: String,
    pub role: GroupRole,
}

/// Policy engine for group and membership operations. Every authority
/// decision lives here; the gRPC façade only validates request shape.
/// Checks always run before any mutation, so a denied call leaves the
/// store untouched.
pub struct GroupService {
    repo: Arc<dyn GroupRepository>,
    resolver: Arc<dyn UserResolver>,
}

impl GroupService {
    pub fn new(repo: Arc<dyn GroupRepository>, resolver: Arc<dyn UserResolver>) -> Self {
        Self { repo, resolver }
    }

    async fn require_group(&self, group_id: u64) -> ServiceResult<Group> {
        self.repo
            .get_group(group_id)
            .await?
            .ok_or(ServiceError::GroupNotFound)
    }

    async fn require_user_exists(&self, uid: u64) -> ServiceResult<()> {
        match self.resolver.lookup_username(uid).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::UserNotFound(format!("uid {uid}"))),
        }
    }

    async fn resolve_target(&self, username: &str) -> ServiceResult<u64> {
        self.resolver
            .resolve_username(username)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(username.to_string()))
    }

    async fn require_membership(&self, group_id: u64, uid: u64) -> ServiceResult<GroupRole> {
        self.repo
            .get_membership(group_id, uid)
            .await?
            .ok_or(ServiceError::NotMember)
    }

    pub async fn create_group(&self, name: &str, owner_uid: u64) -> ServiceResult<u64> {
        self.require_user_exists(owner_uid).await?;
        let group_id = self.repo.create_group(name, owner_uid).await?;
        info!(group_id, owner_uid, name, "group created");
        Ok(group_id)
    }

    /// Public view: anyone may ask for a group's name.
    pub async fn public_info(&self, group_id: u64) -> ServiceResult<Group> {
        self.require_group(group_id).await
    }

    /// Roster view, members only. Usernames come from the resolver; a uid
    /// the User service no longer knows is rendered numerically rather
    /// than dropped from the roster.
    pub async fn group_info(&self, group_id: u64, caller_uid: u64) -> ServiceResult<Vec<RosterEntry>> {
        self.require_group(group_id).await?;
        if self
            .repo
            .get_membership(group_id, caller_uid)
            .await?
            .is_none()
        {
            return Err(ServiceError::AuthDenied("only members may read the roster"));
        }

        let members = self.repo.list_members(group_id).await?;
        let mut roster = Vec::with_capacity(members.len());
        for member in members {
            let name = match self.resolver.lookup_username(member.uid).await? {
                Some(name) => name,
                None => member.uid.to_string(),
            };
            roster.push(RosterEntry {
                uid: member.uid,
                name,
                role: member.role,
            });
        }
        Ok(roster)
    }

    pub async fn join_group(&self, group_id: u64, password: &str, uid: u64) -> ServiceResult<()> {
        let group = self.require_group(group_id).await?;
        if group.password != password {
            return Err(ServiceError::WrongPassword);
        }
        self.require_user_exists(uid).await?;
        self.repo
            .add_membership(group_id, uid, GroupRole::Member)
            .await?;
        info!(group_id, uid, "user joined group");
        Ok(())
    }

    /// Any current member may invite; the invite is an immediate add, the
    /// target joins as a plain member without a password check.
    pub async fn invite(&self, group_id: u64, caller_uid: u64, username: &str) -> ServiceResult<()> {
        self.require_group(group_id).await?;
        self.require_membership(group_id, caller_uid).await?;
        let target_uid = self.resolve_target(username).await?;
        self.repo
            .add_membership(group_id, target_uid, GroupRole::Member)
            .await?;
        info!(group_id, caller_uid, target_uid, "user invited into group");
        Ok(())
    }

    /// Removing yourself is leaving; removing someone else requires
    /// authority over their role. The owner may also leave: the group is
    /// kept, ownerless, rather than deleted or transferred.
    pub async fn kick(&self, group_id: u64, caller_uid: u64, username: &str) -> ServiceResult<()> {
        self.require_group(group_id).await?;
        let target_uid = self.resolve_target(username).await?;
        let target_role = self.require_membership(group_id, target_uid).await?;

        if target_uid != caller_uid {
            let caller_role = self.require_membership(group_id, caller_uid).await?;
            let allowed = match caller_role {
                GroupRole::Owner => target_role != GroupRole::Owner,
                GroupRole::Manager => target_role == GroupRole::Member,
                GroupRole::Member => false,
            };
            if !allowed {
                return Err(ServiceError::AuthDenied(
                    "insufficient role to remove this member",
                ));
            }
        }

        self.repo.remove_membership(group_id, target_uid).await?;
        info!(group_id, caller_uid, target_uid, "membership removed");
        Ok(())
    }

    pub async fn change_name(&self, group_id: u64, caller_uid: u64, name: &str) -> ServiceResult<()> {
        self.require_group(group_id).await?;
        let role = self.require_membership(group_id, caller_uid).await?;
        if role < GroupRole::Manager {
            return Err(ServiceError::AuthDenied(
                "only managers and the owner may rename the group",
            ));
        }
        self.repo.update_group_name(group_id, name).await?;
        info!(group_id, caller_uid, name, "group renamed");
        Ok(())
    }

    pub async fn change_password(
        &self,
        group_id: u64,
        caller_uid: u64,
        password: &str,
    ) -> ServiceResult<()> {
        self.require_group(group_id).await?;
        let role = self.require_membership(group_id, caller_uid).await?;
        if role != GroupRole::Owner {
            return Err(ServiceError::AuthDenied(
                "only the owner may change the group password",
            ));
        }
        self.repo.update_group_password(group_id, password).await?;
        info!(group_id, caller_uid, "group password changed");
        Ok(())
    }

    /// Owner-only promotion/demotion between manager and member.
    /// Ownership itself is not transferable through this operation.
    pub async fn set_user_type(
        &self,
        group_id: u64,
        caller_uid: u64,
        username: &str,
        new_role: GroupRole,
    ) -> ServiceResult<()> {
        self.require_group(group_id).await?;
        let caller_role = self.require_membership(group_id, caller_uid).await?;
        if caller_role != GroupRole::Owner {
            return Err(ServiceError::AuthDenied(
                "only the owner may change member roles",
            ));
        }
        if new_role == GroupRole::Owner {
            return Err(ServiceError::BadArgument(
                "ownership is not transferable".to_string(),
            ));
        }
        let target_uid = self.resolve_target(username).await?;
        if target_uid == caller_uid {
            return Err(ServiceError::BadArgument(
                "cannot change your own role".to_string(),
            ));
        }
        self.require_membership(group_id, target_uid).await?;
        self.repo
            .set_membership_role(group_id, target_uid, new_role)
            .await?;
        info!(
            group_id,
            caller_uid,
            target_uid,
            role = new_role.as_str(),
            "member role changed"
        );
        Ok(())
    }

    /// No authority check: an unknown uid simply has no groups.
    pub async fn groups_by_uid(&self, uid: u64) -> ServiceResult<Vec<Group>> {
        self.repo.list_groups_by_uid(uid).await
    }
}
