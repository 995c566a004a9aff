use crate::domain::{Group, GroupRole, Membership};
use crate::error::ServiceResult;

/// Storage contract for groups and memberships. Every operation is atomic
/// with respect to a single group, so compound checks like "fail if already
/// a member, else insert" cannot race.
#[async_trait::async_trait]
pub trait GroupRepository: Send + Sync {
    /// Allocate a fresh group id, insert the group row with an empty
    /// password, and insert the creator as its owner membership.
    async fn create_group(&self, name: &str, owner_uid: u64) -> ServiceResult<u64>;

    async fn get_group(&self, group_id: u64) -> ServiceResult<Option<Group>>;

    /// Fails with [`crate::error::ServiceError::GroupNotFound`] if the group
    /// does not exist.
    async fn update_group_name(&self, group_id: u64, name: &str) -> ServiceResult<()>;

    /// Fails with [`crate::error::ServiceError::GroupNotFound`] if the group
    /// does not exist.
    async fn update_group_password(&self, group_id: u64, password: &str) -> ServiceResult<()>;

    /// Members of a group ordered by join time, so the creator comes first.
    async fn list_members(&self, group_id: u64) -> ServiceResult<Vec<Membership>>;

    async fn get_membership(&self, group_id: u64, uid: u64) -> ServiceResult<Option<GroupRole>>;

    /// Fails with [`crate::error::ServiceError::AlreadyMember`] if the row
    /// already exists; the existing row is left untouched.
    async fn add_membership(&self, group_id: u64, uid: u64, role: GroupRole) -> ServiceResult<()>;

    /// Fails with [`crate::error::ServiceError::NotMember`] if the row is
    /// absent.
    async fn remove_membership(&self, group_id: u64, uid: u64) -> ServiceResult<()>;

    /// Fails with [`crate::error::ServiceError::NotMember`] if the row is
    /// absent.
    async fn set_membership_role(
        &self,
        group_id: u64,
        uid: u64,
        role: GroupRole,
    ) -> ServiceResult<()>;

    /// Groups the user belongs to; empty for an unknown uid.
    async fn list_groups_by_uid(&self, uid: u64) -> ServiceResult<Vec<Group>>;

    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}
