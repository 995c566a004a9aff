use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::domain::{Group, GroupRole, Membership};
use crate::error::{ServiceError, ServiceResult};

use super::GroupRepository;

/// PostgreSQL repository for groups and memberships (source of truth).
///
/// Single-group atomicity comes from the schema rather than explicit locks:
/// inserts go through `ON CONFLICT DO NOTHING` against the `(group_id, uid)`
/// primary key and deletes/updates report their row count, so the
/// AlreadyMember / NotMember outcomes are decided by the database itself.
#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn group_from_row(row: &PgRow) -> ServiceResult<Group> {
    let group_id: i64 = row.get("group_id");
    let owner_uid: i64 = row.get("owner_uid");
    Ok(Group {
        group_id: group_id as u64,
        name: row.get("name"),
        password: row.get("password"),
        owner_uid: owner_uid as u64,
        created_at: row.get("created_at"),
    })
}

fn membership_from_row(row: &PgRow) -> ServiceResult<Membership> {
    let group_id: i64 = row.get("group_id");
    let uid: i64 = row.get("uid");
    let role: String = row.get("role");
    let role = GroupRole::parse(&role)
        .ok_or_else(|| ServiceError::Internal(format!("unknown role in store: {role}")))?;
    Ok(Membership {
        group_id: group_id as u64,
        uid: uid as u64,
        role,
        joined_at: row.get("joined_at"),
    })
}

#[async_trait::async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create_group(&self, name: &str, owner_uid: u64) -> ServiceResult<u64> {
        let mut tx = self.pool.begin().await?;

        let group_id: i64 = sqlx::query_scalar(
            "INSERT INTO groups (name, password, owner_uid) VALUES ($1, '', $2) RETURNING group_id",
        )
        .bind(name)
        .bind(owner_uid as i64)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO group_members (group_id, uid, role) VALUES ($1, $2, $3)")
            .bind(group_id)
            .bind(owner_uid as i64)
            .bind(GroupRole::Owner.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(group_id, owner_uid, "created group in PostgreSQL");
        Ok(group_id as u64)
    }

    async fn get_group(&self, group_id: u64) -> ServiceResult<Option<Group>> {
        let row = sqlx::query(
            "SELECT group_id, name, password, owner_uid, created_at FROM groups WHERE group_id = $1",
        )
        .bind(group_id as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(group_from_row).transpose()
    }

    async fn update_group_name(&self, group_id: u64, name: &str) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE groups SET name = $2 WHERE group_id = $1")
            .bind(group_id as i64)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::GroupNotFound);
        }
        Ok(())
    }

    async fn update_group_password(&self, group_id: u64, password: &str) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE groups SET password = $2 WHERE group_id = $1")
            .bind(group_id as i64)
            .bind(password)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::GroupNotFound);
        }
        Ok(())
    }

    async fn list_members(&self, group_id: u64) -> ServiceResult<Vec<Membership>> {
        let rows = sqlx::query(
            r#"
            SELECT group_id, uid, role, joined_at
            FROM group_members
            WHERE group_id = $1
            ORDER BY joined_at ASC, uid ASC
            "#,
        )
        .bind(group_id as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(membership_from_row).collect()
    }

    async fn get_membership(&self, group_id: u64, uid: u64) -> ServiceResult<Option<GroupRole>> {
        let role: Option<String> = sqlx::query_scalar(
            "SELECT role FROM group_members WHERE group_id = $1 AND uid = $2",
        )
        .bind(group_id as i64)
        .bind(uid as i64)
        .fetch_optional(&self.pool)
        .await?;

        match role {
            Some(role) => GroupRole::parse(&role)
                .map(Some)
                .ok_or_else(|| ServiceError::Internal(format!("unknown role in store: {role}"))),
            None => Ok(None),
        }
    }

    async fn add_membership(&self, group_id: u64, uid: u64, role: GroupRole) -> ServiceResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, uid, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (group_id, uid) DO NOTHING
            "#,
        )
        .bind(group_id as i64)
        .bind(uid as i64)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::AlreadyMember);
        }

        debug!(group_id, uid, role = role.as_str(), "added membership in PostgreSQL");
        Ok(())
    }

    async fn remove_membership(&self, group_id: u64, uid: u64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND uid = $2")
            .bind(group_id as i64)
            .bind(uid as i64)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotMember);
        }

        debug!(group_id, uid, "removed membership in PostgreSQL");
        Ok(())
    }

    async fn set_membership_role(
        &self,
        group_id: u64,
        uid: u64,
        role: GroupRole,
    ) -> ServiceResult<()> {
        let result =
            sqlx::query("UPDATE group_members SET role = $3 WHERE group_id = $1 AND uid = $2")
                .bind(group_id as i64)
                .bind(uid as i64)
                .bind(role.as_str())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotMember);
        }
        Ok(())
    }

    async fn list_groups_by_uid(&self, uid: u64) -> ServiceResult<Vec<Group>> {
        let rows = sqlx::query(
            r#"
            SELECT g.group_id, g.name, g.password, g.owner_uid, g.created_at
            FROM groups g
            JOIN group_members m ON g.group_id = m.group_id
            WHERE m.uid = $1
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(uid as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(group_from_row).collect()
    }

    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
