mod cache;
mod user_client;

pub use cache::CachedUserResolver;
pub use user_client::GrpcUserResolver;

use crate::error::ServiceResult;

/// Narrow view of the external User service: translating between usernames
/// and uids. `Ok(None)` means the user is unknown; transport trouble and
/// unexpected upstream statuses surface as
/// [`crate::error::ServiceError::Upstream`].
#[async_trait::async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve_username(&self, username: &str) -> ServiceResult<Option<u64>>;

    async fn lookup_username(&self, uid: u64) -> ServiceResult<Option<String>>;
}
