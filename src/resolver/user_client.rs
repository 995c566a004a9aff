use std::sync::Arc;

use tonic::transport::{Channel, Endpoint};
use tracing::error;

use crate::error::{ServiceError, ServiceResult, CODE_OK, CODE_USER_NOT_FOUND};
use crate::proto::common;
use crate::proto::user::v1::user_client::UserClient;
use crate::proto::user::v1::{GetUidByUsernameRequest, GetUsernameByUidRequest};

use super::UserResolver;

/// gRPC client for the User service.
#[derive(Clone)]
pub struct GrpcUserResolver {
    client: Arc<tokio::sync::Mutex<UserClient<Channel>>>,
}

impl GrpcUserResolver {
    /// The channel connects lazily so this service can start before the
    /// User service is reachable.
    pub fn new(user_service_url: &str) -> ServiceResult<Self> {
        let channel = Endpoint::from_shared(user_service_url.to_string())
            .map_err(|e| ServiceError::Internal(format!("invalid user service url: {e}")))?
            .connect_lazy();

        Ok(Self {
            client: Arc::new(tokio::sync::Mutex::new(UserClient::new(channel))),
        })
    }
}

/// Interpret the User service's envelope: a hit, a clean miss, or trouble.
fn classify(result: Option<common::Result>) -> ServiceResult<bool> {
    match result {
        Some(r) if r.code == CODE_OK => Ok(true),
        Some(r) if r.code == CODE_USER_NOT_FOUND => Ok(false),
        Some(r) => Err(ServiceError::Upstream(format!(
            "user service returned code {}: {}",
            r.code, r.msg
        ))),
        None => Err(ServiceError::Upstream(
            "user service response missing result envelope".to_string(),
        )),
    }
}

#[async_trait::async_trait]
impl UserResolver for GrpcUserResolver {
    async fn resolve_username(&self, username: &str) -> ServiceResult<Option<u64>> {
        let mut client = self.client.lock().await;
        let response = client
            .get_uid_by_username(tonic::Request::new(GetUidByUsernameRequest {
                username: username.to_string(),
            }))
            .await
            .map_err(|status| {
                error!(
                    username,
                    status = ?status.code(),
                    message = %status.message(),
                    "user-service get_uid_by_username failed"
                );
                ServiceError::Upstream(status.message().to_string())
            })?
            .into_inner();

        if classify(response.result)? {
            Ok(Some(response.uid))
        } else {
            Ok(None)
        }
    }

    async fn lookup_username(&self, uid: u64) -> ServiceResult<Option<String>> {
        let mut client = self.client.lock().await;
        let response = client
            .get_username_by_uid(tonic::Request::new(GetUsernameByUidRequest { uid }))
            .await
            .map_err(|status| {
                error!(
                    uid,
                    status = ?status.code(),
                    message = %status.message(),
                    "user-service get_username_by_uid failed"
                );
                ServiceError::Upstream(status.message().to_string())
            })?
            .into_inner();

        if classify(response.result)? {
            Ok(Some(response.username))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_hit_miss_and_trouble() {
        let hit = common::Result {
            code: CODE_OK,
            msg: String::new(),
        };
        assert!(classify(Some(hit)).unwrap());

        let miss = common::Result {
            code: CODE_USER_NOT_FOUND,
            msg: "no such user".into(),
        };
        assert!(!classify(Some(miss)).unwrap());

        let trouble = common::Result {
            code: 801,
            msg: "boom".into(),
        };
        assert!(matches!(
            classify(Some(trouble)).unwrap_err(),
            ServiceError::Upstream(_)
        ));
        assert!(matches!(
            classify(None).unwrap_err(),
            ServiceError::Upstream(_)
        ));
    }
}
