use thiserror::Error;

/// Single success sentinel carried in every response envelope.
pub const CODE_OK: u32 = 800;
pub const CODE_INTERNAL: u32 = 801;
pub const CODE_BAD_ARGUMENT: u32 = 802;
pub const CODE_GROUP_NOT_FOUND: u32 = 803;
pub const CODE_USER_NOT_FOUND: u32 = 804;
pub const CODE_AUTH_DENIED: u32 = 805;
pub const CODE_NOT_MEMBER: u32 = 806;
pub const CODE_ALREADY_MEMBER: u32 = 807;
pub const CODE_WRONG_PASSWORD: u32 = 808;
pub const CODE_UPSTREAM: u32 = 809;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("bad argument: {0}")]
    BadArgument(String),

    #[error("group not found")]
    GroupNotFound,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("permission denied: {0}")]
    AuthDenied(&'static str),

    #[error("not a member of this group")]
    NotMember,

    #[error("already a member of this group")]
    AlreadyMember,

    #[error("wrong group password")]
    WrongPassword,

    /// The User service could not be reached or returned an unexpected
    /// status. Distinct from [`ServiceError::UserNotFound`].
    #[error("user service error: {0}")]
    Upstream(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Wire status code for the response envelope.
    pub fn code(&self) -> u32 {
        match self {
            ServiceError::BadArgument(_) => CODE_BAD_ARGUMENT,
            ServiceError::GroupNotFound => CODE_GROUP_NOT_FOUND,
            ServiceError::UserNotFound(_) => CODE_USER_NOT_FOUND,
            ServiceError::AuthDenied(_) => CODE_AUTH_DENIED,
            ServiceError::NotMember => CODE_NOT_MEMBER,
            ServiceError::AlreadyMember => CODE_ALREADY_MEMBER,
            ServiceError::WrongPassword => CODE_WRONG_PASSWORD,
            ServiceError::Upstream(_) => CODE_UPSTREAM,
            ServiceError::Database(_) | ServiceError::Internal(_) => CODE_INTERNAL,
        }
    }

    /// Infrastructure trouble (logged at error level) as opposed to a
    /// plain request-level rejection.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            ServiceError::Upstream(_) | ServiceError::Database(_) | ServiceError::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_and_never_ok() {
        let errors = [
            ServiceError::BadArgument("x".into()),
            ServiceError::GroupNotFound,
            ServiceError::UserNotFound("x".into()),
            ServiceError::AuthDenied("x"),
            ServiceError::NotMember,
            ServiceError::AlreadyMember,
            ServiceError::WrongPassword,
            ServiceError::Upstream("x".into()),
            ServiceError::Internal("x".into()),
        ];
        let codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        for (i, code) in codes.iter().enumerate() {
            assert_ne!(*code, CODE_OK);
            assert!(!codes[i + 1..].contains(code), "duplicate code {}", code);
        }
    }

    #[test]
    fn test_upstream_is_not_user_not_found() {
        assert_ne!(
            ServiceError::Upstream("down".into()).code(),
            ServiceError::UserNotFound("ghost".into()).code()
        );
    }

    #[test]
    fn test_infrastructure_classification() {
        assert!(ServiceError::Upstream("down".into()).is_infrastructure());
        assert!(ServiceError::Internal("bug".into()).is_infrastructure());
        assert!(!ServiceError::WrongPassword.is_infrastructure());
        assert!(!ServiceError::AuthDenied("no").is_infrastructure());
    }
}
