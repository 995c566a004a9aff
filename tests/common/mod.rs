//! Shared fixtures: an in-memory User service double and a fully wired
//! policy engine over the in-memory repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use groupuser_service::error::{ServiceError, ServiceResult};
use groupuser_service::grpc::GroupUserGrpc;
use groupuser_service::repository::MemoryGroupRepository;
use groupuser_service::resolver::UserResolver;
use groupuser_service::service::GroupService;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const CAROL: u64 = 3;
pub const DAVE: u64 = 4;

/// Stand-in for the User service. `set_outage` makes every lookup fail
/// the way an unreachable upstream would.
pub struct StaticUserResolver {
    users: Mutex<HashMap<u64, String>>,
    outage: AtomicBool,
}

impl StaticUserResolver {
    pub fn new(users: Vec<(u64, &str)>) -> Self {
        Self {
            users: Mutex::new(
                users
                    .into_iter()
                    .map(|(uid, name)| (uid, name.to_string()))
                    .collect(),
            ),
            outage: AtomicBool::new(false),
        }
    }

    pub fn set_outage(&self, outage: bool) {
        self.outage.store(outage, Ordering::SeqCst);
    }

    fn check_outage(&self) -> ServiceResult<()> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(ServiceError::Upstream("user service unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserResolver for StaticUserResolver {
    async fn resolve_username(&self, username: &str) -> ServiceResult<Option<u64>> {
        self.check_outage()?;
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|(_, name)| name.as_str() == username)
            .map(|(uid, _)| *uid))
    }

    async fn lookup_username(&self, uid: u64) -> ServiceResult<Option<String>> {
        self.check_outage()?;
        let users = self.users.lock().unwrap();
        Ok(users.get(&uid).cloned())
    }
}

#[allow(dead_code)]
pub struct TestContext {
    pub service: Arc<GroupService>,
    pub resolver: Arc<StaticUserResolver>,
}

/// Policy engine over a fresh in-memory store, seeded with four accounts.
#[allow(dead_code)]
pub fn seeded_service() -> TestContext {
    let resolver = Arc::new(StaticUserResolver::new(vec![
        (ALICE, "alice"),
        (BOB, "bob"),
        (CAROL, "carol"),
        (DAVE, "dave"),
    ]));
    let repo = Arc::new(MemoryGroupRepository::new());
    let service = Arc::new(GroupService::new(repo, resolver.clone()));
    TestContext { service, resolver }
}

#[allow(dead_code)]
pub struct GrpcContext {
    pub grpc: GroupUserGrpc,
    pub resolver: Arc<StaticUserResolver>,
}

/// Full RPC façade over the same seeded in-memory stack.
#[allow(dead_code)]
pub fn seeded_grpc() -> GrpcContext {
    let resolver = Arc::new(StaticUserResolver::new(vec![
        (ALICE, "alice"),
        (BOB, "bob"),
        (CAROL, "carol"),
        (DAVE, "dave"),
    ]));
    let repo = Arc::new(MemoryGroupRepository::new());
    let service = Arc::new(GroupService::new(repo, resolver.clone()));
    GrpcContext {
        grpc: GroupUserGrpc::new(service),
        resolver,
    }
}
