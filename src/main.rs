use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use groupuser_service::config::Config;
use groupuser_service::db;
use groupuser_service::grpc::GroupUserGrpc;
use groupuser_service::proto::groupuser::v1::group_user_server::GroupUserServer;
use groupuser_service::repository::{GroupRepository, MemoryGroupRepository, PostgresGroupRepository};
use groupuser_service::resolver::{CachedUserResolver, GrpcUserResolver, UserResolver};
use groupuser_service::service::GroupService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groupuser_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GroupUser Service");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        "Configuration loaded: gRPC port = {}, User service = {}",
        config.server.grpc_port, config.resolver.user_service_url
    );

    // Wire the repository: Postgres when configured, in-memory otherwise
    let mut pg_pool: Option<PgPool> = None;
    let repo: Arc<dyn GroupRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = db::init_pool(database_url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db::MIGRATOR
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            info!("Connected to PostgreSQL and applied migrations");
            pg_pool = Some(pool.clone());
            Arc::new(PostgresGroupRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set - using in-memory store (development only)");
            Arc::new(MemoryGroupRepository::new())
        }
    };

    repo.health_check()
        .await
        .context("Repository health check failed")?;

    // Resolver chain: gRPC client to the User service behind a positive TTL cache
    let user_client = GrpcUserResolver::new(&config.resolver.user_service_url)
        .context("Failed to create User service client")?;
    let resolver: Arc<dyn UserResolver> = Arc::new(CachedUserResolver::new(
        Arc::new(user_client),
        Duration::from_secs(config.resolver.cache_ttl_secs),
    ));

    let group_service = Arc::new(GroupService::new(repo, resolver));
    let grpc_service = GroupUserGrpc::new(group_service);

    // Setup health reporting
    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<GroupUserServer<GroupUserGrpc>>()
        .await;

    let addr = format!("0.0.0.0:{}", config.server.grpc_port)
        .parse()
        .context("Invalid gRPC server address")?;

    info!("Starting gRPC server on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(GroupUserServer::new(grpc_service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .context("gRPC server failed")?;

    // In-flight requests have drained; release the store
    if let Some(pool) = pg_pool {
        pool.close().await;
    }
    info!("GroupUser Service stopped");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}
