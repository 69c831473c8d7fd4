use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediahub::api::account_service::AccountService;
use mediahub::api::auth_service::{AuthConfig, AuthService};
use mediahub::api::jwt::JwtService;
use mediahub::api::profile_service::ProfileService;
use mediahub::api::server::{ApiServer, ApiServerConfig, AppState};
use mediahub::database;
use mediahub::database::repositories::{
    SqlxSubscriptionRepository, SqlxUserRepository, SqlxVideoRepository,
};
use mediahub::media::{LocalMediaStore, MediaStoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediahub=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize database
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:mediahub.db?mode=rwc".to_string());

    let pool = database::init_pool(&database_url).await?;
    database::run_migrations(&pool).await?;

    let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));
    let subscription_repo = Arc::new(SqlxSubscriptionRepository::new(pool.clone()));
    let video_repo = Arc::new(SqlxVideoRepository::new(pool.clone()));

    let auth_config = AuthConfig::from_env();
    let jwt_service = JwtService::from_env(
        auth_config.access_token_expiration_secs,
        auth_config.refresh_token_expiration_secs,
    )
    .ok_or_else(|| {
        anyhow::anyhow!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must be set")
    })
    .map(Arc::new)?;

    let media_store = Arc::new(LocalMediaStore::new(MediaStoreConfig::from_env_or_default()));

    let auth_service = Arc::new(AuthService::new(
        user_repo.clone(),
        jwt_service.clone(),
        auth_config,
    ));
    let account_service = Arc::new(AccountService::new(user_repo.clone(), media_store));
    let profile_service = Arc::new(ProfileService::new(
        user_repo,
        subscription_repo,
        video_repo,
    ));

    let state = AppState::new(jwt_service, auth_service, account_service, profile_service);
    let server = ApiServer::new(ApiServerConfig::from_env_or_default(), state);

    let cancel_token = server.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            cancel_token.cancel();
        }
    });

    tracing::info!("mediahub initialized successfully");

    server.run().await?;

    Ok(())
}
