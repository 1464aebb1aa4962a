use std::sync::Arc;
use std::time::Duration;

use auth::JwtHandler;
use auth::TokenBackend;
use sqlx::postgres::PgPoolOptions;
use token_service::config::Config;
use token_service::config::RevocationBackend;
use token_service::domain::token::ports::RevocationStore;
use token_service::domain::token::service::TokenService;
use token_service::inbound::http::router::create_router;
use token_service::outbound::identity::StaticUserDirectory;
use token_service::outbound::revocation::InMemoryRevocationStore;
use token_service::outbound::revocation::PostgresRevocationStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "token-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    config.validate()?;

    tracing::info!(
        http_port = config.server.http_port,
        model = ?config.tokens.model,
        rotate_refresh_tokens = config.tokens.rotate_refresh_tokens,
        cookie_transport = config.cookie.name.is_some(),
        blacklist_backend = ?config.blacklist.backend,
        users = config.users.len(),
        "Configuration loaded"
    );

    let mut jwt_handler = JwtHandler::new(config.jwt.signing_key.as_bytes());
    if let Some(issuer) = &config.jwt.issuer {
        jwt_handler = jwt_handler.with_issuer(issuer);
    }
    if let Some(audience) = &config.jwt.audience {
        jwt_handler = jwt_handler.with_audience(audience);
    }
    let token_backend = Arc::new(
        TokenBackend::new(jwt_handler, config.token_lifetimes())
            .with_leeway(chrono::Duration::seconds(config.jwt.leeway_secs)),
    );

    let revocation_store = revocation_store(&config).await?;
    if let Some(store) = &revocation_store {
        spawn_purge_task(
            Arc::clone(store),
            Duration::from_secs(config.blacklist.purge_interval_secs),
        );
    }

    let user_directory = Arc::new(StaticUserDirectory::new(config.user_records())?);
    tracing::info!(users = user_directory.len(), "User directory loaded");

    let token_service = Arc::new(TokenService::new(
        token_backend,
        user_directory,
        revocation_store,
        config.token_service_settings(),
    )?);

    let http_application = create_router(token_service, config.http_settings())?;

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn revocation_store(
    config: &Config,
) -> Result<Option<Arc<dyn RevocationStore>>, anyhow::Error> {
    match config.blacklist.backend {
        RevocationBackend::Disabled => {
            tracing::warn!("Token blacklisting disabled");
            Ok(None)
        }
        RevocationBackend::Memory => {
            let store: Arc<dyn RevocationStore> = Arc::new(InMemoryRevocationStore::new());
            tracing::info!(backend = "memory", "Revocation store created");
            Ok(Some(store))
        }
        RevocationBackend::Postgres => {
            let database_url = config
                .blacklist
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("blacklist.database_url is not set"))?;

            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            tracing::info!(
                max_connections = 5,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let store: Arc<dyn RevocationStore> = Arc::new(PostgresRevocationStore::new(pg_pool));
            Ok(Some(store))
        }
    }
}

/// Periodically drop revocation entries whose token has expired anyway.
fn spawn_purge_task(store: Arc<dyn RevocationStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            match store.purge_expired(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Expired revocation entries purged"),
                Err(e) => tracing::warn!(error = %e, "Revocation purge failed"),
            }
        }
    });
}
