use std::sync::Arc;

use anyhow::Context;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use storefront_backend::{
    config::Config,
    db::{
        memory_user_repository::InMemoryUserRepository,
        postgres_user_repository::PostgresUserRepository, user_repository::UserRepository,
    },
    routes::api_router,
    utils::jwt::{JwtKeys, TokenService},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // A missing or weak JWT_SECRET stops the process here.
    let config = Config::from_env().context("invalid configuration")?;
    let keys = JwtKeys::from_secret(&config.jwt_secret).context("invalid JWT_SECRET")?;
    let tokens = Arc::new(TokenService::new(keys, config.token_ttl));

    let db: Arc<dyn UserRepository> = match &config.database_url {
        Some(url) => Arc::new(PostgresUserRepository {
            pool: establish_connection(url).await?,
        }),
        None => {
            warn!("DATABASE_URL is not set; users are kept in memory and lost on restart");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid header value")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let addr = config.bind_addr;
    let state = AppState {
        db,
        tokens,
        config: Arc::new(config),
    };

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    info!("connected to the database");
    Ok(pool)
}
