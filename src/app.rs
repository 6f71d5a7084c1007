/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (PgPool, Valkey, JwtCodec, policy) → Router 組み立て
 * - Middleware の適用 (CORS / security headers / request id / timeout)
 * - axum::serve() で起動
 */
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use std::{panic, process, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::middleware::{self, auth::AccessGuard};
use crate::services::auth::{
    AuthorizationPolicy, CachedSessionStore, JwtCodec, PgUserDirectory, PolicyTable,
    SessionCache, TokenIssuer,
};
use crate::services::cache::{CacheClient, ValkeyClient};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,leaf_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_policy(config: &Config) -> Result<PolicyTable> {
    let table = match &config.auth_policy_path {
        Some(path) => PolicyTable::load(path)
            .with_context(|| format!("failed to load policy from {}", path.display()))?,
        None => PolicyTable::builtin(),
    };
    tracing::info!(rules = table.rule_count(), "authorization policy loaded");
    Ok(table)
}

async fn build_state(config: &Config) -> Result<AppState> {
    // Build process-level services here and inject them; nothing below reads globals.
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;

    let cache = ValkeyClient::new(&config.redis_url)
        .await
        .context("failed to connect to valkey")?;
    tracing::info!(backend = cache.backend_name(), "token cache ready");

    let jwt = Arc::new(
        JwtCodec::new(
            &config.jwt_private_key_pem,
            &config.jwt_public_key_pem,
            config.auth_issuer.clone(),
            config.token_leeway_seconds,
        )
        .context("failed to load JWT keys")?,
    );

    let sessions: Arc<dyn SessionCache> = Arc::new(CachedSessionStore::new(cache));
    let tokens = TokenIssuer::new(
        jwt.clone(),
        sessions.clone(),
        config.access_token_ttl_seconds,
        config.refresh_token_ttl_seconds,
    );
    let policy: Arc<dyn AuthorizationPolicy> = Arc::new(load_policy(config)?);

    let guard = AccessGuard::new(
        jwt,
        sessions,
        Arc::new(PgUserDirectory::new(db.clone())),
        policy,
        tokens.clone(),
    );

    Ok(AppState::new(db, tokens, guard))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(&state, config.app_env))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
