mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mshmap_analytics::AnalyticsStore;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mshmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let analytics = Arc::new(mshmap_core::load_analytics_config_or_default(
        config.analytics_config_path.as_deref(),
    )?);
    tracing::info!(
        region = %analytics.region_name,
        cities = analytics.cities.len(),
        "analytics config loaded"
    );

    let pool_config = mshmap_db::PoolConfig::from_app_config(&config);
    let pool = mshmap_db::connect_pool(&config.database_url, pool_config).await?;
    mshmap_db::run_migrations(&pool).await?;

    let store: Arc<dyn AnalyticsStore> = Arc::new(mshmap_db::PgStore::new(pool));

    let _scheduler = if config.scheduler_enabled {
        let scheduler =
            scheduler::build_scheduler(Arc::clone(&store), Arc::clone(&analytics), &config)
                .await?;
        Some(scheduler)
    } else {
        tracing::info!("scheduler disabled by MSHMAP_SCHEDULER_ENABLED");
        None
    };

    let auth = AuthState::from_tokens(&config.trigger_tokens, config.is_development())?;
    let app = build_app(AppState { store, analytics }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "mshmap-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
