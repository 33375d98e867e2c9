use std::process;
use std::sync::Arc;
use std::time::Duration;

use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vellum::{
    application::{
        categories::CategoryService, comments::CommentService, error::AppError,
        knowledge::KnowledgeService, posts::PostService,
    },
    cache::{CacheService, Invalidator},
    config,
    infra::{
        db::PostgresRepositories,
        http::{self, AppState},
        kv::{KeyValueBackend, NoopKv, RedisKv},
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(|err| AppError::unexpected(err.to_string()))?;

    let repositories = Arc::new(
        PostgresRepositories::connect(&settings.database)
            .await
            .map_err(|err| AppError::unexpected(err.to_string()))?,
    );
    info!("connected to document store");

    // A missing key-value store degrades the service, never blocks it: the
    // API keeps serving from the document store with an always-miss cache.
    let kv: Arc<dyn KeyValueBackend> = if settings.redis.enabled {
        match RedisKv::connect(&settings.redis).await {
            Ok(kv) => Arc::new(kv),
            Err(err) => {
                warn!(error = %err, "key-value store unreachable, continuing without cache");
                Arc::new(NoopKv)
            }
        }
    } else {
        info!("key-value store disabled by configuration");
        Arc::new(NoopKv)
    };

    let cache = CacheService::new(kv.clone(), settings.cache.clone());
    let invalidator = Invalidator::new(cache.clone());

    let state = AppState {
        posts: PostService::new(
            repositories.clone(),
            cache.clone(),
            invalidator.clone(),
            settings.content.home_digest_size.0,
        ),
        comments: CommentService::new(
            repositories.clone(),
            repositories.clone(),
            cache.clone(),
            invalidator.clone(),
        ),
        categories: CategoryService::new(repositories.clone(), cache.clone(), invalidator.clone()),
        knowledge: KnowledgeService::new(repositories.clone(), cache.clone(), invalidator),
        kv,
    };

    let router = http::build_router(state);

    let addr = settings
        .server
        .addr()
        .map_err(|err| AppError::unexpected(err.to_string()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::unexpected(format!("failed to bind {addr}: {err}")))?;
    info!(%addr, "vellum listening");

    let grace = Duration::from_secs(settings.server.graceful_shutdown_secs);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!("shutdown complete");
    Ok(())
}

/// Resolve when a shutdown signal arrives, then arm a hard-exit watchdog so
/// connection draining cannot stall past the configured window.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, starting graceful shutdown"),
        () = terminate => info!("SIGTERM received, starting graceful shutdown"),
    }

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        error!(
            grace_secs = grace.as_secs(),
            "graceful shutdown window elapsed, exiting"
        );
        process::exit(1);
    });
}
