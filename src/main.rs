use std::{process, sync::Arc, time::Duration};

use carta::{
    application::catalog::{DishService, MenuService, SubmenuService},
    application::error::AppError,
    cache::{CacheEngine, MemoryCache},
    config,
    infra::{
        db::PostgresCatalog,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use sqlx::postgres::PgPool;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

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
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(config::ServeArgs::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn connect_pool(settings: &config::Settings) -> Result<PgPool, AppError> {
    PostgresCatalog::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresCatalog::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    info!("database migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresCatalog::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let catalog = Arc::new(PostgresCatalog::new(pool));

    // One backend and one engine for the whole process; every service shares
    // the same invalidation path.
    let backend = Arc::new(MemoryCache::new(&settings.cache));
    let engine = Arc::new(CacheEngine::new(backend, &settings.cache));

    let state = ApiState {
        menus: Arc::new(MenuService::new(
            catalog.clone(),
            catalog.clone(),
            engine.clone(),
        )),
        submenus: Arc::new(SubmenuService::new(
            catalog.clone(),
            catalog.clone(),
            engine.clone(),
        )),
        dishes: Arc::new(DishService::new(
            catalog.clone(),
            catalog.clone(),
            engine.clone(),
        )),
    };

    let router = http::build_api_router(state).merge(http::build_health_router(catalog.clone()));

    let addr = settings.server.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;
    info!(%addr, "carta listening");

    let grace = settings.server.graceful_shutdown;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;

    info!("carta stopped");
    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received; draining in-flight requests");

    // Bound the drain: requests still running after the grace window are cut
    // off with the process.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(grace_secs = grace.as_secs(), "graceful shutdown window elapsed; forcing exit");
        process::exit(0);
    });
}
