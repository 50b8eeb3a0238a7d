//! Room Board Back binary entrypoint wiring the room store, REST routes and SSE.

use std::{env, net::SocketAddr, path::Path, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use room_board_back::{
    config::AppConfig,
    dao::{
        room_store::{RoomStore, memory::MemoryRoomStore},
        seed,
    },
    routes,
    state::{AppState, SharedState},
};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let seed_path = config.seed_path.clone();
    let app_state = AppState::new(config);

    let backend = env::var("ROOM_STORE").unwrap_or_else(|_| "memory".into());
    info!(backend = %backend, "selecting room store");
    match backend.as_str() {
        "memory" => {
            let store = MemoryRoomStore::new();
            seed_store(&store, &seed_path).await;
            app_state.set_room_store(Arc::new(store)).await;
        }
        #[cfg(feature = "couch-store")]
        "couch" => supervise_couch(app_state.clone(), seed_path)?,
        #[cfg(feature = "mongo-store")]
        "mongo" => supervise_mongo(app_state.clone(), seed_path),
        other => bail!("unsupported ROOM_STORE `{other}`"),
    }

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Import the seed file when the store is empty; a failure leaves the store as is.
async fn seed_store<S>(store: &S, path: &Path)
where
    S: RoomStore + ?Sized,
{
    if let Err(err) = seed::seed_if_empty(store, path).await {
        warn!(error = %err, path = %path.display(), "failed to seed room store");
    }
}

/// Keep a CouchDB room store connected in the background.
#[cfg(feature = "couch-store")]
fn supervise_couch(state: SharedState, seed_path: std::path::PathBuf) -> anyhow::Result<()> {
    use room_board_back::{
        dao::{
            room_store::{
                RoomBackend,
                couchdb::{CouchConfig, CouchRoomStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let config = CouchConfig::from_env().context("reading CouchDB configuration")?;
    tokio::spawn(storage_supervisor::run(state, move || {
        let config = config.clone();
        let seed_path = seed_path.clone();
        async move {
            let store = CouchRoomStore::connect(config).await?;
            seed_store(&store, &seed_path).await;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn RoomBackend>)
        }
    }));
    Ok(())
}

/// Keep a MongoDB room store connected in the background.
#[cfg(feature = "mongo-store")]
fn supervise_mongo(state: SharedState, seed_path: std::path::PathBuf) {
    use room_board_back::{
        dao::{
            room_store::{
                RoomBackend,
                mongodb::{MongoConfig, MongoRoomStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    tokio::spawn(storage_supervisor::run(state, move || {
        let seed_path = seed_path.clone();
        async move {
            let config = MongoConfig::from_env().await?;
            let store = MongoRoomStore::connect(config).await?;
            seed_store(&store, &seed_path).await;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn RoomBackend>)
        }
    }));
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
