use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use shuttle_trips::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use shuttle_trips::database::DatabaseConnection;
use shuttle_trips::repositories::MemoryStore;
use shuttle_trips::services::SystemClock;
use shuttle_trips::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt().with_max_level(config.log_level).init();

    info!("🚌 Shuttle Trips - Planificación de viajes");
    info!("🌍 Entorno: {} | almacenamiento: {}", config.environment.as_str(), config.storage_backend);

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let db = match DatabaseConnection::connect(&db_config).await {
                Ok(db) => db,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(e);
                }
            };
            AppState::postgres(db.pool().clone(), config.clone())
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("⚠️ Almacenamiento en memoria en producción: los datos se pierden al reiniciar");
            }
            AppState::in_memory(MemoryStore::new(), config.clone(), Arc::new(SystemClock))
        }
    };

    let app = create_app_router(state);
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/trips/generate - Generar viajes de una fecha");
    info!("   GET  /api/trips?date=YYYY-MM-DD - Viajes de una fecha");
    info!("   POST /api/trips/:id/start|complete|cancel");
    info!("   POST /api/trips/:id/passengers/:passenger_id/board|alight|no-show|clear-no-show");
    info!("   POST /api/schedules - Crear schedule");
    info!("   POST /api/schedules/:id/assignments - Crear sustitución");
    info!("   PUT  /api/fleet/vehicles|drivers|attendants/:id - Registrar flota");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal SIGTERM recibida, apagando servidor...");
        },
    }
}
