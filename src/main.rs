use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use wheelzy::config::database::DatabaseConfig;
use wheelzy::config::environment::{EnvironmentConfig, StorageBackend};
use wheelzy::repositories::{InMemoryRepository, PgRepository, RentalStore};
use wheelzy::{create_app, database, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚗 Wheelzy - API de alquiler de vehículos");
    info!("================================================");

    let store: Arc<dyn RentalStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = match database::connect(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            Arc::new(PgRepository::new(pool))
        }
        StorageBackend::Memory => {
            info!("🧪 Usando almacenamiento en memoria");
            Arc::new(InMemoryRepository::new())
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = create_app(AppState::new(store, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("🚗 Vehículos:");
    info!("   GET|POST /api/vehicles");
    info!("   GET|PUT|DELETE /api/vehicles/:id");
    info!("   POST /api/vehicles/:id/bookings");
    info!("📅 Reservas:");
    info!("   GET  /api/bookings?scope=mine|owner|all");
    info!("   PUT  /api/bookings/:id/schedule");
    info!("   POST /api/bookings/:id/transition");
    info!("   POST /api/bookings/:id/return");
    info!("   GET  /api/bookings/:id/damage");
    info!("👤 Perfil:");
    info!("   GET|PUT /api/profile");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
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
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
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
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
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
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
