use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use dotenvy::dotenv;

use fleet_pairing::config::environment::EnvironmentConfig;
use fleet_pairing::database::{create_pool, run_migrations};
use fleet_pairing::routes::create_api_router;
use fleet_pairing::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚖 Fleet Pairing - emparejamiento conductor/coche");
    info!("=================================================");

    // Inicializar base de datos
    let pool = match create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    run_migrations(&pool).await?;

    // Crear router de la API
    let config = EnvironmentConfig::default();
    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_api_router(AppState::postgres(pool, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🧑 Endpoints - Driver:");
    info!("   POST /api/driver - Registrar conductor");
    info!("   GET  /api/driver?online_status=.. - Listar conductores por estado");
    info!("   GET  /api/driver/search - Buscar pares conductor-coche");
    info!("   GET  /api/driver/:id - Obtener conductor");
    info!("   DELETE /api/driver/:id - Eliminar conductor");
    info!("   PUT  /api/driver/:id/location - Actualizar posición");
    info!("   PUT  /api/driver/:id/status - Cambiar estado online");
    info!("   PUT  /api/driver/:id/selected-cars/:car_id - Seleccionar coche");
    info!("   GET  /api/driver/:id/selected-cars/:car_id - Consultar selección");
    info!("   DELETE /api/driver/:id/selected-cars/:car_id - Deseleccionar coche");
    info!("🚗 Endpoints - Car:");
    info!("   POST /api/car - Crear coche");
    info!("   GET  /api/car - Listar coches");
    info!("   GET  /api/car/:id - Obtener coche");
    info!("   PUT  /api/car/:id - Actualizar coche");
    info!("   DELETE /api/car/:id - Eliminar coche");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
