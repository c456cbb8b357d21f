//! Orchestrator service binary.

use orchestrator_service::{router, AppState, Config};
use saga_orchestrator::{SagaCoordinator, SagaLog, ServiceClient, ServiceEndpoints};
use saga_runtime::RetryPolicy;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();

    let endpoints = ServiceEndpoints {
        order_service_url: config.order_service_url.clone(),
        inventory_service_url: config.inventory_service_url.clone(),
        payment_service_url: config.payment_service_url.clone(),
    };
    let client = ServiceClient::with_call_timeout(
        endpoints,
        RetryPolicy::new().with_max_attempts(config.max_attempts),
        config.service_call_timeout,
    );
    let coordinator = SagaCoordinator::new(client, SagaLog::new(), config.saga_deadline);

    let app = router::build_router(AppState { coordinator });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, "orchestrator-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
