//! Payment service binary: HTTP front door + choreography participant.

use payment_service::{consumer, router, AppState, Config};
use saga_bus::SagaEventBus;
use saga_choreography::{PaymentParticipantEnvironment, PaymentParticipantReducer, PaymentParticipantState};
use saga_core::EventBus;
use saga_payment::PaymentGateway;
use saga_runtime::Store;
use std::sync::Arc;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();
    let gateway = PaymentGateway::from_env();

    let event_bus: Arc<dyn EventBus> = Arc::new(
        SagaEventBus::builder()
            .amqp_url(config.rabbitmq_url.clone())
            .publish_timeout(config.publish_timeout)
            .build()
            .map_err(|err| anyhow::anyhow!("failed to build event bus: {err}"))?,
    );

    let store = Store::new(
        PaymentParticipantState,
        PaymentParticipantReducer,
        PaymentParticipantEnvironment { gateway: gateway.clone(), event_bus: Arc::clone(&event_bus) },
    );
    consumer::spawn(store, event_bus);

    let app = router::build_router(AppState { gateway });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, "payment-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
