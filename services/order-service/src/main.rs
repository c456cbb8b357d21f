//! Order service binary: HTTP front door + choreography participant.

use order_service::price_client::InventoryPriceClient;
use order_service::{consumer, router, AppState, Config};
use saga_bus::SagaEventBus;
use saga_choreography::{OrderParticipantEnvironment, OrderParticipantReducer, OrderParticipantState};
use saga_core::environment::SystemClock;
use saga_core::{Clock, EventBus};
use saga_domain::OrderStore;
use saga_runtime::Store;
use std::sync::Arc;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();
    let order_store = OrderStore::new();

    let event_bus: Arc<dyn EventBus> = Arc::new(
        SagaEventBus::builder()
            .amqp_url(config.rabbitmq_url.clone())
            .publish_timeout(config.publish_timeout)
            .build()
            .map_err(|err| anyhow::anyhow!("failed to build event bus: {err}"))?,
    );
    let price_source = Arc::new(InventoryPriceClient::new(config.inventory_service_url.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store = Store::new(
        OrderParticipantState,
        OrderParticipantReducer,
        OrderParticipantEnvironment {
            order_store: order_store.clone(),
            price_source,
            event_bus: Arc::clone(&event_bus),
            clock,
        },
    );
    consumer::spawn(store.clone(), event_bus);

    let app = router::build_router(AppState {
        store,
        order_store,
        create_order_timeout: config.create_order_timeout,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, "order-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
