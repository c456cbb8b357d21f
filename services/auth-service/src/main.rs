//! Auth service binary.

use auth_service::{router, AppState, Config};
use saga_auth::UsersStore;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();
    let app = router::build_router(AppState { users: UsersStore::new() });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, "auth-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
