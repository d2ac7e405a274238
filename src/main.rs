use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use zodiac_tasks::{SharedData, api, app_env, domain, logging, persistence};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if dotenv().is_err() {
        println!("Starting without .env file.");
    }
    logging::setup_logging(logging::init_env_filter());

    let config = app_env::Config::from_env()?;
    let db_pool = persistence::connect_sqlx(&config.database_url).await?;
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("running database migrations")?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
        token_signer: domain::auth::TokenSigner::new(&config.jwt_secret),
    });

    let router = logging::attach_tracing_http(api::application_router()).with_state(shared_data);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    info!("Listening on port {}", config.port);
    axum::serve(listener, router)
        .await
        .context("serving the application")?;

    Ok(())
}
