use crate::app_env;
use crate::{SharedData, api, domain, persistence};
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection};
use std::sync::Arc;
use std::{env, future::Future};
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// Provisions a uniquely named database for one test run.
async fn create_test_database(base_url: &str) -> String {
    let mut conn = PgConnection::connect(base_url)
        .await
        .expect("could not connect to provision the test database");

    let db_id: u32 = thread_rng().gen_range(10_000..99_999);
    let db_name = format!("test_db_{db_id}");
    sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
        .execute(&mut conn)
        .await
        .expect("failed to create test database");
    let _ = conn.close().await;

    db_name
}

/// Creates a migrated temp database for a test, then hands the test a fully
/// wired application router backed by it.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub fn prepare_app_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(axum::Router) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(app_env::test::TEST_DB_URL)
            .expect("You must provide the TEST_DB_URL environment variable as the base postgres connection string");
        let db_name = create_test_database(&base_url).await;

        let pool = persistence::connect_sqlx(format!("{base_url}/{db_name}").as_str())
            .await
            .expect("could not connect to the test database");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("failed to migrate the test database");

        let shared_data = Arc::new(SharedData {
            ext_cxn: persistence::ExternalConnectivity::new(pool),
            token_signer: domain::auth::TokenSigner::new("integration-test-secret"),
        });
        let router = api::application_router().with_state(shared_data);

        test_fn(router).await;
    });
}
