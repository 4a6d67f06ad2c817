use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use storytime_clients::PostgresClient;
use storytime_common::{EnvVars, ModuleClient};
use storytime_database::init_databases;
use storytime_service_api::{service_routes, setup_tracing, ApiServerEnv, GlobalState};

init_databases!(
    default: [
        storytime_runtime::Character,
        storytime_runtime::Story,
        storytime_runtime::ChapterIllustration,
    ]
);

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let env = ApiServerEnv::load();

    let cors = CorsLayer::very_permissive();
    let trace = TraceLayer::new_for_http();

    let pool = connect(false, env.init_tables).await?;
    let db = PostgresClient::from_client(Arc::new(pool.clone()));
    let global_state = GlobalState::new(db).await?;

    let app = service_routes(&env)
        .layer(cors)
        .layer(trace)
        .with_state(global_state);

    let port = env.port()?;
    let listener = tokio::net::TcpListener::bind(format!(":::{port}")).await?;

    tracing::info!("LISTENING ON {port}");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
