use axum::middleware::from_fn_with_state;
use dotenvy::dotenv;
use tower_http::trace::TraceLayer;

use cookie_session_axum::{SessionLayerState, session_middleware};

mod routes;
mod server;
use server::{init_tracing, spawn_http_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_session");

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let state = SessionLayerState::from_env().await?;

    let app = routes::router()
        .layer(from_fn_with_state(state, session_middleware))
        .layer(TraceLayer::new_for_http());

    spawn_http_server(port, app).await??;
    Ok(())
}
