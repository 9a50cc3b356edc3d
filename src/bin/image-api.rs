//! Serves the two JSON endpoints: `GET /api/images` and
//! `GET /api/search-image?q=<term>`. Listens on `PORT` (default 3000).

use std::path::PathBuf;

use image_sync::api::{router, ApiState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let state = ApiState::new(PathBuf::from("static/images"));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
