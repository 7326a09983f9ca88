use dotenvy::dotenv;

use scolaris::logging::init_tracing;
use scolaris::router::init_router;
use scolaris::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing();

    let state = init_app_state().await;
    let addr = state.server_config.bind_addr();
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    println!("🚀 Server running on http://{addr}");
    println!("📚 Swagger UI available at http://{addr}/swagger-ui");
    println!("📖 Scalar UI available at http://{addr}/scalar");
    axum::serve(listener, app).await.unwrap();
}
