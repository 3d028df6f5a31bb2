use axum::extract::Extension;
use axum::routing::{get, post};
use axum::{Json, Router};
use cluster_coordinator::coordinator::handlers::handle_announce;
use cluster_coordinator::coordinator::protocol::{DEFAULT_PORT, ENDPOINT_ANNOUNCE};
use cluster_coordinator::coordinator::state::{Coordinator, CoordinatorConfig};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::System;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT));
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--bind <addr:port>]", args[0]);
                eprintln!("Environment: EXPIRY_MS, CHANGELOG_CAPACITY");
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    let expiry_ms = std::env::var("EXPIRY_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(2000);
    let changelog_capacity = std::env::var("CHANGELOG_CAPACITY")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(500);

    // 1. Coordinator state (roster + change log + instance identity):
    let coordinator = Arc::new(Coordinator::new(CoordinatorConfig {
        expiry: Duration::from_millis(expiry_ms),
        changelog_capacity,
    })?);

    tracing::info!("Coordinator instance {}", coordinator.instance_id());
    tracing::info!(
        "Membership expiry {} ms, change log capacity {}",
        expiry_ms,
        changelog_capacity
    );

    // 2. HTTP router. The authenticated transport terminating in front of
    //    this listener stamps the principal header on every request.
    let app = Router::new()
        .route("/health/routes", get(handle_routes))
        .route("/health/stats", get(handle_stats))
        .route(ENDPOINT_ANNOUNCE, post(handle_announce))
        .layer(Extension(coordinator.clone()));

    // 3. Serve:
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct RoutesResponse {
    routes: Vec<&'static str>,
}

#[derive(Serialize)]
struct StatsResponse {
    server_instance: String,
    members: usize,
    next_cursor: u64,
    retained_from: u64,
    uptime_secs: u64,
    cpu_usage: f32,
    mem_used_mb: u64,
    mem_total_mb: u64,
}

async fn handle_routes() -> Json<RoutesResponse> {
    Json(RoutesResponse {
        routes: vec!["/health/routes", "/health/stats", "/announce"],
    })
}

async fn handle_stats(
    Extension(coordinator): Extension<Arc<Coordinator>>,
) -> Json<StatsResponse> {
    let stats = coordinator.stats().await;

    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    let cpu_usage = sys.global_cpu_info().cpu_usage();
    // sysinfo returns bytes for memory values.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(StatsResponse {
        server_instance: coordinator.instance_id().to_string(),
        members: stats.members,
        next_cursor: stats.next_cursor,
        retained_from: stats.retained_from,
        uptime_secs: stats.uptime_secs,
        cpu_usage,
        mem_used_mb,
        mem_total_mb,
    })
}
