use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use fleet_backend::{AppState, config::Config, middleware::auth_middleware, routes};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn greeting() -> &'static str {
    "Helloooo"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    // An unreachable database is fatal; never serve degraded traffic.
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!("Couldn't Connect to DB: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!("Database Connected Successfully!");

    let state = AppState {
        pool,
        config: config.clone(),
    };

    let public_routes = Router::new()
        .route("/", get(greeting))
        .route("/auth/register", post(routes::user::register))
        .route("/auth/login", post(routes::user::login))
        // Ship reads stay public; only writes require identity.
        .route("/ships", get(routes::ship::list_ships))
        .route("/ships/{id}", get(routes::ship::get_ship_by_id));

    let protected_routes = Router::new()
        .route("/ships", post(routes::ship::create_ship))
        .route("/ships/{id}", put(routes::ship::update_ship))
        .route("/ships/{id}", delete(routes::ship::delete_ship))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new().merge(public_routes).merge(protected_routes);

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server is running at http://{}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
