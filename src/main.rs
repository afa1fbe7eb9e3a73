use rusty_rental_ddd::{
    adapters::mock::owner_directory::OwnerDirectory as MockOwnerDirectory,
    adapters::postgres::{
        bike_store::BikeStore as PostgresBikeStore,
        booking_store::BookingStore as PostgresBookingStore,
    },
    api::{handlers::AppState, router::create_router},
    application::{booking, catalog},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_rental_ddd=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection URL
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/rusty_rental".into());

    tracing::info!("Database URL: {}", database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Initialize adapters
    // アカウント管理コンテキストは本コアの外部にあるため、
    // 事業者ディレクトリはモック実装を接続する
    let bike_store = Arc::new(PostgresBikeStore::new(pool.clone()));
    let booking_store = Arc::new(PostgresBookingStore::new(pool.clone()));
    let owner_directory = Arc::new(MockOwnerDirectory::new());

    // Create service dependencies
    let booking_deps = booking::ServiceDependencies {
        bike_store: bike_store.clone(),
        booking_store,
    };
    let catalog_deps = catalog::ServiceDependencies {
        bike_store,
        owner_directory,
    };

    // Create application state
    let app_state = Arc::new(AppState {
        booking_deps,
        catalog_deps,
    });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
