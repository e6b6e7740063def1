pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::{OrderPlacementService, ProductService};
use auth::TokenVerifier;
use infrastructure::{DieselOrderRepository, DieselProductRepository, HttpInventoryLedger};

pub use db::{create_pool, DbPool};

// Each service owns its own store; the migration sets never mix.
pub const ORDERS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/orders");
pub const PRODUCTS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/products");

/// Concrete service compositions used by the REST binaries.
pub type OrdersApp = OrderPlacementService<HttpInventoryLedger, DieselOrderRepository>;
pub type ProductsApp = ProductService<DieselProductRepository>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool, migrations: EmbeddedMigrations) {
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(migrations)
        .expect("Failed to run database migrations");
}

/// Build and return the orders service bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_orders_server(
    pool: DbPool,
    verifier: TokenVerifier,
    ledger: HttpInventoryLedger,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(OrderPlacementService::new(
        ledger,
        DieselOrderRepository::new(pool),
    ));
    let verifier = web::Data::new(verifier);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(verifier.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/orders")
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/{id}", web::get().to(handlers::orders::get_order)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}

/// Build and return the products service bound to `host:port`.
pub fn build_products_server(
    pool: DbPool,
    verifier: TokenVerifier,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(ProductService::new(DieselProductRepository::new(pool)));
    let verifier = web::Data::new(verifier);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(verifier.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/products")
                    .route("", web::post().to(handlers::products::create_product))
                    .route("/{id}", web::put().to(handlers::products::update_product))
                    .route("/{id}/buy", web::post().to(handlers::products::buy_product)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
