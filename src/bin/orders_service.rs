use dotenvy::dotenv;
use marketplace::auth::{TokenIssuer, TokenVerifier, ORDERS_AUDIENCE};
use marketplace::infrastructure::HttpInventoryLedger;
use marketplace::{build_orders_server, create_pool, run_migrations, ORDERS_MIGRATIONS};
use std::env;
use std::fs;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("ORDERS_DATABASE_URL").expect("ORDERS_DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8003".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let products_url =
        env::var("PRODUCTS_SRV_URL").expect("PRODUCTS_SRV_URL must be set");
    let public_key_file =
        env::var("AUTH_JWT_PUBLIC_KEY_FILE").expect("AUTH_JWT_PUBLIC_KEY_FILE must be set");
    let private_key_file =
        env::var("AUTH_JWT_PRIVATE_KEY_FILE").expect("AUTH_JWT_PRIVATE_KEY_FILE must be set");

    let public_key = fs::read(&public_key_file).expect("Failed to read public key file");
    let private_key = fs::read(&private_key_file).expect("Failed to read private key file");

    let verifier =
        TokenVerifier::from_pem(&public_key, ORDERS_AUDIENCE).expect("Invalid public key");
    let issuer = TokenIssuer::from_pem(&private_key, "order_srv").expect("Invalid private key");
    let ledger = HttpInventoryLedger::new(products_url, issuer);

    let pool = create_pool(&database_url);
    run_migrations(&pool, ORDERS_MIGRATIONS);

    log::info!("Starting orders service at http://{}:{}", host, port);

    build_orders_server(pool, verifier, ledger, &host, port)?.await
}
