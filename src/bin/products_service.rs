use dotenvy::dotenv;
use marketplace::auth::{TokenVerifier, PRODUCTS_AUDIENCE};
use marketplace::{build_products_server, create_pool, run_migrations, PRODUCTS_MIGRATIONS};
use std::env;
use std::fs;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url =
        env::var("PRODUCTS_DATABASE_URL").expect("PRODUCTS_DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8002".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let public_key_file =
        env::var("AUTH_JWT_PUBLIC_KEY_FILE").expect("AUTH_JWT_PUBLIC_KEY_FILE must be set");

    let public_key = fs::read(&public_key_file).expect("Failed to read public key file");
    let verifier =
        TokenVerifier::from_pem(&public_key, PRODUCTS_AUDIENCE).expect("Invalid public key");

    let pool = create_pool(&database_url);
    run_migrations(&pool, PRODUCTS_MIGRATIONS);

    log::info!("Starting products service at http://{}:{}", host, port);

    build_products_server(pool, verifier, &host, port)?.await
}
