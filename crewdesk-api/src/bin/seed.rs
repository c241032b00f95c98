//! One-shot tenant seeding tool
//!
//! Companies are never created through the API, so a new deployment needs
//! this to bootstrap its first tenant and admin account:
//!
//! ```bash
//! SEED_COMPANY_NAME="Acme Renovations" \
//! SEED_ADMIN_EMAIL="owner@acme.example" \
//! SEED_ADMIN_PASSWORD="change-me-1" \
//! cargo run -p crewdesk-api --bin seed
//! ```
//!
//! Runs pending migrations first, then creates the company and its admin.

use crewdesk_shared::auth::password::{hash_password, validate_password_strength};
use crewdesk_shared::db::{migrations, pool};
use crewdesk_shared::models::company::Company;
use crewdesk_shared::models::user::{CreateUser, Role, User};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,crewdesk_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
    let company_name = std::env::var("SEED_COMPANY_NAME")
        .map_err(|_| anyhow::anyhow!("SEED_COMPANY_NAME environment variable is required"))?;
    let admin_email = std::env::var("SEED_ADMIN_EMAIL")
        .map_err(|_| anyhow::anyhow!("SEED_ADMIN_EMAIL environment variable is required"))?;
    let admin_password = std::env::var("SEED_ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("SEED_ADMIN_PASSWORD environment variable is required"))?;

    validate_password_strength(&admin_password).map_err(|msg| anyhow::anyhow!(msg))?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: database_url,
        max_connections: 2,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let company = Company::create(&db, &company_name).await?;
    tracing::info!(company_id = %company.id, name = %company.name, "Company created");

    let password_hash = hash_password(&admin_password)?;
    let admin = User::create(
        &db,
        CreateUser {
            email: admin_email,
            password_hash,
            name: None,
            role: Role::Admin,
            company_id: company.id,
        },
    )
    .await?;
    tracing::info!(user_id = %admin.id, email = %admin.email, "Admin user created");

    pool::close_pool(db).await;

    Ok(())
}
