use anyhow::{bail, Context, Result};
use clap::Parser;
use yamdb_core::confirmation::{generate_code, hash_code};
use yamdb_core::roles::Role;
use yamdb_core::users::{validate_email, validate_username};
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::UserRepo;

/// Create an administrator account, or promote an existing one, and print a
/// confirmation code that can be exchanged at `/api/v1/auth/token/`.
#[derive(Parser, Debug)]
#[command(name = "create-admin", version, about = "Bootstrap a YaMDb administrator")]
struct Cli {
    #[arg(long)]
    username: String,

    #[arg(long)]
    email: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "create_admin=info,yamdb_db=info".into()),
        )
        .init();

    let args = Cli::parse();
    validate_username(&args.username).context("Invalid --username")?;
    validate_email(&args.email).context("Invalid --email")?;

    let pool = yamdb_db::create_pool(&args.database_url)
        .await
        .context("Failed to connect to database")?;
    yamdb_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let user = match UserRepo::find_by_username(&pool, &args.username).await? {
        Some(existing) if existing.email != args.email => bail!(
            "User '{}' already exists with a different email ({})",
            existing.username,
            existing.email
        ),
        Some(existing) => {
            let promoted = UserRepo::grant_superuser(&pool, existing.id)
                .await?
                .context("User disappeared while being promoted")?;
            tracing::info!(user_id = promoted.id, "Existing user promoted to superuser");
            promoted
        }
        None => {
            let created = UserRepo::create(
                &pool,
                &CreateUser {
                    username: args.username.clone(),
                    email: args.email.clone(),
                    role: Role::Admin,
                    is_superuser: true,
                    ..Default::default()
                },
            )
            .await
            .context("Failed to create user (is the email already in use?)")?;
            tracing::info!(user_id = created.id, "Superuser created");
            created
        }
    };

    let code = generate_code();
    UserRepo::set_confirmation_code_hash(&pool, user.id, &hash_code(&code)).await?;

    println!("username:          {}", user.username);
    println!("email:             {}", user.email);
    println!("confirmation_code: {code}");

    pool.close().await;
    Ok(())
}
