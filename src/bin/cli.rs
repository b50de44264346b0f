use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dotenvy::dotenv;
use formline::cli::seeder::{SeedShape, clear_seeded_data, seed_database};
use formline::config::jwt::JwtConfig;
use formline::utils::jwt::create_access_token;
use sqlx::Row;

#[derive(Parser)]
#[command(name = "formline-cli")]
#[command(about = "Formline CLI - Administrative tools for Formline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a demo hierarchy with admin users and a starter category
    Seed {
        /// Number of regions to create
        #[arg(short = 'r', long, default_value = "2")]
        regions: usize,

        /// Number of sectors per region
        #[arg(long, default_value = "2")]
        sectors: usize,

        /// Number of schools per sector
        #[arg(long, default_value = "3")]
        schools: usize,

        /// Print an access token for every seeded admin
        #[arg(long)]
        tokens: bool,
    },
    /// Clear all seeded data
    ClearSeed,
    /// Mint an access token for an existing user
    Token {
        /// Email of the user (prompted when omitted)
        #[arg(short = 'e', long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            regions,
            sectors,
            schools,
            tokens,
        } => {
            let shape = SeedShape {
                regions,
                sectors_per_region: sectors,
                schools_per_sector: schools,
            };
            match seed_database(&pool, shape).await {
                Ok(outcome) => {
                    if tokens {
                        let jwt_config = JwtConfig::from_env();
                        println!("\n🔑 Access tokens:");
                        for principal in &outcome.principals {
                            match create_access_token(principal, &jwt_config) {
                                Ok(token) => println!("   {}  {}", principal.email, token),
                                Err(e) => eprintln!("   {}  <error: {}>", principal.email, e),
                            }
                        }
                    }
                }
                Err(e) => {
                    eprintln!("❌ Seeding failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::ClearSeed => {
            let confirmed = Confirm::new()
                .with_prompt("Delete all seeded data (hierarchy, users, categories, submissions)?")
                .default(false)
                .interact()
                .unwrap_or(false);
            if !confirmed {
                println!("Aborted");
                return;
            }
            if let Err(e) = clear_seeded_data(&pool).await {
                eprintln!("❌ Clearing failed: {e}");
                std::process::exit(1);
            }
        }
        Commands::Token { email } => {
            let email = match email {
                Some(email) => email,
                None => Input::new()
                    .with_prompt("User email")
                    .interact_text()
                    .expect("email input"),
            };
            handle_token(&pool, &email).await;
        }
    }
}

async fn handle_token(pool: &sqlx::PgPool, email: &str) {
    use formline::formline_models::ids::{RegionId, SchoolId, SectorId, UserId};
    use formline::formline_models::roles::{Principal, Role};

    let row = sqlx::query(
        "SELECT id, email, role, region_id, sector_id, school_id FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .expect("user lookup failed");

    let Some(row) = row else {
        eprintln!("❌ No user with email {email}");
        std::process::exit(1);
    };

    let id: UserId = row.get("id");
    let tag: String = row.get("role");
    let region_id: Option<RegionId> = row.get("region_id");
    let sector_id: Option<SectorId> = row.get("sector_id");
    let school_id: Option<SchoolId> = row.get("school_id");

    let role = match Role::from_parts(&tag, region_id, sector_id, school_id) {
        Ok(role) => role,
        Err(e) => {
            eprintln!("❌ Stored role is inconsistent: {e}");
            std::process::exit(1);
        }
    };

    let principal = Principal {
        id,
        email: email.to_string(),
        role,
    };

    match create_access_token(&principal, &JwtConfig::from_env()) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            eprintln!("❌ Failed to create token: {e}");
            std::process::exit(1);
        }
    }
}
