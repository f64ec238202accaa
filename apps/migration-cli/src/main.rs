use std::env;

use clap::{Parser, ValueEnum};
use migration::{migrate, MigrationCommand};
use sea_orm::Database;

#[derive(Clone, ValueEnum)]
enum Db {
    Postgres,
    SqliteFile,
}

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "League document store migration tool")]
struct Args {
    /// Migration command to run: up | down | fresh | reset | refresh | status
    command: String,

    /// Database type
    #[arg(
        short,
        long,
        value_enum,
        default_value = "postgres",
        help = "Database type: postgres, sqlite-file"
    )]
    db: Db,
}

fn must_var(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("Required environment variable '{name}' is not set"))
}

/// Migrations run with owner credentials; the backend itself connects as the app user.
fn database_url(db: &Db) -> Result<String, String> {
    match db {
        Db::Postgres => {
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let name = must_var("PROD_DB")?;
            let user = must_var("LEAGUE_OWNER_USER")?;
            let password = must_var("LEAGUE_OWNER_PASSWORD")?;
            Ok(format!("postgresql://{user}:{password}@{host}:{port}/{name}"))
        }
        Db::SqliteFile => {
            let path = must_var("SQLITE_PATH")?;
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,sqlx=warn")
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.to_string().contains("invalid value") && e.to_string().contains("--db") {
                eprintln!("Unsupported database type provided.");
                eprintln!("In-memory SQLite is not supported: the schema would vanish with the process.");
                eprintln!("Supported database types: postgres, sqlite-file");
                std::process::exit(1);
            }
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let command = match args.command.as_str() {
        "up" => MigrationCommand::Up,
        "down" => MigrationCommand::Down,
        "fresh" => MigrationCommand::Fresh,
        "reset" => MigrationCommand::Reset,
        "refresh" => MigrationCommand::Refresh,
        "status" => MigrationCommand::Status,
        other => {
            eprintln!(
                "Unknown command: {other}. Use: up | down | fresh | reset | refresh | status"
            );
            std::process::exit(2);
        }
    };

    let url = match database_url(&args.db) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let conn = match Database::connect(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Failed to connect: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = migrate(&conn, command).await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}
