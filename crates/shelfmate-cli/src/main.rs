use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use shelfmate_core::{
    AppConfig, BookCategory, Database, ExitCode, PoolMaintainer, PoolStore, Recommender,
    load_records, parse_id,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "shelfmate",
    about = "Interest pools and personalized book recommendations",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting SHELFMATE_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, default config and database.
    Init,

    /// Import a JSON array of book records into the corpus.
    Import { file: String },

    /// Record that a user engaged with a book.
    Engage { user: String, book: String },

    /// Draw a recommendation batch for a user.
    Recommend {
        user: String,
        /// Browse a single category instead of the personalized mix.
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a user's interest pool.
    Pool { user: String },

    /// Run the HTTP server.
    Serve,

    /// Run diagnostics.
    Doctor,

    /// Show version information.
    Version,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let default_level = if matches!(cli.command, Commands::Serve) { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    // ── Env var overrides ──────────────────────────────────────────────────
    let json_output = cli.json || std::env::var("SHELFMATE_JSON").as_deref() == Ok("1");

    let timing = std::env::var("SHELFMATE_TIMING").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if let Ok(data_path) = std::env::var("SHELFMATE_DATA_PATH") {
        config.set_data_path(data_path.into());
    }

    if timing {
        eprintln!("[timing] config loaded in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    }

    match cli.command {
        // ── Init ───────────────────────────────────────────────────────────

        Commands::Init => {
            let config_path = AppConfig::config_path();
            let created_config = !config_path.exists();
            if created_config {
                config.save_to(&config_path)?;
            }
            let db = open_db(&config)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "config": config_path,
                        "config_created": created_config,
                        "database": config.database_path(),
                        "schema_versions": db.schema_versions()?,
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                if created_config {
                    println!("Wrote default config: {}", config_path.display());
                }
                println!("Database ready: {}", config.database_path().display());
            }
        }

        // ── Import ─────────────────────────────────────────────────────────

        Commands::Import { file } => {
            let path = Path::new(&file);
            if !path.exists() {
                fail(json_output, ExitCode::NotFound, "not_found", &format!("File not found: {file}"), &start);
            }
            let books = load_records(path)?;
            let db = open_db(&config)?;
            let imported = db.import_books(&books)?;
            let total = db.count_books()?;
            info!(imported, total, "imported corpus");
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "imported": imported, "total": total },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Imported {imported} books ({total} in corpus)");
            }
        }

        // ── Engage ─────────────────────────────────────────────────────────

        Commands::Engage { user, book } => {
            let user_id = parse_arg_id(&user, json_output, &start);
            let book_id = parse_arg_id(&book, json_output, &start);
            let db = open_db(&config)?;

            PoolMaintainer::new(&db, &db, &config.pool).record_engagement(&user_id, &book_id)?;
            let pool = db.load_pool(&user_id)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":pool,"meta":{"duration_ms":dur}}))?;
            } else if let Some(pool) = pool {
                println!("Recorded engagement (saturation {})", pool.saturation);
            } else {
                println!("No interest pool for {user}; book {book} is not in the corpus");
            }
        }

        // ── Recommend ──────────────────────────────────────────────────────

        Commands::Recommend { user, category } => {
            let user_id = parse_arg_id(&user, json_output, &start);
            let category = match category.as_deref().map(str::parse::<BookCategory>).transpose() {
                Ok(c) => c,
                Err(e) => fail(json_output, ExitCode::InvalidArgs, "invalid_args", &e.to_string(), &start),
            };
            let db = open_db(&config)?;
            let batch = Recommender::new(&db, &db, &config.pool).recommend(&user_id, category)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": batch, "total": batch.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if batch.is_empty() {
                println!("No recommendations. Use `shelfmate import` to load books.");
            } else {
                for book in &batch {
                    let authors = book.authors.join(", ");
                    println!(
                        "{id}  {title:<40}  {authors}",
                        id = &book.book_id[..8],
                        title = book.title,
                    );
                }
            }
        }

        // ── Pool ───────────────────────────────────────────────────────────

        Commands::Pool { user } => {
            let user_id = parse_arg_id(&user, json_output, &start);
            let db = open_db(&config)?;
            let Some(pool) = db.load_pool(&user_id)? else {
                fail(json_output, ExitCode::NotFound, "not_found", &format!("No interest pool for {user}"), &start);
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":pool,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Saturation: {}/{}", pool.saturation, config.pool.saturation_limit);
                let mut weights: Vec<_> = pool.categories.iter().collect();
                weights.sort_by(|a, b| b.1.cmp(a.1));
                for (category, weight) in weights {
                    println!("  {:<28} {weight:>3}", category.as_str());
                }
            }
        }

        // ── Serve ──────────────────────────────────────────────────────────

        Commands::Serve => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(shelfmate_server::start_server(&config))?;
        }

        // ── Doctor ─────────────────────────────────────────────────────────

        Commands::Doctor => {
            let config_path = AppConfig::config_path();
            if config_path.exists() {
                println!("✓ Config: {}", config_path.display());
            } else {
                println!("○ Config: not found (using defaults)");
            }

            let mut issues = 0;
            match config.validate() {
                Ok(()) => println!("✓ Pool settings: valid"),
                Err(e) => { issues += 1; println!("✗ Pool settings: {e}"); }
            }

            let db_path = config.database_path();
            if db_path.exists() {
                match Database::open(&db_path) {
                    Ok(db) => {
                        let books = db.count_books().unwrap_or(0);
                        let pools = db.count_pools().unwrap_or(0);
                        println!("✓ Database: {} ({books} books, {pools} pools)", db_path.display());
                    }
                    Err(e) => { issues += 1; println!("✗ Database: {e}"); }
                }
            } else {
                println!("○ Database: not created yet (run `shelfmate init`)");
            }

            if issues == 0 { println!("\nAll checks passed ✓"); }
            else { println!("\n{issues} issues found"); std::process::exit(ExitCode::GeneralError as i32); }
        }

        // ── Version ────────────────────────────────────────────────────────

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("shelfmate v{version}");
            }
        }
    }

    if timing {
        eprintln!("[timing] total {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_db(config: &AppConfig) -> Result<Database> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Database::open(&db_path)?)
}

fn fail(json_output: bool, code: ExitCode, error: &str, message: &str, start: &Instant) -> ! {
    if json_output {
        let dur = start.elapsed().as_millis();
        let body = serde_json::json!({"status":"error","error":error,"message":message,"meta":{"duration_ms":dur}});
        println!("{body}");
    } else {
        eprintln!("{message}");
    }
    std::process::exit(code as i32);
}

fn parse_arg_id(raw: &str, json_output: bool, start: &Instant) -> Uuid {
    match parse_id(raw) {
        Ok(id) => id,
        Err(e) => fail(json_output, ExitCode::InvalidArgs, "invalid_args", &e.to_string(), start),
    }
}
