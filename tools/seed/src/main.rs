mod catalog;
mod importer;

use clap::Parser;
use importer::import_items;
use sqlx::SqlitePool;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seed", about = "Seed the pick/ban item pool from a JSON catalog")]
struct Args {
    /// Path to the catalog, a JSON array of {"id", "name"} objects (e.g., resonators.json)
    #[arg(short, long)]
    items: PathBuf,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Clear existing items before import
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Connecting to database...");
    let pool = SqlitePool::connect(&args.database_url).await?;

    // Run migrations to ensure schema exists
    sqlx::migrate!("../../backend/migrations").run(&pool).await?;

    if args.clear {
        println!("Clearing existing items...");
        sqlx::query("DELETE FROM items").execute(&pool).await?;
    }

    println!("Reading catalog: {:?}", args.items);
    let items = catalog::load_catalog(&args.items)?;
    println!("Found {} items", items.len());

    let stats = import_items(&pool, &items).await?;

    println!();
    println!("Import complete:");
    println!("  Read from catalog:      {}", stats.read);
    println!("  Inserted into database: {}", stats.inserted);

    Ok(())
}
