use anyhow::{bail, Context, Result};
use clap::Parser;

use investor_commitments::config::{Cli, Command, ImportArgs, StatsArgs};
use investor_commitments::{db, logging, run_load, Database};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.debug)?;

    match cli.command {
        Command::Import(args) => run_import(&args),
        Command::Stats(args) => run_stats(&args),
    }
}

fn run_import(args: &ImportArgs) -> Result<()> {
    println!("🗄️  Data Import - CSV → SQLite (full refresh)");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let database = Database::new(&args.db);
    let report = run_load(&args.csv, &database)
        .with_context(|| format!("Failed to load {}", args.csv.display()))?;

    println!("✓ Successfully {} into {}", report, args.db.display());

    Ok(())
}

fn run_stats(args: &StatsArgs) -> Result<()> {
    let database = Database::new(&args.db);

    if !database.exists() {
        bail!(
            "Database not found at {} (run `investor-commitments import` first)",
            args.db.display()
        );
    }

    let conn = database.session().context("Failed to open database")?;
    let investors = db::count_investors(&conn)?;
    let commitments = db::count_commitments(&conn)?;

    println!("📊 {}", args.db.display());
    println!("✓ Investors:   {}", investors);
    println!("✓ Commitments: {}", commitments);

    Ok(())
}
