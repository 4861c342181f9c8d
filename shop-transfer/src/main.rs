//! shop-transfer: copy or remove a shop's data

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shop_cloud::db::DbService;
use shop_transfer::{
    ShopTransfer, TransferConfig, TransferOptions, find_shop, is_confirmed, remove_shop,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shop-transfer")]
#[command(about = "Copy a shop between databases or remove its data")]
#[command(version)]
struct Cli {
    /// Source database url (overrides SOURCE_DATABASE_URL)
    #[arg(long, global = true)]
    source: Option<String>,
    /// Target database url (overrides TARGET_DATABASE_URL)
    #[arg(long, global = true)]
    target: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy every collection of a shop from source to target
    Transfer {
        #[arg(long)]
        shop_id: String,
        /// Existing shop in the target that receives the data
        #[arg(long)]
        target_shop_id: Option<String>,
        #[arg(long)]
        page_size: Option<i64>,
    },
    /// Hard-delete a shop's data in the target database
    Remove {
        #[arg(long)]
        shop_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

async fn open(url: &str) -> Result<DbService> {
    let db = DbService::new(url)
        .await
        .with_context(|| format!("open database {url}"))?;
    db.health_check()
        .await
        .with_context(|| format!("database {url} is not responding"))?;
    Ok(db)
}

fn ask(prompt: &str) -> Result<String> {
    println!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shop_transfer=info,shop_cloud=info")),
        )
        .init();

    let cli = Cli::parse();
    let page_size = match &cli.command {
        Commands::Transfer { page_size, .. } => *page_size,
        Commands::Remove { .. } => None,
    };
    let config = TransferConfig::from_env().with_overrides(cli.source, cli.target, page_size);

    match cli.command {
        Commands::Transfer {
            shop_id,
            target_shop_id,
            ..
        } => {
            let source = open(config.source_url()?).await?;
            let target = open(config.target_url()?).await?;

            let options = TransferOptions {
                shop_id,
                target_shop_id: target_shop_id.filter(|t| !t.trim().is_empty()),
                page_size: config.page_size,
            };
            let report = ShopTransfer::new(source.pool.clone(), target.pool.clone())
                .run(&options)
                .await?;

            println!(
                "Transferred shop {} -> {}",
                report.shop_id, report.target_shop_id
            );
            for c in &report.collections {
                println!(
                    "  {:<24} read {:>6}  inserted {:>6}",
                    c.collection, c.read, c.inserted
                );
            }
            println!("Total inserted: {}", report.total_inserted());

            source.pool.close().await;
            target.pool.close().await;
        }
        Commands::Remove { shop_id, yes } => {
            let target = open(config.target_url()?).await?;

            let shop = find_shop(&target.pool, &shop_id)
                .await?
                .context("Shop not found")?;

            if !yes && !is_confirmed(&ask(&shop.confirm_prompt())?) {
                println!("Remove is cancelled");
                return Ok(());
            }

            let removed = remove_shop(&target.pool, &shop).await?;
            println!("Removed {removed} documents from shop {}", shop.guid);
            target.pool.close().await;
        }
    }

    Ok(())
}
