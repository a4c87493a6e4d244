mod digest;
mod error;
mod model;
mod parser;
mod rebalance;
mod settings;
mod store;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use model::{iso_timestamp, Category, NewsDocument};
use parser::bridge::BridgeEnvelope;
use settings::Settings;

#[derive(Parser)]
#[command(name = "news_hub", about = "Normalize news digests into dashboard JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a text or JSON news digest into the news document
    Normalize {
        /// Input file; `.json` selects the JSON dialect
        #[arg(long = "in")]
        input: PathBuf,
        /// Output file (default: settings news_path)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Parse a Daily Bridge markdown report into its JSON document
    Bridge {
        /// Markdown file (default: stdin)
        #[arg(long = "in")]
        input: Option<PathBuf>,
        /// Report date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Prepend a Daily Bridge digest item to the news document
    FoldBridge {
        /// Daily Bridge markdown file
        #[arg(long = "in")]
        input: PathBuf,
        /// News document (default: settings news_path)
        #[arg(long)]
        news: Option<PathBuf>,
        /// Category for the digest item
        #[arg(long, default_value = "global_biz", value_parser = parse_category)]
        category: Category,
    },
    /// Order the news document by category and apply per-category caps
    Rebalance {
        /// News document (default: settings news_path)
        #[arg(long)]
        news: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // stdout carries documents for `bridge`; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load settings")?;

    let result = match cli.command {
        Commands::Normalize { input, out } => {
            let raw = read_input(&input)?;
            let items = parser::normalize_input(&raw, &input)
                .with_context(|| format!("failed to normalize {}", input.display()))?;
            let out = out.unwrap_or_else(|| settings.news_path.clone());
            let doc = NewsDocument::new(items, Utc::now());
            store::write_json_atomic(&out, &doc)?;
            println!("Wrote {} items -> {}", doc.items.len(), out.display());
            Ok(())
        }
        Commands::Bridge { input, date, out } => {
            let markdown = match &input {
                Some(path) => read_input(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read stdin")?;
                    buf
                }
            };
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let envelope = BridgeEnvelope {
                date: date.format("%Y-%m-%d").to_string(),
                generated_at: iso_timestamp(Utc::now()),
                language: settings.language.clone(),
                owner: settings.owner.clone(),
            };
            let doc = parser::daily_bridge(&markdown, envelope)
                .context("pipe Daily Bridge markdown on stdin or pass --in")?;
            info!(date = %doc.date, sections = doc.sections.len(), "parsed daily bridge");

            match out {
                Some(path) => {
                    store::write_json_atomic(&path, &doc)?;
                    println!("Wrote {} sections -> {}", doc.sections.len(), path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&doc)?),
            }
            Ok(())
        }
        Commands::FoldBridge {
            input,
            news,
            category,
        } => {
            let markdown = read_input(&input)?;
            let news = news.unwrap_or_else(|| settings.news_path.clone());
            let now = Utc::now();
            let fallback = Local::now().date_naive().format("%Y-%m-%d").to_string();

            let item = digest::digest_item(&markdown, category, &fallback, now);
            let id = item.id.clone();
            let mut doc = store::load_news(&news)
                .with_context(|| format!("failed to load {}", news.display()))?
                .unwrap_or_else(|| NewsDocument::new(Vec::new(), now));

            if digest::fold_into(&mut doc, item, now) {
                store::write_json_atomic(&news, &doc)?;
                println!("Added {} -> {}", id, news.display());
            } else {
                println!("{} already in {}", id, news.display());
            }
            Ok(())
        }
        Commands::Rebalance { news } => {
            let news = news.unwrap_or_else(|| settings.news_path.clone());
            let Some(doc) = store::load_news(&news)
                .with_context(|| format!("failed to load {}", news.display()))?
            else {
                println!("No news document at {}. Run 'normalize' first.", news.display());
                return Ok(());
            };

            let NewsDocument { items, extra, .. } = doc;
            let before = items.len();
            let (items, counts) = rebalance::rebalance(items, &settings.caps);
            let doc = NewsDocument {
                extra,
                ..NewsDocument::new(items, Utc::now())
            };
            store::write_json_atomic(&news, &doc)?;

            for (category, count) in &counts {
                println!("{:<16} {:>3} / {}", category, count, settings.caps.cap(*category));
            }
            println!("Kept {} of {} items -> {}", doc.items.len(), before, news.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("done in {}", format_duration(elapsed));
    }

    result
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_key(s).ok_or_else(|| {
        let keys: Vec<_> = Category::ALL.iter().map(|c| c.key()).collect();
        format!("unknown category '{}' (expected one of: {})", s, keys.join(", "))
    })
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
