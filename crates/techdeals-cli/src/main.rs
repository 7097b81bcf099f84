mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "techdeals-cli")]
#[command(about = "Query the techdeals product catalog from the command line")]
struct Cli {
    /// Directory holding the catalog JSON files
    #[arg(
        long,
        global = true,
        env = "TECHDEALS_DATA_DIR",
        default_value = "./data"
    )]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List one page of products
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = techdeals_catalog::DEFAULT_PAGE_LIMIT)]
        limit: usize,

        /// Category display name or slug
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive substring over title, categories and description
        #[arg(long)]
        search: Option<String>,

        /// One of under-100, 100-300, 300-500, over-500
        #[arg(long)]
        price_range: Option<techdeals_core::PriceRange>,

        /// Cap on the number of matches before paging
        #[arg(long)]
        max: Option<usize>,

        /// Treat an unknown category as no category filter
        #[arg(long)]
        permissive: bool,
    },
    /// Show one product by exact title
    Show {
        title: String,

        /// Affiliate tag for the printed link
        #[arg(
            long,
            env = "TECHDEALS_AFFILIATE_TAG",
            default_value = techdeals_core::DEFAULT_AFFILIATE_TAG
        )]
        tag: String,
    },
    /// Print the URL identifier of every product
    Urls,
    /// Print category slugs and names
    Categories,
    /// Rewrite a marketplace URL into an affiliate link
    Affiliate {
        url: String,

        #[arg(
            long,
            env = "TECHDEALS_AFFILIATE_TAG",
            default_value = techdeals_core::DEFAULT_AFFILIATE_TAG
        )]
        tag: String,
    },
    /// Read every product file and report record counts
    Check,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::List {
            page,
            limit,
            category,
            search,
            price_range,
            max,
            permissive,
        } => commands::run_list(
            &cli.data_dir,
            &commands::ListArgs {
                page,
                limit,
                category,
                search,
                price_range,
                max,
                permissive,
            },
            &mut out,
        ),
        Commands::Show { title, tag } => {
            commands::run_show(&cli.data_dir, &title, &tag, &mut out)
        }
        Commands::Urls => commands::run_urls(&cli.data_dir, &mut out),
        Commands::Categories => commands::run_categories(&cli.data_dir, &mut out),
        Commands::Affiliate { url, tag } => commands::run_affiliate(&url, &tag, &mut out),
        Commands::Check => commands::run_check(&cli.data_dir, &mut out),
    }
}
