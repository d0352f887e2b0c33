use clap::{Parser, Subcommand};
use clap_complete::Shell;
use gitsplore::config::GitsploreConfig;
use gitsplore::explorer::Explorer;
use gitsplore::models::{SearchFilters, SortField, SortOrder};
use gitsplore::state::{SearchSnapshot, SearchStore, Theme};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gitsplore")]
#[command(about = "Search and browse GitHub repositories", long_about = None)]
#[command(version)]
struct Cli {
    /// Colour theme for results
    #[arg(long, global = true, default_value = "dark")]
    theme: Theme,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search repositories (an empty query lists popular ones)
    #[command(short_flag = 's', visible_alias = "find")]
    Search {
        /// Free-text query (e.g., 'machine learning')
        #[arg(default_value = "")]
        query: String,
        /// Only repositories whose primary language matches
        #[arg(long, short = 'l', default_value = "")]
        language: String,
        /// Sort field: stars, forks, updated or created
        #[arg(long, default_value = "stars")]
        sort: SortField,
        /// Sort order: asc or desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        /// Minimum number of stars
        #[arg(long, default_value_t = 0)]
        min_stars: u64,
        /// Result page (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Results per page (overrides config)
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Repositories created this week, by stars
    #[command(short_flag = 't')]
    Trending {
        /// Only repositories in this language
        #[arg(long, short = 'l')]
        language: Option<String>,
    },
    /// Interactive search session with filters and recent searches
    #[command(short_flag = 'i')]
    Interactive,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = GitsploreConfig::load()?;
    if let Some(Commands::Search {
        per_page: Some(per_page),
        ..
    }) = &cli.command
    {
        config.per_page = *per_page;
    }
    let explorer = Explorer::from_config(&config)?;

    match cli.command {
        None => commands::display_banner(),
        Some(Commands::Search {
            query,
            language,
            sort,
            order,
            min_stars,
            page,
            ..
        }) => {
            let filters = SearchFilters {
                language: language.trim().to_string(),
                sort,
                order,
                min_stars,
            };
            commands::search_repos(&explorer, query.trim(), &filters, page, cli.theme).await?
        }
        Some(Commands::Trending { language }) => {
            commands::trending_repos(&explorer, language.as_deref(), cli.theme).await?
        }
        Some(Commands::Interactive) => {
            let store = SearchStore::new(SearchSnapshot {
                theme: cli.theme,
                ..SearchSnapshot::default()
            });
            commands::run_interactive(&explorer, &store).await?
        }
        Some(Commands::Completions { shell }) => commands::generate_completions(shell),
    }
    Ok(())
}
