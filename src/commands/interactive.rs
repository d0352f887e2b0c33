use gitsplore::explorer::{Explorer, QueryState};
use gitsplore::models::{FiltersPatch, SortField, SortOrder, FILTER_PRESETS};
use gitsplore::query::{SEARCH_LANGUAGES, TRENDING_LANGUAGES};
use gitsplore::render;
use gitsplore::state::{SearchStore, Theme, RECENT_SEARCH_CAPACITY};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error};

fn help_text() -> String {
    format!(
        "\
  <text>          search repositories
  :lang [L]       filter by language (no argument clears it)
                  {}
  :sort FIELD     stars | forks | updated | created
  :order ORDER    asc | desc
  :min N          minimum stars
  :preset NAME    {}
  :recent [N]     show recent searches, or search the Nth again
  :clear          clear recent searches
  :theme          toggle light/dark
  :trending [L]   trending this week
  :help           this text
  :quit           leave",
        SEARCH_LANGUAGES.join(", "),
        FILTER_PRESETS.join(" | ")
    )
}

enum Input {
    Search(String),
    Filters(FiltersPatch),
    Recent(Option<usize>),
    ClearRecent,
    Theme,
    Trending(Option<String>),
    Help,
    Quit,
    Invalid(String),
}

fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Some(Input::Search(line.to_string()));
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    let input = match name {
        "lang" => Input::Filters(FiltersPatch::default().language(arg)),
        "sort" => match arg.parse::<SortField>() {
            Ok(sort) => Input::Filters(FiltersPatch::default().sort(sort)),
            Err(e) => Input::Invalid(e),
        },
        "order" => match arg.parse::<SortOrder>() {
            Ok(order) => Input::Filters(FiltersPatch::default().order(order)),
            Err(e) => Input::Invalid(e),
        },
        "min" => match arg.parse::<u64>() {
            Ok(min) => Input::Filters(FiltersPatch::default().min_stars(min)),
            Err(_) => Input::Invalid(format!("not a star count: '{}'", arg)),
        },
        "preset" => match FiltersPatch::preset(arg) {
            Some(patch) => Input::Filters(patch),
            None => Input::Invalid(format!(
                "unknown preset '{}' (expected {})",
                arg,
                FILTER_PRESETS.join(", ")
            )),
        },
        "recent" if arg.is_empty() => Input::Recent(None),
        "recent" => match arg.parse::<usize>() {
            Ok(n) if (1..=RECENT_SEARCH_CAPACITY).contains(&n) => Input::Recent(Some(n)),
            _ => Input::Invalid(format!(
                "not a recent search number: '{}' (expected 1-{})",
                arg, RECENT_SEARCH_CAPACITY
            )),
        },
        "clear" => Input::ClearRecent,
        "theme" => Input::Theme,
        "trending" => Input::Trending(Some(arg.to_string()).filter(|l| !l.is_empty())),
        "help" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => Input::Invalid(format!("unknown command ':{}'", other)),
    };
    Some(input)
}

fn print_state(title: &str, state: &QueryState, theme: Theme) {
    if let Some(err) = &state.error {
        error!(kind = %err.kind(), status = ?err.status(), "{}", err);
        println!("Search failed");
        println!("Please try again with different terms");
    } else if let Some(page) = &state.data {
        print!("{}", render::render_page(title, page, theme, 10));
    }
}

async fn settle(task: Option<JoinHandle<gitsplore::explorer::Delivery>>) {
    if let Some(task) = task {
        match task.await {
            Ok(delivery) => debug!(?delivery, "query settled"),
            Err(e) => error!("query task failed: {}", e),
        }
    }
}

fn prompt() {
    print!("gitsplore> ");
    let _ = std::io::stdout().flush();
}

pub async fn run_interactive(explorer: &Explorer, store: &SearchStore) -> anyhow::Result<()> {
    println!("Type a search, or :help for commands.");
    let languages: Vec<&str> = TRENDING_LANGUAGES.iter().map(|(name, _)| *name).collect();
    println!("Trending languages: {}", languages.join(", "));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_line(&line) else {
            prompt();
            continue;
        };

        match input {
            Input::Search(term) => {
                store.set_query(term.as_str());
                store.add_recent_search(&term);
                run_search(explorer, store).await;
            }
            Input::Filters(patch) => {
                store.set_filters(patch);
                let filters = store.filters();
                println!(
                    "filters: language={:?} sort={} order={} min_stars={}",
                    filters.language, filters.sort, filters.order, filters.min_stars
                );
                run_search(explorer, store).await;
            }
            Input::Recent(Some(n)) => match store.select_recent_search(n) {
                Some(_) => run_search(explorer, store).await,
                None => eprintln!("no recent search #{}", n),
            },
            Input::Recent(None) => {
                let recent = store.recent_searches();
                if recent.is_empty() {
                    println!("No recent searches.");
                }
                for (i, term) in recent.iter().enumerate() {
                    println!("  {}. {}", i + 1, term);
                }
            }
            Input::ClearRecent => {
                store.clear_recent_searches();
                println!("Recent searches cleared.");
            }
            Input::Theme => {
                let theme = store.toggle_theme();
                println!("Theme: {}", theme);
            }
            Input::Trending(language) => {
                settle(explorer.get_trending_repositories(language.as_deref())).await;
                let title = match &language {
                    Some(l) => format!("Trending This Week ({})", l),
                    None => "Trending This Week".to_string(),
                };
                print_state(&title, &explorer.trending_state(), store.theme());
            }
            Input::Help => println!("{}", help_text()),
            Input::Quit => break,
            Input::Invalid(message) => eprintln!("{}", message),
        }
        prompt();
    }
    Ok(())
}

async fn run_search(explorer: &Explorer, store: &SearchStore) {
    let term = store.term();
    settle(explorer.search_repositories(&term, &store.filters())).await;
    let title = format!("Search Results for \"{}\"", term);
    print_state(&title, &explorer.search_state(), store.theme());
}
