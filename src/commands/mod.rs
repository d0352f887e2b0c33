pub mod interactive;
pub mod misc;
pub mod search;
pub mod trending;

pub use interactive::run_interactive;
pub use misc::{display_banner, generate_completions};
pub use search::search_repos;
pub use trending::trending_repos;
