pub mod command;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;
use std::path::PathBuf;

use crate::auth::User;

pub use command::Command;

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Base URL of the remote document store
    #[arg(long, env = "STORE_URL", default_value = "http://localhost:8080/api")]
    store_url: String,
    /// Bearer token for the remote store
    #[arg(long, env = "STORE_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Where locally saved posts and communities are kept
    #[arg(long, env = "CACHE_PATH", default_value = "./reddit-cache.db")]
    cache: PathBuf,
    /// Signed-in user id
    #[arg(long, env = "USER_ID")]
    user_id: Option<String>,
    /// Signed-in user email, used for the display name
    #[arg(long, env = "USER_EMAIL")]
    email: Option<String>,
    /// Limit request concurrency
    #[arg(long, default_value = "5")]
    limit: usize,
    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,
    #[command(subcommand)]
    command: Command,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }
    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .init();
    }
    pub fn store_url(&self) -> &str {
        &self.store_url
    }
    pub fn token(&self) -> Option<String> {
        self.token.clone().filter(|token| !token.is_empty())
    }
    pub const fn cache(&self) -> &PathBuf {
        &self.cache
    }
    /// The user to sign in as, if an id was given
    pub fn user(&self) -> Option<User> {
        let id = self.user_id.as_deref().filter(|id| !id.is_empty())?;
        Some(User::new(id, self.email.as_deref()))
    }
    pub const fn limit(&self) -> usize {
        self.limit
    }
    pub const fn timeout(&self) -> u64 {
        self.timeout
    }
    pub const fn command(&self) -> &Command {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{display::FeedSort, post::VoteType};

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("reddit-lite").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_apply() {
        let config = parse(&["--store-url", "http://store.test/api", "posts"]);
        assert_eq!(config.store_url(), "http://store.test/api");
        assert_eq!(config.limit(), 5);
        assert_eq!(
            config.command(),
            &Command::Posts {
                sort: FeedSort::Hot,
                community: None
            }
        );
    }

    #[test]
    fn user_needs_an_id() {
        let config = parse(&["--user-id", "", "--email", "a@b.c", "communities"]);
        assert_eq!(config.user(), None);

        let config = parse(&["--user-id", "u1", "--email", "a@b.c", "communities"]);
        assert_eq!(config.user().unwrap().username(), "a");
    }

    #[test]
    fn vote_accepts_short_directions() {
        let config = parse(&["vote", "post_1", "up"]);
        assert_eq!(
            config.command(),
            &Command::Vote {
                post_id: "post_1".to_string(),
                direction: VoteType::Upvote
            }
        );
    }
}
