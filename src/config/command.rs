use clap::Subcommand;

use crate::{
    display::FeedSort,
    post::{PostType, VoteType},
};

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Show the post feed
    Posts {
        /// Feed ordering
        #[arg(short, long, value_enum, default_value_t)]
        sort: FeedSort,
        /// Only show posts from this community
        #[arg(short, long)]
        community: Option<String>,
    },
    /// Create a post
    Post {
        /// Community to post in
        #[arg(short, long)]
        community: String,
        title: String,
        /// Kind of post
        #[arg(short, long, value_enum, default_value_t)]
        kind: PostType,
        /// Body of a text post
        #[arg(long, default_value = "")]
        content: String,
        /// Target of a link post
        #[arg(long, default_value = "")]
        url: String,
        /// Image of an image post
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Vote on a post; voting the same way twice withdraws the vote
    Vote {
        post_id: String,
        #[arg(value_enum)]
        direction: VoteType,
    },
    /// List the largest communities
    Communities,
    /// Create a community and join it
    CreateCommunity {
        /// Letters, numbers, and underscores only. Cannot be changed later
        name: String,
        display_name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Join a community
    Join { name: String },
    /// Fill an empty store with starter communities and posts
    Seed,
}

impl Command {
    /// Whether the command needs a signed-in user
    pub fn requires_user(&self) -> bool {
        !matches!(self, Self::Posts { .. } | Self::Communities)
    }
}
