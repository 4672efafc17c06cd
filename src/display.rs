use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{post::Post, post::PostType, subreddit::Subreddit};

/// Seconds of age worth one order of magnitude of score in the hot ranking
const HOT_DECAY: f64 = 45_000.0;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, ValueEnum, PartialEq, Eq, Default)]
pub enum FeedSort {
    #[default]
    Hot,
    New,
    Top,
}

impl FeedSort {
    /// Sort `posts` in place, optionally keeping one community only
    pub fn apply(&self, posts: &mut Vec<Post>, community: Option<&str>) {
        if let Some(community) = community {
            posts.retain(|post| post.subreddit == community);
        }
        match self {
            Self::New => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::Top => posts.sort_by(|a, b| b.score().cmp(&a.score())),
            Self::Hot => posts.sort_by(|a, b| hot_rank(b).total_cmp(&hot_rank(a))),
        }
    }
}

impl fmt::Display for FeedSort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Hot => write!(f, "hot"),
            Self::New => write!(f, "new"),
            Self::Top => write!(f, "top"),
        }
    }
}

fn hot_rank(post: &Post) -> f64 {
    let score = post.score();
    let order = (score.unsigned_abs().max(1) as f64).log10();
    let sign = score.signum() as f64;
    sign * order + post.created_at.timestamp() as f64 / HOT_DECAY
}

pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let (amount, unit) = if elapsed.num_minutes() < 1 {
        return "just now".to_string();
    } else if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "hour")
    } else {
        (elapsed.num_days(), "day")
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{} {}{} ago", amount, unit, plural)
}

pub fn display_posts(posts: &[Post]) {
    if !log::log_enabled!(log::Level::Info) {
        return;
    }
    if posts.is_empty() {
        info!("No posts yet");
        return;
    }

    let now = Utc::now();
    let score_width = posts
        .iter()
        .map(|post| post.score().to_string().len())
        .max()
        .unwrap_or_default()
        .max(5);

    for post in posts {
        info!(
            "{:>score_width$} | r/{} | Posted by u/{} | {}",
            post.score(),
            post.subreddit,
            post.author_username,
            time_ago(post.created_at, now)
        );
        info!("{:score_width$} | {}", "", post.title);
        let body = match post.post_type {
            PostType::Text => post.content.as_deref().filter(|c| !c.is_empty()),
            PostType::Link => post.url.as_deref(),
            PostType::Image => post.image_url.as_deref(),
        };
        if let Some(body) = body {
            info!("{:score_width$} | {}", "", body);
        }
        info!(
            "{:score_width$} | {} comments | id {}",
            "", post.comment_count, post.id
        );
        info!("");
    }
}

pub fn display_communities(subreddits: &[Subreddit]) {
    if !log::log_enabled!(log::Level::Info) {
        return;
    }

    let (mut name_width, mut member_width) = (6_usize, 7_usize);
    for subreddit in subreddits {
        name_width = (subreddit.name.len() + 2).max(name_width);
        member_width = subreddit.member_count.to_string().len().max(member_width);
    }

    info!(
        "+-{:-<name_width$}-+-{:-<member_width$}-+-{}------- - -",
        " Name ", " Members ", " Title "
    );
    for subreddit in subreddits {
        info!(
            "| {:name_width$} | {:>member_width$} | {}",
            format!("r/{}", subreddit.name),
            subreddit.member_count,
            subreddit.display_name
        );
    }
    info!(
        "+-{}-+-{}-+------------ - -",
        "-".repeat(name_width),
        "-".repeat(member_width)
    );
}
