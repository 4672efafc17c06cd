use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{api::Record, auth::User, utils::new_id};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub subreddit: String,
    pub author_id: String,
    pub author_username: String,
    pub upvotes: u32,
    pub downvotes: u32,
    pub comment_count: u32,
    pub post_type: PostType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

impl Post {
    /// Build a fresh post authored by `user` with zeroed counters
    pub fn new(draft: PostDraft, user: &User) -> Self {
        let now = Utc::now();
        Self {
            id: new_id("post"),
            title: draft.title,
            content: draft.content,
            subreddit: draft.subreddit,
            author_id: user.id.clone(),
            author_username: user.username(),
            upvotes: 0,
            downvotes: 0,
            comment_count: 0,
            post_type: draft.post_type,
            url: draft.url,
            image_url: draft.image_url,
            created_at: now,
            updated_at: now,
            user_id: user.id.clone(),
        }
    }

    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

impl Record for Post {
    const COLLECTION: &'static str = "posts";
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Text,
    Link,
    Image,
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Link => write!(f, "link"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// The user-supplied part of a post
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: Option<String>,
    pub subreddit: String,
    pub post_type: PostType,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl PostDraft {
    pub fn text(title: &str, subreddit: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Some(content.to_string()),
            subreddit: subreddit.to_string(),
            post_type: PostType::Text,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let user = User::new("u1", Some("alice@example.com"));
        let post = Post::new(PostDraft::text("Hello", "general", "hi"), &user);
        let value = serde_json::to_value(&post).unwrap();

        assert_eq!(value["authorUsername"], "alice");
        assert_eq!(value["postType"], "text");
        assert_eq!(value["commentCount"], 0);
        assert!(value.get("imageUrl").is_none());
    }

    #[test]
    fn score_can_go_negative() {
        let user = User::new("u1", None);
        let mut post = Post::new(PostDraft::text("Hello", "general", ""), &user);
        post.upvotes = 2;
        post.downvotes = 5;
        assert_eq!(post.score(), -3);
    }
}
