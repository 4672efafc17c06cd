use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{api::Record, utils::new_id};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn on_post(user_id: &str, post_id: &str, vote_type: VoteType) -> Self {
        Self {
            id: new_id("vote"),
            user_id: user_id.to_string(),
            post_id: Some(post_id.to_string()),
            comment_id: None,
            vote_type,
            created_at: Utc::now(),
        }
    }
}

impl Record for Vote {
    const COLLECTION: &'static str = "votes";
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    #[value(alias = "up")]
    Upvote,
    #[value(alias = "down")]
    Downvote,
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Upvote => write!(f, "upvote"),
            Self::Downvote => write!(f, "downvote"),
        }
    }
}
