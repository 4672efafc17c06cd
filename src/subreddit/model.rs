use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{api::Record, auth::User, utils::new_id};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subreddit {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub member_count: u32,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

impl Subreddit {
    /// The creator counts as the first member
    pub fn new(draft: SubredditDraft, user: &User) -> Self {
        Self {
            id: new_id("subreddit"),
            name: draft.name,
            display_name: draft.display_name,
            description: draft.description,
            member_count: 1,
            created_at: Utc::now(),
            user_id: user.id.clone(),
        }
    }
}

impl Record for Subreddit {
    const COLLECTION: &'static str = "subreddits";
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub subreddit_name: String,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(user: &User, subreddit_name: &str) -> Self {
        Self {
            id: new_id("membership"),
            user_id: user.id.clone(),
            subreddit_name: subreddit_name.to_string(),
            joined_at: Utc::now(),
        }
    }
}

impl Record for Membership {
    const COLLECTION: &'static str = "userSubredditMemberships";
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubredditDraft {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
}

impl SubredditDraft {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}
