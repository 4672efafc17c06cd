mod model;
mod vote;

use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use serde_json::json;

pub use model::{Post, PostDraft, PostType};
pub use vote::{Vote, VoteType};

use crate::{
    api::{Direction, Query, RemoteStore, StoreError},
    auth::{require_user, AuthProvider, User},
    cache::{LocalCache, POSTS_KEY},
    error::Result,
};

const FEED_LIMIT: usize = 50;
pub const OFFLINE_MESSAGE: &str = "Offline mode: showing locally saved data";

/// Post list backed by the remote store, degrading to the local cache
///
/// Any failed remote call switches the feed to offline mode. It stays there
/// until a later [`PostFeed::fetch`] reaches the store again.
pub struct PostFeed<S, A> {
    store: Arc<S>,
    auth: Arc<A>,
    cache: Arc<LocalCache>,
    posts: Vec<Post>,
    loading: bool,
    error: Option<String>,
    offline: bool,
}

impl<S: RemoteStore, A: AuthProvider> PostFeed<S, A> {
    pub fn new(store: Arc<S>, auth: Arc<A>, cache: Arc<LocalCache>) -> Self {
        Self {
            store,
            auth,
            cache,
            posts: vec![],
            loading: true,
            error: None,
            offline: false,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }
    pub fn is_loading(&self) -> bool {
        self.loading
    }
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Newest posts first; falls back to whatever the cache holds
    pub async fn fetch(&mut self) -> &[Post] {
        self.loading = true;
        self.error = None;

        let query = Query::new()
            .order_by("createdAt", Direction::Desc)
            .limit(FEED_LIMIT);
        match self.store.list::<Post>(&query).await {
            Ok(posts) => {
                self.posts = posts;
                self.offline = false;
            }
            Err(e) => {
                self.go_offline("listing posts", e);
                self.posts = self.load_cached();
                self.error = Some(OFFLINE_MESSAGE.to_string());
            }
        }

        self.loading = false;
        &self.posts
    }

    pub async fn create(&mut self, draft: PostDraft) -> Result<Post> {
        let user = require_user(self.auth.as_ref()).await?;
        let post = Post::new(draft, &user);

        if !self.offline {
            match self.store.create(&post).await {
                Ok(created) => {
                    self.posts.insert(0, created.clone());
                    return Ok(created);
                }
                Err(e) => self.go_offline("creating post", e),
            }
        }

        self.posts.insert(0, post.clone());
        self.persist()?;
        Ok(post)
    }

    /// Online, votes are records: the same vote twice withdraws it, the opposite
    /// one replaces it. Offline, the matching counter is bumped directly.
    pub async fn vote(&mut self, post_id: &str, vote_type: VoteType) -> Result<()> {
        let user = require_user(self.auth.as_ref()).await?;

        if !self.offline {
            match self.vote_remotely(&user, post_id, vote_type).await {
                Ok(()) => {
                    self.fetch().await;
                    return Ok(());
                }
                Err(e) => self.go_offline("voting", e),
            }
        }

        self.vote_locally(post_id, vote_type)
    }

    async fn vote_remotely(
        &self,
        user: &User,
        post_id: &str,
        vote_type: VoteType,
    ) -> Result<(), StoreError> {
        let query = Query::new()
            .filter("userId", user.id.as_str())
            .filter("postId", post_id);
        let existing: Vec<Vote> = self.store.list(&query).await?;

        match existing.into_iter().next() {
            Some(vote) if vote.vote_type == vote_type => {
                debug!("withdrawing {} on {}", vote_type, post_id);
                self.store.delete::<Vote>(&vote.id).await
            }
            Some(vote) => {
                debug!("switching vote on {} to {}", post_id, vote_type);
                self.store
                    .update::<Vote>(&vote.id, json!({ "voteType": vote_type }))
                    .await
            }
            None => {
                let vote = Vote::on_post(&user.id, post_id, vote_type);
                self.store.create(&vote).await.map(drop)
            }
        }
    }

    fn vote_locally(&mut self, post_id: &str, vote_type: VoteType) -> Result<()> {
        let Some(post) = self.posts.iter_mut().find(|post| post.id == post_id) else {
            warn!("Cannot vote offline on unknown post {}", post_id);
            return Ok(());
        };

        match vote_type {
            VoteType::Upvote => post.upvotes += 1,
            VoteType::Downvote => post.downvotes += 1,
        }
        post.updated_at = Utc::now();
        self.persist()
    }

    fn go_offline(&mut self, action: &str, error: StoreError) {
        debug!("Remote store failed while {}, using local cache: {}", action, error);
        self.offline = true;
    }

    fn load_cached(&self) -> Vec<Post> {
        self.cache.load(POSTS_KEY).unwrap_or_else(|e| {
            warn!("Ignoring unreadable post cache: {}", e);
            vec![]
        })
    }

    fn persist(&self) -> Result<()> {
        self.cache.save(POSTS_KEY, &self.posts)?;
        Ok(())
    }
}
