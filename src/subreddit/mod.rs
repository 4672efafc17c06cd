mod model;

use std::sync::Arc;

use log::{debug, warn};
use serde_json::json;

pub use model::{Membership, Subreddit, SubredditDraft};

use crate::{
    api::{Direction, Query, RemoteStore, StoreError},
    auth::{require_user, AuthProvider, User},
    cache::{LocalCache, SUBREDDITS_KEY},
    error::Result,
    post::OFFLINE_MESSAGE,
};

const LIST_LIMIT: usize = 20;

/// Community list backed by the remote store, degrading to the local cache
///
/// Shares the offline rules of [`crate::post::PostFeed`].
pub struct Communities<S, A> {
    store: Arc<S>,
    auth: Arc<A>,
    cache: Arc<LocalCache>,
    subreddits: Vec<Subreddit>,
    loading: bool,
    error: Option<String>,
    offline: bool,
}

impl<S: RemoteStore, A: AuthProvider> Communities<S, A> {
    pub fn new(store: Arc<S>, auth: Arc<A>, cache: Arc<LocalCache>) -> Self {
        Self {
            store,
            auth,
            cache,
            subreddits: vec![],
            loading: true,
            error: None,
            offline: false,
        }
    }

    pub fn subreddits(&self) -> &[Subreddit] {
        &self.subreddits
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

    pub fn find(&self, name: &str) -> Option<&Subreddit> {
        self.subreddits.iter().find(|s| s.name == name)
    }

    /// Largest communities first
    pub async fn fetch(&mut self) -> &[Subreddit] {
        self.loading = true;
        self.error = None;

        let query = Query::new()
            .order_by("memberCount", Direction::Desc)
            .limit(LIST_LIMIT);
        match self.store.list::<Subreddit>(&query).await {
            Ok(subreddits) => {
                self.subreddits = subreddits;
                self.offline = false;
            }
            Err(e) => {
                self.go_offline("listing communities", e);
                self.subreddits = self.cache.load(SUBREDDITS_KEY).unwrap_or_else(|e| {
                    warn!("Ignoring unreadable community cache: {}", e);
                    vec![]
                });
                self.error = Some(OFFLINE_MESSAGE.to_string());
            }
        }

        self.loading = false;
        &self.subreddits
    }

    /// Drafts are expected to be validated already, see [`crate::forms`]
    pub async fn create(&mut self, draft: SubredditDraft) -> Result<Subreddit> {
        let user = require_user(self.auth.as_ref()).await?;
        let subreddit = Subreddit::new(draft, &user);

        if !self.offline {
            match self.create_remotely(&user, &subreddit).await {
                Ok(created) => {
                    self.subreddits.insert(0, created.clone());
                    return Ok(created);
                }
                Err(e) => self.go_offline("creating community", e),
            }
        }

        self.subreddits.insert(0, subreddit.clone());
        self.persist()?;
        Ok(subreddit)
    }

    async fn create_remotely(
        &self,
        user: &User,
        subreddit: &Subreddit,
    ) -> Result<Subreddit, StoreError> {
        let created = self.store.create(subreddit).await?;
        self.store
            .create(&Membership::new(user, &subreddit.name))
            .await?;
        Ok(created)
    }

    /// Every call counts as a new member, including repeat joins
    pub async fn join(&mut self, name: &str) -> Result<()> {
        let user = require_user(self.auth.as_ref()).await?;

        if !self.offline {
            match self.join_remotely(&user, name).await {
                Ok(true) => {
                    self.fetch().await;
                    return Ok(());
                }
                Ok(false) => return Ok(()),
                Err(e) => self.go_offline("joining community", e),
            }
        }

        let Some(subreddit) = self.subreddits.iter_mut().find(|s| s.name == name) else {
            warn!("Cannot join unknown community r/{} offline", name);
            return Ok(());
        };
        subreddit.member_count += 1;
        self.persist()
    }

    /// `Ok(false)` when the membership was recorded but the community is not listed
    async fn join_remotely(&self, user: &User, name: &str) -> Result<bool, StoreError> {
        self.store.create(&Membership::new(user, name)).await?;

        let Some(subreddit) = self.find(name) else {
            debug!("r/{} is not in the current list, member count left alone", name);
            return Ok(false);
        };
        self.store
            .update::<Subreddit>(
                &subreddit.id,
                json!({ "memberCount": subreddit.member_count + 1 }),
            )
            .await?;
        Ok(true)
    }

    fn go_offline(&mut self, action: &str, error: StoreError) {
        debug!("Remote store failed while {}, using local cache: {}", action, error);
        self.offline = true;
    }

    fn persist(&self) -> Result<()> {
        self.cache.save(SUBREDDITS_KEY, &self.subreddits)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::MemoryStore, auth::Session};

    fn communities_for(
        store: &Arc<MemoryStore>,
        cache: &Arc<LocalCache>,
        user: &str,
    ) -> Communities<MemoryStore, Session> {
        let session = Session::signed_in(User::new(user, None));
        Communities::new(store.clone(), Arc::new(session), cache.clone())
    }

    fn setup() -> (Arc<MemoryStore>, Arc<LocalCache>) {
        (
            Arc::new(MemoryStore::new()),
            Arc::new(LocalCache::in_memory().unwrap()),
        )
    }

    #[tokio::test]
    async fn creator_is_first_member_and_second_join_counts() {
        let (store, cache) = setup();
        let mut alice = communities_for(&store, &cache, "alice");
        alice.fetch().await;
        alice
            .create(SubredditDraft::new("programming", "Programming"))
            .await
            .unwrap();

        let listed = alice.fetch().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].member_count, 1);
        assert_eq!(store.count::<Membership>(), 1);

        let mut bob = communities_for(&store, &cache, "bob");
        bob.fetch().await;
        bob.join("programming").await.unwrap();

        assert_eq!(bob.find("programming").unwrap().member_count, 2);
        assert_eq!(store.count::<Membership>(), 2);
    }

    #[tokio::test]
    async fn repeat_joins_each_count() {
        let (store, cache) = setup();
        let mut alice = communities_for(&store, &cache, "alice");
        alice.fetch().await;
        alice
            .create(SubredditDraft::new("rust", "Rust"))
            .await
            .unwrap();

        alice.join("rust").await.unwrap();
        alice.join("rust").await.unwrap();
        assert_eq!(alice.find("rust").unwrap().member_count, 3);
    }

    #[tokio::test]
    async fn list_is_ordered_by_member_count() {
        let (store, cache) = setup();
        let mut alice = communities_for(&store, &cache, "alice");
        alice.fetch().await;
        alice.create(SubredditDraft::new("small", "Small")).await.unwrap();
        alice.create(SubredditDraft::new("big", "Big")).await.unwrap();
        alice.join("big").await.unwrap();

        let names: Vec<&str> = alice.subreddits().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["big", "small"]);
    }

    #[tokio::test]
    async fn offline_create_and_join_use_cache() {
        let (store, cache) = setup();
        store.set_reachable(false);

        let mut alice = communities_for(&store, &cache, "alice");
        assert!(alice.fetch().await.is_empty());
        assert!(alice.is_offline());
        assert_eq!(alice.error(), Some(OFFLINE_MESSAGE));

        let created = alice
            .create(SubredditDraft::new("gardening", "Gardening").description("Plants"))
            .await
            .unwrap();
        assert_eq!(created.member_count, 1);
        alice.join("gardening").await.unwrap();

        let cached: Vec<Subreddit> = cache.load(SUBREDDITS_KEY).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].member_count, 2);
        assert_eq!(cached[0].description.as_deref(), Some("Plants"));
        assert_eq!(store.count::<Subreddit>(), 0);
    }

    #[tokio::test]
    async fn failed_join_falls_back_to_local_increment() {
        let (store, cache) = setup();
        let mut alice = communities_for(&store, &cache, "alice");
        alice.fetch().await;
        alice
            .create(SubredditDraft::new("music", "Music"))
            .await
            .unwrap();

        store.set_reachable(false);
        alice.join("music").await.unwrap();

        assert!(alice.is_offline());
        assert_eq!(alice.find("music").unwrap().member_count, 2);
    }

    #[tokio::test]
    async fn anonymous_join_is_rejected() {
        let (store, cache) = setup();
        let mut communities = Communities::new(store, Arc::new(Session::new()), cache);
        let joined = communities.join("anything").await;
        assert!(matches!(joined, Err(crate::Error::NotAuthenticated)));
    }

    #[tokio::test]
    async fn corrupt_cache_falls_back_to_empty() {
        let (store, cache) = setup();
        cache.set_item(SUBREDDITS_KEY, "{bad").unwrap();
        store.set_reachable(false);

        let mut communities = communities_for(&store, &cache, "alice");
        assert!(communities.fetch().await.is_empty());
        assert!(communities.is_offline());
    }
}
