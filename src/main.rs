use std::{error::Error, sync::Arc};

use futures::join;
use log::{error, info, warn};
use reddit_lite::{
    api::HttpStore,
    auth::Session,
    cache::LocalCache,
    config::{Command, Config},
    display::{display_communities, display_posts},
    forms::{CommunityForm, PostForm},
    post::{PostFeed, OFFLINE_MESSAGE},
    seed::{seed_initial_data, seed_on_sign_in},
    step,
    subreddit::Communities,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();

    let cache = Arc::new(LocalCache::open(config.cache())?);
    let store = Arc::new(HttpStore::new(&config)?);
    let session = Arc::new(Session::new());
    match config.user() {
        Some(user) => session.login(user),
        None => session.resolve_anonymous(),
    }
    if config.command().requires_user() && session.state().user.is_none() {
        error!("Not signed in (tips: pass --user-id or set USER_ID)");
        return Err(reddit_lite::Error::NotAuthenticated.into());
    }

    if !matches!(config.command(), Command::Seed) {
        seed_on_sign_in(store.as_ref(), session.as_ref()).await;
    }

    let mut feed = PostFeed::new(store.clone(), session.clone(), cache.clone());
    let mut communities = Communities::new(store.clone(), session.clone(), cache);
    step!("Loading feed", join!(feed.fetch(), communities.fetch()));
    if feed.is_offline() || communities.is_offline() {
        warn!("{} ({} unreachable)", OFFLINE_MESSAGE, store.base_url());
    }

    match config.command() {
        Command::Posts { sort, community } => {
            let mut posts = feed.posts().to_vec();
            sort.apply(&mut posts, community.as_deref());
            display_posts(&posts);
        }
        Command::Post {
            community,
            title,
            kind,
            content,
            url,
            image_url,
        } => {
            let draft = PostForm {
                title: title.clone(),
                content: content.clone(),
                url: url.clone(),
                image_url: image_url.clone(),
                subreddit: community.clone(),
                post_type: *kind,
            }
            .into_draft(communities.subreddits())?;
            let post = feed.create(draft).await?;
            info!("Posted to r/{} ({})", post.subreddit, post.id);
        }
        Command::Vote { post_id, direction } => {
            feed.vote(post_id, *direction).await?;
            match feed.posts().iter().find(|post| &post.id == post_id) {
                Some(post) => info!("{} now at {} points", post.id, post.score()),
                None => warn!("{} is not in the current feed", post_id),
            }
        }
        Command::Communities => display_communities(communities.subreddits()),
        Command::CreateCommunity {
            name,
            display_name,
            description,
        } => {
            let draft = CommunityForm {
                name: name.clone(),
                display_name: display_name.clone(),
                description: description.clone(),
            }
            .into_draft(communities.subreddits())?;
            let subreddit = communities.create(draft).await?;
            info!("Community r/{} created successfully!", subreddit.name);
        }
        Command::Join { name } => {
            communities.join(name).await?;
            if let Some(subreddit) = communities.find(name) {
                info!("Joined r/{} ({} members)", subreddit.name, subreddit.member_count);
            }
        }
        Command::Seed => {
            let seeded = step!("Seeding", seed_initial_data(store.as_ref(), session.as_ref()).await?);
            if seeded {
                feed.fetch().await;
                display_posts(feed.posts());
            }
        }
    }

    Ok(())
}
