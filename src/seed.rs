use chrono::{Duration, Utc};
use log::{error, info};
use rand::Rng;

use crate::{
    api::{Query, RemoteStore},
    auth::{AuthProvider, Session, User},
    error::Result,
    post::{Post, PostDraft},
    subreddit::{Subreddit, SubredditDraft},
};

const COMMUNITIES: [(&str, &str, &str, u32); 5] = [
    ("programming", "Programming", "A community for programmers to share knowledge and discuss coding", 1200),
    ("technology", "Technology", "Latest tech news and discussions", 1800),
    ("funny", "Funny", "Share your funny stories and memes", 3500),
    ("askreddit", "AskReddit", "Ask the Reddit community anything", 2800),
    ("general", "General", "General discussions about anything", 2100),
];

const POSTS: [(&str, &str, &str); 3] = [
    (
        "general",
        "Welcome to the community!",
        "Create posts, vote, and explore the different communities. Everything you do is kept locally when the server is out of reach.",
    ),
    (
        "programming",
        "What's your favorite programming language and why?",
        "I'm curious to hear about everyone's favorite programming languages. What makes your choice special?",
    ),
    (
        "technology",
        "The future of web development",
        "With all the new frameworks and tools coming out, what do you think the future of web development looks like?",
    ),
];

/// Fill an empty store with starter communities and posts
///
/// Returns `false` when nobody is signed in or the store already has posts.
pub async fn seed_initial_data(store: &impl RemoteStore, auth: &impl AuthProvider) -> Result<bool> {
    let Some(user) = auth.me().await else {
        return Ok(false);
    };

    let existing: Vec<Post> = store.list(&Query::new().limit(1)).await?;
    if !existing.is_empty() {
        info!("Store already has posts, skipping seed");
        return Ok(false);
    }

    for (name, display_name, description, members) in COMMUNITIES {
        let mut subreddit =
            Subreddit::new(SubredditDraft::new(name, display_name).description(description), &user);
        subreddit.member_count = members;
        match store.create(&subreddit).await {
            Ok(_) => info!(" + r/{}", name),
            Err(e) => info!(" - r/{} might already exist ({})", name, e),
        }
    }

    for post in starter_posts(&user) {
        store.create(&post).await?;
        info!(" + {}", post.title);
    }

    info!("Initial data seeded successfully!");
    Ok(true)
}

/// Seed once the session has settled on a signed-in user
///
/// Errors are logged rather than returned so a failed seed never blocks startup.
pub async fn seed_on_sign_in(store: &impl RemoteStore, session: &Session) -> bool {
    let mut state = session.subscribe();
    let signed_in = match state.wait_for(|state| !state.is_loading).await {
        Ok(state) => state.user.is_some(),
        Err(_) => false,
    };
    if !signed_in {
        return false;
    }

    match seed_initial_data(store, session).await {
        Ok(seeded) => seeded,
        Err(e) => {
            error!("Error seeding data: {}", e);
            false
        }
    }
}

fn starter_posts(user: &User) -> Vec<Post> {
    let mut rng = rand::thread_rng();
    POSTS
        .iter()
        .map(|(subreddit, title, content)| {
            let mut post = Post::new(PostDraft::text(title, subreddit, content), user);
            post.upvotes = rng.gen_range(10..110);
            post.downvotes = rng.gen_range(0..10);
            post.created_at = Utc::now() - Duration::seconds(rng.gen_range(0..86_400));
            post
        })
        .collect()
}
