//! Input checks done by the front end before anything reaches an accessor.

use crate::{
    post::{PostDraft, PostType},
    subreddit::{Subreddit, SubredditDraft},
};

pub const NAME_MAX: usize = 21;
pub const DISPLAY_NAME_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("A title is required")]
    MissingTitle,

    #[error("Choose a community to post in")]
    MissingCommunity,

    #[error("Link posts need a URL")]
    MissingUrl,

    #[error("Image posts need an image URL")]
    MissingImageUrl,

    #[error("Community name and display name are required")]
    MissingName,

    #[error("Community name can only contain letters, numbers, and underscores")]
    InvalidName,

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Community r/{0} already exists")]
    DuplicateName(String),

    #[error("Community r/{0} does not exist")]
    UnknownCommunity(String),
}

/// `[A-Za-z0-9_]+`
pub fn is_valid_community_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub url: String,
    pub image_url: String,
    pub subreddit: String,
    pub post_type: PostType,
}

impl PostForm {
    /// Keeps only the field that matches the post type; `listed` is the
    /// communities the user can pick from
    pub fn into_draft(self, listed: &[Subreddit]) -> Result<PostDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let subreddit = self.subreddit.trim();
        if subreddit.is_empty() {
            return Err(ValidationError::MissingCommunity);
        }
        if !listed.iter().any(|s| s.name == subreddit) {
            return Err(ValidationError::UnknownCommunity(subreddit.to_string()));
        }

        let mut draft = PostDraft {
            title: title.to_string(),
            subreddit: subreddit.to_string(),
            post_type: self.post_type,
            ..Default::default()
        };
        match self.post_type {
            PostType::Text => draft.content = Some(self.content.trim().to_string()),
            PostType::Link => draft.url = Some(required(&self.url, ValidationError::MissingUrl)?),
            PostType::Image => {
                draft.image_url = Some(required(&self.image_url, ValidationError::MissingImageUrl)?)
            }
        }
        Ok(draft)
    }
}

fn required(value: &str, error: ValidationError) -> Result<String, ValidationError> {
    match value.trim() {
        "" => Err(error),
        value => Ok(value.to_string()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommunityForm {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

impl CommunityForm {
    /// `existing` is the currently listed communities; names are compared lowercased
    pub fn into_draft(self, existing: &[Subreddit]) -> Result<SubredditDraft, ValidationError> {
        let display_name = self.display_name.trim();
        if self.name.trim().is_empty() || display_name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let name = self.name.as_str();
        if !is_valid_community_name(name) {
            return Err(ValidationError::InvalidName);
        }
        check_length("Community name", name, NAME_MAX)?;
        check_length("Display name", display_name, DISPLAY_NAME_MAX)?;
        check_length("Description", &self.description, DESCRIPTION_MAX)?;

        let name = name.to_lowercase();
        if existing.iter().any(|s| s.name.to_lowercase() == name) {
            return Err(ValidationError::DuplicateName(name));
        }

        let description = self.description.trim();
        Ok(SubredditDraft {
            name,
            display_name: display_name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;

    fn community(name: &str, display_name: &str) -> CommunityForm {
        CommunityForm {
            name: name.to_string(),
            display_name: display_name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn community_names_are_word_characters_only() {
        assert!(is_valid_community_name("rust_lang2"));
        for bad in ["", "has space", "dash-ed", "dot.ted", "émoji", "r/rust"] {
            assert!(!is_valid_community_name(bad), "{bad:?} accepted");
        }
    }

    #[test]
    fn community_form_lowercases_and_trims() {
        let mut form = community("Programming", " Programming ");
        form.description = "  ".to_string();
        let draft = form.into_draft(&[]).unwrap();

        assert_eq!(draft.name, "programming");
        assert_eq!(draft.display_name, "Programming");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn community_form_rejects_bad_input() {
        assert_eq!(
            community("", "Name").into_draft(&[]).unwrap_err(),
            ValidationError::MissingName
        );
        assert_eq!(
            community("no spaces", "Name").into_draft(&[]).unwrap_err(),
            ValidationError::InvalidName
        );
        assert_eq!(
            community(" programming ", "Programming").into_draft(&[]).unwrap_err(),
            ValidationError::InvalidName
        );
        assert_eq!(
            community(&"a".repeat(22), "Name").into_draft(&[]).unwrap_err(),
            ValidationError::TooLong { field: "Community name", max: NAME_MAX }
        );
    }

    #[test]
    fn community_form_rejects_listed_names() {
        let user = User::new("u1", None);
        let existing = vec![Subreddit::new(SubredditDraft::new("rust", "Rust"), &user)];

        assert_eq!(
            community("Rust", "Rust again").into_draft(&existing).unwrap_err(),
            ValidationError::DuplicateName("rust".to_string())
        );
    }

    fn listed(names: &[&str]) -> Vec<Subreddit> {
        let user = User::new("u1", None);
        names
            .iter()
            .map(|name| Subreddit::new(SubredditDraft::new(name, name), &user))
            .collect()
    }

    #[test]
    fn post_form_keeps_fields_for_its_type() {
        let form = PostForm {
            title: "  Look  ".to_string(),
            content: "ignored".to_string(),
            url: "https://example.com".to_string(),
            subreddit: "technology".to_string(),
            post_type: PostType::Link,
            ..Default::default()
        };
        let draft = form.into_draft(&listed(&["technology"])).unwrap();

        assert_eq!(draft.title, "Look");
        assert_eq!(draft.url.as_deref(), Some("https://example.com"));
        assert_eq!(draft.content, None);
    }

    #[test]
    fn post_form_requires_title_community_and_media() {
        let base = PostForm {
            title: "Title".to_string(),
            subreddit: "general".to_string(),
            ..Default::default()
        };
        let communities = listed(&["general"]);
        assert!(base.clone().into_draft(&communities).is_ok());

        let untitled = PostForm { title: " ".to_string(), ..base.clone() };
        assert_eq!(untitled.into_draft(&communities).unwrap_err(), ValidationError::MissingTitle);

        let homeless = PostForm { subreddit: String::new(), ..base.clone() };
        assert_eq!(homeless.into_draft(&communities).unwrap_err(), ValidationError::MissingCommunity);

        let image = PostForm { post_type: PostType::Image, ..base };
        assert_eq!(image.into_draft(&communities).unwrap_err(), ValidationError::MissingImageUrl);
    }

    #[test]
    fn post_form_only_targets_listed_communities() {
        let form = PostForm {
            title: "Hello".to_string(),
            subreddit: "nowhere".to_string(),
            ..Default::default()
        };
        assert_eq!(
            form.into_draft(&listed(&["general", "funny"])).unwrap_err(),
            ValidationError::UnknownCommunity("nowhere".to_string())
        );
    }
}
