use std::future::Future;

use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{Error, Result};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: &str, email: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            email: email.map(str::to_string),
        }
    }

    /// The local part of the email, or `anonymous`
    pub fn username(&self) -> String {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("anonymous")
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }
}

/// Source of the signed-in user
pub trait AuthProvider: Send + Sync {
    fn me(&self) -> impl Future<Output = Option<User>> + Send;
}

/// Fail with [`Error::NotAuthenticated`] unless someone is signed in
pub async fn require_user(auth: &impl AuthProvider) -> Result<User> {
    auth.me().await.ok_or(Error::NotAuthenticated)
}

/// Auth state holder; subscribers see every transition
#[derive(Debug)]
pub struct Session {
    state: watch::Sender<AuthState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { state }
    }

    pub fn signed_in(user: User) -> Self {
        let session = Self::new();
        session.login(user);
        session
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn login(&self, user: User) {
        info!("Signed in as u/{}", user.username());
        self.state.send_replace(AuthState {
            user: Some(user),
            is_loading: false,
        });
    }

    pub fn logout(&self) {
        self.state.send_replace(AuthState {
            user: None,
            is_loading: false,
        });
    }

    /// Finish loading without a user
    pub fn resolve_anonymous(&self) {
        self.logout();
    }
}

impl AuthProvider for Session {
    async fn me(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_comes_from_email() {
        assert_eq!(User::new("1", Some("bob@example.com")).username(), "bob");
        assert_eq!(User::new("1", Some("@example.com")).username(), "anonymous");
        assert_eq!(User::new("1", None).username(), "anonymous");
    }

    #[tokio::test]
    async fn subscribers_observe_login_and_logout() {
        let session = Session::new();
        let mut state = session.subscribe();
        assert!(state.borrow().is_loading);

        session.login(User::new("u1", None));
        state.changed().await.unwrap();
        assert_eq!(state.borrow().user.as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(session.me().await.unwrap().id, "u1");

        session.logout();
        state.changed().await.unwrap();
        assert!(state.borrow().user.is_none());
        assert!(!state.borrow().is_loading);
    }

    #[tokio::test]
    async fn require_user_rejects_anonymous() {
        let session = Session::new();
        session.resolve_anonymous();
        assert!(matches!(
            require_user(&session).await,
            Err(Error::NotAuthenticated)
        ));
    }
}
