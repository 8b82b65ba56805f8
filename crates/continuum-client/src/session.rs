//! Login, signup and logout.
//!
//! Forms are validated locally; an invalid form is never sent.

use std::sync::Arc;

use continuum_common::catalog::{PlayerClass, Role};
use continuum_common::models::Viewer;
use continuum_common::validation::{validate_not_blank, validate_request};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::rest::Backend;
use crate::store::{EntityKind, EntityStore};

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Character name is required"))]
    pub player_name: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// The character a new account is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupCharacter {
    New {
        name: String,
        class: PlayerClass,
        role: Role,
    },
    /// Claim a character already on the roster.
    Existing { player_id: i64 },
}

#[derive(Debug, Clone, Validate)]
pub struct SignupForm {
    pub character: SignupCharacter,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub confirm_password: String,
}

impl SignupForm {
    fn check(&self) -> Result<()> {
        validate_request(self)?;
        if let SignupCharacter::New { name, .. } = &self.character {
            validate_not_blank("Character name", name)?;
        }
        Ok(())
    }

    fn body(&self) -> Value {
        match &self.character {
            SignupCharacter::New { name, class, role } => json!({
                "new": true,
                "player_name": name.trim(),
                "password": self.password,
                "class": class.code(),
                "role": role.code(),
            }),
            SignupCharacter::Existing { player_id } => json!({
                "new": false,
                "password": self.password,
                "player_id": player_id,
            }),
        }
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    player: Option<Viewer>,
}

pub struct SessionClient {
    backend: Arc<dyn Backend>,
    store: Arc<EntityStore>,
}

impl SessionClient {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<EntityStore>) -> Self {
        Self { backend, store }
    }

    /// Log in and make the returned player the current viewer.
    pub async fn login(&self, form: &LoginForm) -> Result<Option<Viewer>> {
        validate_request(form)?;
        let body = json!({ "player_name": form.player_name.trim(), "password": form.password });
        let viewer = self.exchange(endpoints::LOGIN, body).await?;
        info!(viewer = ?viewer.as_ref().map(|v| v.id), "logged in");
        Ok(viewer)
    }

    /// Create an account. A new character also appears in the roster, so
    /// players are refreshed. The account exists once the backend accepts
    /// it; a failed roster refresh only leaves the players list stale.
    pub async fn signup(&self, form: &SignupForm) -> Result<Option<Viewer>> {
        form.check()?;
        let viewer = self.exchange(endpoints::SIGNUP, form.body()).await?;
        if let Err(e) = self.store.refresh(EntityKind::Players).await {
            warn!(error = %e, "players stale after signup");
        }
        info!(viewer = ?viewer.as_ref().map(|v| v.id), "signed up");
        Ok(viewer)
    }

    /// Clear the viewer. The backend's answer does not matter.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.get(endpoints::LOGOUT).await {
            debug!(error = %e, "logout response ignored");
        }
        self.store.set_viewer(None).await;
    }

    async fn exchange(&self, path: &str, body: Value) -> Result<Option<Viewer>> {
        let resp = self.backend.post(path, &body).await?.into_value();
        let SessionResponse { player } =
            serde_json::from_value(resp).map_err(ClientError::Json)?;
        self.store.set_viewer(player.clone()).await;
        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBackend, Reply};
    use continuum_common::error::LootError;

    fn setup() -> (Arc<MemoryBackend>, Arc<EntityStore>, SessionClient) {
        let backend = Arc::new(MemoryBackend::from_fixture(json!({})));
        let store = Arc::new(EntityStore::new(backend.clone()));
        let session = SessionClient::new(backend.clone(), store.clone());
        (backend, store, session)
    }

    fn signup(password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            character: SignupCharacter::New {
                name: "Tharlen".to_owned(),
                class: PlayerClass::Mage,
                role: Role::Dps,
            },
            password: password.to_owned(),
            confirm_password: confirm.to_owned(),
        }
    }

    #[tokio::test]
    async fn login_sets_viewer() {
        let (backend, store, session) = setup();
        backend.set_post_reply(
            endpoints::LOGIN,
            Reply::Json(json!({"player": {"id": 4, "name": "Tharlen", "permission_level": 1}})),
        );
        let form = LoginForm {
            player_name: "Tharlen".to_owned(),
            password: "hunter2".to_owned(),
        };
        session.login(&form).await.unwrap();
        assert_eq!(store.viewer().await, Some(Viewer::new(4, "Tharlen", 1)));
    }

    #[tokio::test]
    async fn business_error_leaves_viewer_unchanged() {
        let (backend, store, session) = setup();
        backend.set_post_reply(endpoints::LOGIN, Reply::Business("Wrong password".to_owned()));
        let form = LoginForm {
            player_name: "Tharlen".to_owned(),
            password: "nope".to_owned(),
        };
        let err = session.login(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Wrong password");
        assert!(store.viewer().await.is_none());
    }

    #[tokio::test]
    async fn empty_login_is_not_sent() {
        let (backend, _, session) = setup();
        let form = LoginForm {
            player_name: String::new(),
            password: String::new(),
        };
        let err = session.login(&form).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Password is required; Character name is required"
        );
        assert!(backend.posts().is_empty());
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let (backend, _, session) = setup();
        let err = session.signup(&signup("a", "b")).await.unwrap_err();
        assert!(matches!(err, ClientError::Loot(LootError::Validation { .. })));
        assert!(err.to_string().contains("Passwords must match"));
        assert!(backend.posts().is_empty());
    }

    #[tokio::test]
    async fn signup_sends_codes_and_refreshes_players() {
        let (backend, _, session) = setup();
        backend.set_post_reply(
            endpoints::SIGNUP,
            Reply::Json(json!({"player": {"id": 9, "name": "Tharlen", "permission_level": 0}})),
        );
        session.signup(&signup("pw", "pw")).await.unwrap();

        let (_, body) = &backend.posts()[0];
        assert_eq!(body["class"], "MG");
        assert_eq!(body["role"], "D");
        assert_eq!(body["new"], true);
        assert_eq!(backend.get_count(endpoints::GET_PLAYERS), 1);
    }

    #[tokio::test]
    async fn signup_succeeds_when_roster_refresh_fails() {
        let (backend, store, session) = setup();
        backend.set_post_reply(
            endpoints::SIGNUP,
            Reply::Json(json!({"player": {"id": 9, "name": "Tharlen", "permission_level": 0}})),
        );
        backend.set_reply(endpoints::GET_PLAYERS, Reply::Status(500));

        let viewer = session.signup(&signup("pw", "pw")).await.unwrap();
        assert_eq!(viewer, Some(Viewer::new(9, "Tharlen", 0)));
        assert_eq!(store.viewer().await, viewer);
        assert!(store.players().await.is_empty());
    }

    #[tokio::test]
    async fn logout_clears_viewer_even_when_backend_fails() {
        let (backend, store, session) = setup();
        store.set_viewer(Some(Viewer::new(1, "Grum", 2))).await;
        backend.set_reply(endpoints::LOGOUT, Reply::Status(500));
        session.logout().await;
        assert!(store.viewer().await.is_none());
    }
}
