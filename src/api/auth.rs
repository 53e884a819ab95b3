use serde::Serialize;

use super::ApiClient;
use crate::error::{OfficeError, Result};
use crate::types::{AuthResponse, ProfileUpdate, SuccessResponse, User};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err(OfficeError::Validation("Please fill in all required fields".into()));
        }
        if self.password != self.confirm_password {
            return Err(OfficeError::Validation("Passwords do not match".into()));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(OfficeError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody<'a> {
    token: &'a str,
    new_password: &'a str,
    confirm_password: &'a str,
}

/// Authentication endpoints. Successful logins are recorded in the client's
/// session, which every other service reads its bearer token from.
#[derive(Clone, Debug)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(OfficeError::Validation("Please enter your email and password".into()));
        }
        let response: AuthResponse = self.api.post_json(&["auth", "login"], request).await?;
        self.api
            .session()
            .begin(response.token.clone(), response.user.clone(), request.remember_me)
            .await?;
        tracing::info!(user = %response.user.id, remember = request.remember_me, "logged in");
        Ok(response)
    }

    /// Registers an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        request.validate()?;
        self.api.post_json(&["auth", "register"], request).await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.api.get(&["auth", "me"]).await
    }

    /// Saves profile changes and folds the server's copy into the session user.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let updated: User = self.api.put_json(&["auth", "profile"], update).await?;
        self.api.session().set_user(updated.clone()).await?;
        Ok(updated)
    }

    /// Local only: forgets the token and the stored user.
    pub async fn logout(&self) {
        self.api.session().clear().await;
        tracing::info!("logged out");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated().await
    }

    pub async fn stored_user(&self) -> Option<User> {
        self.api.session().user().await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<SuccessResponse> {
        self.api
            .post_json(
                &["auth", "forgot-password"],
                &serde_json::json!({ "email": email }),
            )
            .await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<SuccessResponse> {
        if new_password != confirm_password {
            return Err(OfficeError::Validation("Passwords do not match".into()));
        }
        let body = ResetPasswordBody {
            token,
            new_password,
            confirm_password,
        };
        self.api.post_json(&["auth", "reset-password"], &body).await
    }
}
