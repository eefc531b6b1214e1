//! Email/password identity over the Firebase Identity Toolkit REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use super::{IdentityError, IdentityProvider, Session};
use crate::models::user::User;

const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    id_token: String,
    refresh_token: String,
    /// Seconds, sent as a string.
    expires_in: String,
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

impl PasswordResponse {
    fn into_session(self) -> Session {
        Session {
            expires_in: self.expires_in.parse().unwrap_or(0),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            user: User {
                uid: self.local_id,
                email: self.email,
                display_name: self.display_name.filter(|n| !n.is_empty()),
                email_verified: false,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl From<AccountInfo> for User {
    fn from(info: AccountInfo) -> Self {
        User {
            uid: info.local_id,
            email: info.email,
            display_name: info.display_name.filter(|n| !n.is_empty()),
            email_verified: info.email_verified,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolkitError {
    error: ToolkitErrorBody,
}

#[derive(Debug, Deserialize)]
struct ToolkitErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct FirebaseIdentity {
    client: Client,
    api_key: Option<String>,
}

impl FirebaseIdentity {
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One POST to `accounts:{method}`. Authentication failures are not retried.
    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(IdentityError::MissingConfiguration)?;

        let response = self
            .client
            .post(format!("{IDENTITY_TOOLKIT_BASE}/accounts:{method}"))
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Identity Toolkit {method} returned {status}");
            return Err(rejection(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))
    }
}

/// 4xx with a provider message is a rejection; anything else is a transport failure.
fn rejection(status: u16, body: &str) -> IdentityError {
    match serde_json::from_str::<ToolkitError>(body) {
        Ok(e) if (400..500).contains(&status) => IdentityError::Rejected(e.error.message),
        Ok(e) => IdentityError::RequestFailed(e.error.message),
        Err(_) => IdentityError::RequestFailed(format!("status {status}")),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response: PasswordResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let session = response.into_session();
        info!(uid = %session.user.uid, "User signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response: PasswordResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let session = response.into_session();
        info!(uid = %session.user.uid, "User signed up");
        Ok(session)
    }

    async fn sign_out(&self, id_token: &str) -> Result<(), IdentityError> {
        // id tokens are bearer credentials; the client forgets them and they expire
        let user = self.current_user(id_token).await?;
        info!(uid = %user.uid, "User signed out");
        Ok(())
    }

    async fn current_user(&self, id_token: &str) -> Result<User, IdentityError> {
        let response: LookupResponse = self.call("lookup", &LookupRequest { id_token }).await?;
        response
            .users
            .into_iter()
            .next()
            .map(User::from)
            .ok_or_else(|| IdentityError::Rejected("USER_NOT_FOUND".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_request_shape() {
        let body = PasswordRequest {
            email: "a@b.c",
            password: "pw",
            return_secure_token: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "email": "a@b.c", "password": "pw", "returnSecureToken": true })
        );
    }

    #[test]
    fn test_sign_in_response_to_session() {
        let response: PasswordResponse = serde_json::from_str(
            r#"{"kind":"identitytoolkit#VerifyPasswordResponse","localId":"u1","email":"a@b.c",
               "displayName":"","idToken":"tok","registered":true,"refreshToken":"ref","expiresIn":"3600"}"#,
        )
        .unwrap();
        let session = response.into_session();
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.id_token, "tok");
        assert_eq!(session.user.uid, "u1");
        assert_eq!(session.user.display_name, None);
    }

    #[test]
    fn test_lookup_response_to_user() {
        let response: LookupResponse = serde_json::from_str(
            r#"{"users":[{"localId":"u1","email":"a@b.c","emailVerified":true,"displayName":"Ada"}]}"#,
        )
        .unwrap();
        let user = User::from(response.users.into_iter().next().unwrap());
        assert!(user.email_verified);
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_provider_message_surfaced_verbatim() {
        let body = r#"{"error":{"code":400,"message":"INVALID_LOGIN_CREDENTIALS","errors":[]}}"#;
        assert_eq!(
            rejection(400, body),
            IdentityError::Rejected("INVALID_LOGIN_CREDENTIALS".to_string())
        );
        assert_eq!(
            rejection(503, "oops"),
            IdentityError::RequestFailed("status 503".to_string())
        );
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let identity = FirebaseIdentity::new(None).unwrap();
        assert!(!identity.is_configured());
        assert_eq!(
            identity.sign_in("a@b.c", "pw").await,
            Err(IdentityError::MissingConfiguration)
        );
        assert_eq!(
            identity.sign_in_with_federated().await,
            Err(IdentityError::Unsupported("Federated sign-in"))
        );
    }
}
