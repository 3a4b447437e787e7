//! Authentication against the Users table.
//!
//! Credentials live in Airtable: one record per user with an Argon2id
//! password hash. Successful logins mint short-lived HS256 access tokens.
//! User records are cached briefly so token verification doesn't hit
//! Airtable on every request.

use std::time::Duration;

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::airtable::{AirtableClient, AirtableError, escape_formula_value};
use crate::config::AuthConfig;
use crate::models::{UserFields, UserProfile};

/// How long resolved user records stay cached.
const USER_CACHE_TTL: Duration = Duration::from_secs(60);

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No user record with that email.
    #[error("User not found")]
    UserNotFound,

    /// User record exists but is marked inactive.
    #[error("User is inactive")]
    UserInactive,

    /// Token failed signature or claim validation.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// Stored password hash could not be parsed.
    #[error("Corrupt password hash for user")]
    CorruptHash,

    /// Airtable lookup failed.
    #[error("Airtable error: {0}")]
    Airtable(#[from] AirtableError),

    /// Token encoding failed.
    #[error("Token encoding error: {0}")]
    Encoding(String),
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User record ID.
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: String,
    /// Unique token ID.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The profile this token represents.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.sub.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedUser {
    record_id: String,
    fields: UserFields,
}

/// Issues and verifies access tokens backed by the Users table.
#[derive(Clone)]
pub struct AuthService {
    airtable: AirtableClient,
    users_table: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    user_cache: Cache<String, CachedUser>,
}

impl AuthService {
    /// Create the service from auth configuration and a shared Airtable client.
    #[must_use]
    pub fn new(config: &AuthConfig, airtable: AirtableClient, users_table: String) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        Self {
            airtable,
            users_table,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl: config.token_ttl,
            user_cache: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(USER_CACHE_TTL)
                .build(),
        }
    }

    /// Access token lifetime in seconds, for the login response.
    #[must_use]
    pub const fn token_ttl_secs(&self) -> u64 {
        self.token_ttl.as_secs()
    }

    async fn find_user(&self, email: &str) -> Result<CachedUser, AuthError> {
        let key = email.trim().to_lowercase();
        if let Some(cached) = self.user_cache.get(&key).await {
            return Ok(cached);
        }

        let formula = format!("LOWER({{Email}}) = '{}'", escape_formula_value(&key));
        let record = self
            .airtable
            .find_first(&self.users_table, &formula)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let fields: UserFields = record
            .fields_as()
            .map_err(AuthError::Airtable)?;
        let user = CachedUser {
            record_id: record.id,
            fields,
        };
        self.user_cache.insert(key, user.clone()).await;
        Ok(user)
    }

    /// Verify credentials and mint an access token.
    ///
    /// Argon2 verification runs on a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` on a bad password, `UserNotFound` or
    /// `UserInactive` for the corresponding account states.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self.find_user(email).await?;

        // Airtable omits unchecked checkboxes, so a deactivated user
        // arrives with no Active key at all. Only an explicit true passes.
        if user.fields.active != Some(true) {
            return Err(AuthError::UserInactive);
        }

        let hash = user
            .fields
            .password_hash
            .clone()
            .ok_or(AuthError::InvalidCredentials)?;
        let password = password.to_string();

        let verified = tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash).map_err(|_| AuthError::CorruptHash)?;
            Ok::<bool, AuthError>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
            )
        })
        .await
        .map_err(|e| AuthError::Encoding(e.to_string()))??;

        if !verified {
            tracing::warn!(email = %email.trim().to_lowercase(), "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_token(&user)
    }

    fn issue_token(&self, user: &CachedUser) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        #[allow(clippy::cast_possible_wrap)] // TTL is minutes-scale
        let exp = now + self.token_ttl.as_secs() as i64;

        let claims = Claims {
            sub: user.record_id.clone(),
            email: user
                .fields
                .email
                .clone()
                .unwrap_or_default()
                .to_lowercase(),
            name: user.fields.name.clone(),
            role: user
                .fields
                .role
                .clone()
                .unwrap_or_else(|| "staff".to_string()),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` for expired tokens and `InvalidToken` for
    /// anything else that fails validation.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("users_table", &self.users_table)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::AirtableConfig;
    use argon2::PasswordHasher;
    use password_hash::{SaltString, rand_core::OsRng};
    use secrecy::SecretString;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::from("kX9$mP2@vL5#nQ8&rT1*uW4^zC7!aB3d"),
            token_ttl: Duration::from_secs(3600),
        }
    }

    fn service_for(server: &MockServer) -> AuthService {
        let airtable_config = AirtableConfig {
            api_url: server.uri(),
            api_key: SecretString::from("patTest0123456789"),
            base_id: "appTESTTESTTESTTE".to_string(),
            channel_tables: std::collections::HashMap::new(),
            users_table: "Users".to_string(),
            history_table: "Scan History".to_string(),
            settings_table: "Settings".to_string(),
        };
        let airtable =
            AirtableClient::new(&airtable_config, Duration::from_secs(5)).unwrap();
        AuthService::new(&test_auth_config(), airtable, "Users".to_string())
    }

    fn hash_password(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    async fn mount_user(server: &MockServer, fields: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/appTESTTESTTESTTE/Users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [{ "id": "recUSER0000000001", "fields": fields }]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_and_verify_round_trip() {
        let server = MockServer::start().await;
        mount_user(
            &server,
            serde_json::json!({
                "Email": "ops@example.com",
                "Name": "Ops One",
                "Password Hash": hash_password("correct horse"),
                "Role": "admin",
                "Active": true
            }),
        )
        .await;

        let service = service_for(&server);
        let token = service.login("Ops@Example.com", "correct horse").await.unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "recUSER0000000001");
        assert_eq!(claims.email, "ops@example.com");
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let server = MockServer::start().await;
        mount_user(
            &server,
            serde_json::json!({
                "Email": "ops@example.com",
                "Password Hash": hash_password("correct horse"),
                "Active": true
            }),
        )
        .await;

        let service = service_for(&server);
        let err = service.login("ops@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_inactive_user() {
        let server = MockServer::start().await;
        mount_user(
            &server,
            serde_json::json!({
                "Email": "ops@example.com",
                "Password Hash": hash_password("correct horse"),
                "Active": false
            }),
        )
        .await;

        let service = service_for(&server);
        let err = service
            .login("ops@example.com", "correct horse")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserInactive));
    }

    #[tokio::test]
    async fn test_login_unchecked_active_box_is_inactive() {
        let server = MockServer::start().await;
        // Airtable drops unchecked checkboxes from the fields map entirely
        mount_user(
            &server,
            serde_json::json!({
                "Email": "ops@example.com",
                "Password Hash": hash_password("correct horse")
            }),
        )
        .await;

        let service = service_for(&server);
        let err = service
            .login("ops@example.com", "correct horse")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserInactive));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appTESTTESTTESTTE/Users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": []
            })))
            .mount(&server)
            .await;

        let service = service_for(&server);
        let err = service.login("nobody@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_verify_garbage_token() {
        let server = MockServer::start().await;
        let service = service_for(&server);
        let err = service.verify_token("not.a.token").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_verify_token_wrong_secret() {
        let server = MockServer::start().await;
        let service = service_for(&server);

        let other = AuthConfig {
            jwt_secret: SecretString::from("different$ecret9@different$ecret"),
            token_ttl: Duration::from_secs(3600),
        };
        let airtable_config = AirtableConfig {
            api_url: server.uri(),
            api_key: SecretString::from("patTest0123456789"),
            base_id: "appTESTTESTTESTTE".to_string(),
            channel_tables: std::collections::HashMap::new(),
            users_table: "Users".to_string(),
            history_table: "Scan History".to_string(),
            settings_table: "Settings".to_string(),
        };
        let other_service = AuthService::new(
            &other,
            AirtableClient::new(&airtable_config, Duration::from_secs(5)).unwrap(),
            "Users".to_string(),
        );

        mount_user(
            &server,
            serde_json::json!({
                "Email": "ops@example.com",
                "Password Hash": hash_password("pw"),
                "Active": true
            }),
        )
        .await;

        let token = service.login("ops@example.com", "pw").await.unwrap();
        assert!(other_service.verify_token(&token).is_err());
    }
}
