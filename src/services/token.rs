use crate::configuration::AuthSettings;
use actix_web::http::header::{HeaderValue, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const TOKEN_TYPE: &str = "bearer";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid client credentials")]
    InvalidCredentials,
    #[error("Not authenticated")]
    MissingToken,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Could not issue token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if self.status_code() == StatusCode::UNAUTHORIZED {
            response.insert_header((WWW_AUTHENTICATE, HeaderValue::from_static("Bearer")));
        }
        response.json(json!({ "detail": self.to_string() }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    /// Tokens minted elsewhere may carry only `sub` and `exp`
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: &str, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
}

/// Issues and verifies HS256 tokens for the configured client.
pub struct TokenService {
    client_id: String,
    client_secret: String,
    ttl: chrono::Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(settings: &AuthSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.sub = Some(settings.client_id.clone());
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            ttl: chrono::Duration::minutes(settings.token_ttl_minutes),
            encoding_key: EncodingKey::from_secret(settings.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret_key.as_bytes()),
            validation,
        }
    }

    #[tracing::instrument(name = "Issue access token", skip(self, client_secret))]
    pub fn issue(&self, client_id: &str, client_secret: &str) -> Result<IssuedToken, AuthError> {
        if client_id != self.client_id || client_secret != self.client_secret {
            tracing::warn!("Rejected token request with invalid client credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.encode(&Claims::new(&self.client_id, self.ttl))?;

        Ok(IssuedToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(
            |err| {
                tracing::error!("Failed to sign token: {:?}", err);
                AuthError::Signing(err)
            },
        )
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                kind => {
                    tracing::debug!("Token verification failed: {:?}", kind);
                    AuthError::Invalid
                }
            })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(authorization: &str) -> Result<&str, AuthError> {
    let mut parts = authorization.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MissingToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            client_id: "newsdesk_client".to_string(),
            client_secret: "supersecret".to_string(),
            secret_key: "test-signing-key".to_string(),
            token_ttl_minutes: 30,
        }
    }

    #[test]
    fn valid_credentials_issue_a_verifiable_token() {
        let service = TokenService::new(&settings());
        let issued = service.issue("newsdesk_client", "supersecret").unwrap();

        assert!(!issued.access_token.is_empty());
        assert_eq!(issued.token_type, "bearer");

        let claims = service.verify(&issued.access_token).unwrap();
        assert_eq!(claims.sub, "newsdesk_client");
        let ttl = claims.exp - claims.iat;
        assert_eq!(ttl, 30 * 60);
    }

    #[test]
    fn invalid_credentials_are_rejected() {
        let service = TokenService::new(&settings());

        let err = service.issue("newsdesk_client", "wrong").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid client credentials");

        let err = service.issue("someone", "supersecret").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let service = TokenService::new(&settings());
        let token = service
            .encode(&Claims::new("newsdesk_client", chrono::Duration::minutes(-5)))
            .unwrap();

        let err = service.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert_eq!(err.to_string(), "Token has expired");
    }

    #[test]
    fn tokens_with_only_sub_and_exp_are_accepted() {
        let service = TokenService::new(&settings());
        let key = EncodingKey::from_secret(b"test-signing-key");
        let mint = |minutes: i64| {
            let exp = (chrono::Utc::now() + chrono::Duration::minutes(minutes)).timestamp();
            jsonwebtoken::encode(
                &Header::new(Algorithm::HS256),
                &json!({"sub": "newsdesk_client", "exp": exp}),
                &key,
            )
            .unwrap()
        };

        let claims = service.verify(&mint(15)).unwrap();
        assert_eq!(claims.sub, "newsdesk_client");
        assert_eq!(claims.iat, 0);

        let err = service.verify(&mint(-15)).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert_eq!(err.to_string(), "Token has expired");
    }

    #[test]
    fn malformed_token_is_invalid() {
        let service = TokenService::new(&settings());
        let err = service.verify("this.is.not.a.valid.token").unwrap_err();
        assert!(matches!(err, AuthError::Invalid));
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[test]
    fn token_signed_with_another_key_is_invalid() {
        let service = TokenService::new(&settings());
        let mut other = settings();
        other.secret_key = "another-key".to_string();
        let foreign = TokenService::new(&other)
            .issue("newsdesk_client", "supersecret")
            .unwrap();

        assert!(matches!(
            service.verify(&foreign.access_token),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn token_for_another_subject_is_invalid() {
        let service = TokenService::new(&settings());
        let token = service
            .encode(&Claims::new("intruder", chrono::Duration::minutes(5)))
            .unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::Invalid)));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert_eq!(extract_bearer_token("bearer abc").unwrap(), "abc");
        assert!(matches!(
            extract_bearer_token("Basic dXNlcjpwYXNz"),
            Err(AuthError::MissingToken)
        ));
        assert!(extract_bearer_token("Bearer").is_err());
        assert!(extract_bearer_token("Bearer a b").is_err());
    }

    #[test]
    fn auth_errors_render_as_401_with_detail() {
        let resp = AuthError::Expired.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}
