use std::future::{ready, Ready};
use std::time::Duration;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Access-token payload: the authenticated user's name and id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub id: String,
    pub exp: usize,
}

/// Signs and verifies HS256 access tokens. Registered as app data.
#[derive(Clone)]
pub struct TokenManager {
    secret: String,
    access_token_age: Duration,
}

impl TokenManager {
    pub fn new(secret: impl Into<String>, access_token_age: Duration) -> Self {
        Self { secret: secret.into(), access_token_age }
    }

    /// Tokens are normally issued by the authentication service sharing the
    /// secret; this is used by tests and local tooling.
    pub fn create_access_token(&self, username: &str, id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = chrono::Utc::now().timestamp().max(0) as usize + self.access_token_age.as_secs() as usize;
        let claims = Claims { username: username.to_owned(), id: id.to_owned(), exp };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
    }

    /// Validate a JWT and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)?;
        Ok(data.claims)
    }
}

/// Extractor yielding validated `Claims`.
pub struct Auth(pub Claims);

impl Auth {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl FromRequest for Auth {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        let Some(tokens) = req.app_data::<web::Data<TokenManager>>() else {
            tracing::error!("TokenManager missing from app data");
            return ready(Err(ApiError::Internal));
        };
        // Delegate to BearerAuth to parse the header.
        match BearerAuth::from_request(req, pl).into_inner() {
            Ok(bearer) => match tokens.verify(bearer.token()) {
                Ok(claims) => ready(Ok(Auth(claims))),
                Err(_) => ready(Err(ApiError::Unauthenticated("invalid access token".into()))),
            },
            Err(_) => ready(Err(ApiError::Unauthenticated("missing authentication".into()))),
        }
    }
}
