use crate::configuration::JwtSecret;
use crate::user::model::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	/// [RFC7519, Section 4.1.2](https://www.rfc-editor.org/rfc/rfc7519.html#section-4.1.2)
	sub: String,
}

impl Claims {
	pub fn new(user_id: UserId) -> Self {
		Self {
			sub: user_id.to_string(),
		}
	}

	pub fn user_id(&self) -> Option<UserId> {
		self.sub.parse::<i64>().ok().map(UserId::from)
	}
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Authentication failed.")]
pub struct AuthenticationFailedError;

/// Verifies the access tokens the portal hands out, and issues new ones for operators.
#[derive(Clone)]
pub struct TokenAuthority {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
}

impl TokenAuthority {
	const ALGORITHM: Algorithm = Algorithm::HS512;

	pub fn new(secret: &JwtSecret) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret.expose().as_bytes()),
			decoding_key: DecodingKey::from_secret(secret.expose().as_bytes()),
		}
	}

	pub fn issue(&self, user_id: UserId) -> Result<String, jsonwebtoken::errors::Error> {
		jsonwebtoken::encode(&Header::new(Self::ALGORITHM), &Claims::new(user_id), &self.encoding_key)
	}

	pub fn verify(&self, token: &str) -> Result<UserId, AuthenticationFailedError> {
		let mut validation = Validation::new(Self::ALGORITHM);
		validation.validate_exp = false;
		validation.required_spec_claims.clear();

		let token = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation).map_err(|error| {
			debug!(%error, "Could not decode token.");
			AuthenticationFailedError
		})?;

		token.claims.user_id().ok_or_else(|| {
			debug!(subject = %token.claims.sub, "Token subject is not a user id.");
			AuthenticationFailedError
		})
	}
}
