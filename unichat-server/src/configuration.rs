use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::fs::read_to_string;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Configuration {
	pub address: SocketAddr,
	pub log_filters: String,
	pub database_url: String,
	pub jwt_secret: JwtSecret,
	#[serde(with = "humantime_serde")]
	pub heartbeat_interval: Duration,
	pub missed_heartbeat_limit: u8,
	/// Maximum number of characters in a chat message.
	#[serde(default = "default_message_length_limit")]
	pub message_length_limit: usize,
	/// Path under which avatar files are served, prepended to the stored avatar path.
	#[serde(default = "default_media_prefix")]
	pub media_prefix: String,
}

fn default_message_length_limit() -> usize {
	4096
}

fn default_media_prefix() -> String {
	"/media/".to_owned()
}

/// Shared secret of the portal's token issuer. Never printed.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct JwtSecret(String);

impl JwtSecret {
	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl From<&str> for JwtSecret {
	fn from(secret: &str) -> Self {
		Self(secret.to_owned())
	}
}

impl Debug for JwtSecret {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		formatter.write_str("JwtSecret(<redacted>)")
	}
}

impl Configuration {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Configuration, ConfigurationError> {
		let text = read_to_string(path)?;

		Ok(Configuration::try_from(text.as_str())?)
	}
}

impl TryFrom<&str> for Configuration {
	type Error = toml::de::Error;

	fn try_from(text: &str) -> Result<Self, Self::Error> {
		toml::from_str(text)
	}
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
	#[error("Failed to deserialize with error: {0}")]
	DeserializationError(#[from] toml::de::Error),
	#[error("IO operation failed: {0}")]
	IoError(#[from] std::io::Error),
}

#[cfg(test)]
pub(crate) mod test {
	use super::*;
	use std::str::FromStr;

	pub fn test_configuration() -> Configuration {
		Configuration {
			address: SocketAddr::from(([127, 0, 0, 1], 0)),
			log_filters: "debug".to_owned(),
			database_url: "sqlite::memory:".to_owned(),
			jwt_secret: JwtSecret::from("test-secret"),
			heartbeat_interval: Duration::from_secs(60),
			missed_heartbeat_limit: 3,
			message_length_limit: 4096,
			media_prefix: "/media/".to_owned(),
		}
	}

	#[test]
	fn should_deserialize_configuration() {
		const TEST_FILE_PATH: &str = "test/files/test-configuration.toml";

		let Configuration {
			address,
			log_filters,
			database_url,
			jwt_secret,
			heartbeat_interval,
			missed_heartbeat_limit,
			message_length_limit,
			media_prefix,
		} = Configuration::from_file(TEST_FILE_PATH).expect("Failed to load test configuration");

		assert_eq!(SocketAddr::from_str("127.0.0.1:8000").expect("Invalid address"), address);
		assert_eq!("info,sqlx=warn", log_filters);
		assert_eq!("sqlite://unichat.sqlite3", database_url);
		assert_eq!("not-a-real-secret", jwt_secret.expose());
		assert_eq!(Duration::from_secs(2), heartbeat_interval);
		assert_eq!(3, missed_heartbeat_limit);
		assert_eq!(1000, message_length_limit);
		assert_eq!("/uploads/", media_prefix);
	}

	#[test]
	fn should_apply_defaults_for_optional_fields() {
		let configuration = Configuration::try_from(
			r#"
			address = "0.0.0.0:8080"
			log_filters = "warn"
			database_url = "sqlite::memory:"
			jwt_secret = "secret"
			heartbeat_interval = "30s"
			missed_heartbeat_limit = 2
			"#,
		)
		.expect("Failed to parse configuration");

		assert_eq!(4096, configuration.message_length_limit);
		assert_eq!("/media/", configuration.media_prefix);
	}

	#[test]
	fn should_not_print_jwt_secret() {
		let printed = format!("{:?}", test_configuration());

		assert!(!printed.contains("test-secret"));
		assert!(printed.contains("JwtSecret(<redacted>)"));
	}
}
