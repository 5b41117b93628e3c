use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Sent only to the connection whose frame caused the error. The connection stays open.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, TypedBuilder)]
pub struct ErrorMessage {
	pub error: ErrorMessageType,
	pub message: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMessageType {
	InvalidFormat,
	InvalidContent,
	UnknownRecipient,
	InternalServerError,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn invalid_format_error_message_should_serialize() {
		let error_message = ErrorMessage::builder()
			.error(ErrorMessageType::InvalidFormat)
			.message("�".to_string())
			.build();
		let json = serde_json::to_string(&error_message).expect("Failed to serialize InvalidFormat error message to JSON");
		assert_eq!(r#"{"error":"invalid_format","message":"�"}"#, json);
	}

	#[test]
	fn invalid_content_error_message_should_serialize() {
		let error_message = ErrorMessage::builder()
			.error(ErrorMessageType::InvalidContent)
			.message("Message was empty or whitespace-only.".to_string())
			.build();
		let json =
			serde_json::to_string(&error_message).expect("Failed to serialize InvalidContent error message to JSON");
		assert_eq!(
			r#"{"error":"invalid_content","message":"Message was empty or whitespace-only."}"#,
			json
		);
	}

	#[test]
	fn internal_server_error_message_should_deserialize() {
		let json = r#"{"error":"internal_server_error","message":"Database unavailable."}"#;

		let error_message: ErrorMessage =
			serde_json::from_str(json).expect("Failed to deserialize InternalServerError error message from JSON");

		assert_eq!(
			ErrorMessage::builder()
				.error(ErrorMessageType::InternalServerError)
				.message("Database unavailable.".to_string())
				.build(),
			error_message
		);
	}
}
