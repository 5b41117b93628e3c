use crate::message::{MessageError, WebSocketMessage, deserialize_message_from_websocket_message};
use crate::user::model::UserId;
use serde::{Deserialize, Serialize};

/// The only frame a client sends: a message addressed to another user.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
	pub message: String,
	#[serde(deserialize_with = "user_id_deserializer::deserialize")]
	pub to_user: UserId,
}

impl TryFrom<&WebSocketMessage> for ChatRequest {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, Self::Error> {
		deserialize_message_from_websocket_message(websocket_message)
	}
}

#[cfg(test)]
impl From<&ChatRequest> for WebSocketMessage {
	fn from(request: &ChatRequest) -> Self {
		let json = serde_json::to_string(request).expect("Failed to serialize chat request to JSON.");
		WebSocketMessage::Text(json.into())
	}
}

/// Web clients send the recipient either as a JSON number or as a numeric string.
mod user_id_deserializer {
	use crate::user::model::UserId;
	use serde::de::{Error, Unexpected, Visitor};
	use serde::Deserializer;
	use std::fmt::Formatter;

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UserId, D::Error> {
		deserializer.deserialize_any(UserIdVisitor)
	}

	struct UserIdVisitor;

	impl Visitor<'_> for UserIdVisitor {
		type Value = UserId;

		fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
			formatter.write_str("a user id as integer or numeric string")
		}

		fn visit_i64<E: Error>(self, value: i64) -> Result<Self::Value, E> {
			Ok(UserId::from(value))
		}

		fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
			i64::try_from(value)
				.map(UserId::from)
				.map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
		}

		fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
			value
				.trim()
				.parse::<i64>()
				.map(UserId::from)
				.map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
		}
	}
}
