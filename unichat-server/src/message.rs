use serde::de::DeserializeOwned;
use std::fmt::Debug;

pub mod chat_request;
pub mod outgoing;

pub type WebSocketMessage = axum::extract::ws::Message;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
	#[error("Failed to deserialize frame with error: {error}, frame was: {json}")]
	DeserializationFailed { error: String, json: String },
	#[error("Frame has an unsupported message type. Frame was: {0:?}")]
	WrongMessageType(WebSocketMessage),
}

fn deserialize_message_from_str<Message: DeserializeOwned>(json: &str) -> Result<Message, MessageError> {
	serde_json::from_str(json).map_err(|error| MessageError::DeserializationFailed {
		error: error.to_string(),
		json: json.to_owned(),
	})
}

fn deserialize_message_from_websocket_message<Message: DeserializeOwned>(
	websocket_message: &WebSocketMessage,
) -> Result<Message, MessageError> {
	match websocket_message {
		WebSocketMessage::Text(json) => deserialize_message_from_str(json.as_str()),
		_ => Err(MessageError::WrongMessageType(websocket_message.clone())),
	}
}
