use crate::chat::model::{ChatMessage, MessageId};
use crate::message::outgoing::error_message::ErrorMessage;
use crate::message::{MessageError, WebSocketMessage, deserialize_message_from_websocket_message};
use crate::room::model::RoomId;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

pub mod error_message;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
	#[serde(rename = "send.message")]
	SendMessage(ChatBroadcast),
	#[serde(rename = "error")]
	Error(ErrorMessage),
}

/// A stored message as delivered to the participants of its room.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatBroadcast {
	pub message_id: MessageId,
	pub message_room: RoomId,
	pub message_content: String,
	/// Sender id as string, web clients compare it against their own id read from the page.
	pub message_user: String,
	pub message_created_at: String,
}

impl From<&ChatMessage> for ChatBroadcast {
	fn from(message: &ChatMessage) -> Self {
		Self {
			message_id: message.id,
			message_room: message.room_id,
			message_content: message.content.clone(),
			message_user: message.user_id.to_string(),
			message_created_at: message.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
		}
	}
}

impl From<ChatBroadcast> for OutgoingMessage {
	fn from(broadcast: ChatBroadcast) -> Self {
		Self::SendMessage(broadcast)
	}
}

impl From<ErrorMessage> for OutgoingMessage {
	fn from(error: ErrorMessage) -> Self {
		Self::Error(error)
	}
}

impl From<&OutgoingMessage> for WebSocketMessage {
	fn from(message: &OutgoingMessage) -> Self {
		let json = serde_json::to_string(message).expect("Failed to serialize outgoing message to JSON.");
		WebSocketMessage::Text(json.into())
	}
}

impl TryFrom<&WebSocketMessage> for OutgoingMessage {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, MessageError> {
		deserialize_message_from_websocket_message(websocket_message)
	}
}
