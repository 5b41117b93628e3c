use crate::user::model::{User, UserId};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(
	Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, From, Into, Display,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RoomId(i64);

/// The one-to-one conversation between two users, created lazily on their first message.
#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct ChatRoom {
	pub id: RoomId,
	pub name: String,
	pub last_message: Option<String>,
	pub last_sent_user_id: Option<UserId>,
}

/// A room of some user together with the other participant of that room.
#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct RoomSummary {
	pub room_id: RoomId,
	pub room_name: String,
	pub room_last_message: Option<String>,
	pub room_last_sent_user_id: Option<UserId>,
	#[sqlx(flatten)]
	pub peer: User,
}
