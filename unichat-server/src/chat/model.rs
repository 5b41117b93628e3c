use crate::room::model::RoomId;
use crate::user::model::UserId;
use chrono::{DateTime, Utc};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(
	Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, From, Into, Display,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct MessageId(i64);

#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
	pub id: MessageId,
	pub room_id: RoomId,
	pub user_id: UserId,
	pub content: String,
	pub created_at: DateTime<Utc>,
}
