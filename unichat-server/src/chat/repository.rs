use crate::chat::model::ChatMessage;
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::room::model::RoomId;
use crate::user::model::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use static_assertions::assert_obj_safe;


#[async_trait]
pub trait ChatRepository: Send + Sync + 'static {
	async fn create(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
		user_id: UserId,
		content: &str,
		created_at: DateTime<Utc>,
	) -> Result<ChatMessage, DatabaseError>;

	/// Messages of a room, oldest first.
	async fn list_by_room(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
	) -> Result<Vec<ChatMessage>, DatabaseError>;

	/// Messages of the room between two users, oldest first. Empty if they never talked.
	async fn list_by_pair(
		&self,
		connection: &mut dyn Connection,
		first: UserId,
		second: UserId,
	) -> Result<Vec<ChatMessage>, DatabaseError>;
}

assert_obj_safe!(ChatRepository);
