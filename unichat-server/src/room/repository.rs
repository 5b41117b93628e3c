use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::room::model::{ChatRoom, RoomId, RoomSummary};
use crate::user::model::UserId;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;


#[async_trait]
pub trait RoomRepository: Send + Sync + 'static {
	async fn get(&self, connection: &mut dyn Connection, room_id: RoomId) -> Result<Option<ChatRoom>, DatabaseError>;

	/// Finds the room of two users under either ordering of its name.
	async fn find_by_pair(
		&self,
		connection: &mut dyn Connection,
		first: UserId,
		second: UserId,
	) -> Result<Option<ChatRoom>, DatabaseError>;

	/// Returns the room of `sender` and `recipient` with its last message set to `content`,
	/// creating the room if the two never talked before.
	async fn resolve_or_create(
		&self,
		connection: &mut dyn Connection,
		sender: UserId,
		recipient: UserId,
		content: &str,
	) -> Result<ChatRoom, DatabaseError>;

	/// Adds `user_id` to the participants of `room_id` unless it already is one.
	async fn ensure_participant(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
		user_id: UserId,
	) -> Result<(), DatabaseError>;

	async fn is_participant(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
		user_id: UserId,
	) -> Result<bool, DatabaseError>;

	async fn list_participants(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
	) -> Result<Vec<UserId>, DatabaseError>;

	/// Every room `user_id` participates in, paired with the other participant.
	async fn list_for_user(
		&self,
		connection: &mut dyn Connection,
		user_id: UserId,
	) -> Result<Vec<RoomSummary>, DatabaseError>;
}

assert_obj_safe!(RoomRepository);
