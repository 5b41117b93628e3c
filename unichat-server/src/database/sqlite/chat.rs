use super::{SqliteRepository, sqlite_connection};
use crate::chat::model::ChatMessage;
use crate::chat::repository::ChatRepository;
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::room::model::RoomId;
use crate::room::room_name_candidates;
use crate::user::model::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

#[async_trait]
impl ChatRepository for SqliteRepository {
	async fn create(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
		user_id: UserId,
		content: &str,
		created_at: DateTime<Utc>,
	) -> Result<ChatMessage, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"INSERT INTO message(room_id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4)
			RETURNING id, room_id, user_id, content, created_at",
		)
		.bind(room_id)
		.bind(user_id)
		.bind(content)
		.bind(created_at)
		.fetch_one(connection)
		.await
		.map_err(Into::into)
	}

	async fn list_by_room(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
	) -> Result<Vec<ChatMessage>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, room_id, user_id, content, created_at
			FROM message
			WHERE room_id = ?1
			ORDER BY created_at ASC, id ASC",
		)
		.bind(room_id)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}

	async fn list_by_pair(
		&self,
		connection: &mut dyn Connection,
		first: UserId,
		second: UserId,
	) -> Result<Vec<ChatMessage>, DatabaseError> {
		let connection = sqlite_connection(connection)?;
		let [name, reversed_name] = room_name_candidates(first, second);

		query_as(
			r"SELECT m.id, m.room_id, m.user_id, m.content, m.created_at
			FROM message m
			JOIN chat_room r ON r.id = m.room_id
			WHERE r.name IN (?1, ?2)
			ORDER BY m.created_at ASC, m.id ASC",
		)
		.bind(name)
		.bind(reversed_name)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}
}
