use super::{SqliteRepository, sqlite_connection};
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::room::model::{ChatRoom, RoomId, RoomSummary};
use crate::room::repository::RoomRepository;
use crate::room::{canonical_room_name, room_name_candidates};
use crate::user::model::UserId;
use async_trait::async_trait;
use sqlx::{SqliteConnection, query, query_as, query_scalar};

#[async_trait]
impl RoomRepository for SqliteRepository {
	async fn get(&self, connection: &mut dyn Connection, room_id: RoomId) -> Result<Option<ChatRoom>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, name, last_message, last_sent_user_id
			FROM chat_room
			WHERE id = ?1",
		)
		.bind(room_id)
		.fetch_optional(connection)
		.await
		.map_err(Into::into)
	}

	async fn find_by_pair(
		&self,
		connection: &mut dyn Connection,
		first: UserId,
		second: UserId,
	) -> Result<Option<ChatRoom>, DatabaseError> {
		let connection = sqlite_connection(connection)?;
		find_by_pair(connection, first, second).await
	}

	async fn resolve_or_create(
		&self,
		connection: &mut dyn Connection,
		sender: UserId,
		recipient: UserId,
		content: &str,
	) -> Result<ChatRoom, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		if let Some(room) = find_by_pair(&mut *connection, sender, recipient).await? {
			return query_as(
				r"UPDATE chat_room SET last_message = ?1, last_sent_user_id = ?2
				WHERE id = ?3
				RETURNING id, name, last_message, last_sent_user_id",
			)
			.bind(content)
			.bind(sender)
			.bind(room.id)
			.fetch_one(&mut *connection)
			.await
			.map_err(Into::into);
		}

		// A concurrent first message may have created the room in the meantime.
		query_as(
			r"INSERT INTO chat_room(name, last_message, last_sent_user_id) VALUES (?1, ?2, ?3)
			ON CONFLICT(name) DO UPDATE SET
				last_message = excluded.last_message,
				last_sent_user_id = excluded.last_sent_user_id
			RETURNING id, name, last_message, last_sent_user_id",
		)
		.bind(canonical_room_name(sender, recipient))
		.bind(content)
		.bind(sender)
		.fetch_one(&mut *connection)
		.await
		.map_err(Into::into)
	}

	async fn ensure_participant(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
		user_id: UserId,
	) -> Result<(), DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query(
			r"INSERT INTO chat_room_participant(room_id, user_id) VALUES (?1, ?2)
			ON CONFLICT(room_id, user_id) DO NOTHING",
		)
		.bind(room_id)
		.bind(user_id)
		.execute(connection)
		.await?;
		Ok(())
	}

	async fn is_participant(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
		user_id: UserId,
	) -> Result<bool, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_scalar(
			r"SELECT EXISTS(
				SELECT 1 FROM chat_room_participant WHERE room_id = ?1 AND user_id = ?2
			)",
		)
		.bind(room_id)
		.bind(user_id)
		.fetch_one(connection)
		.await
		.map_err(Into::into)
	}

	async fn list_participants(
		&self,
		connection: &mut dyn Connection,
		room_id: RoomId,
	) -> Result<Vec<UserId>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_scalar(
			r"SELECT user_id FROM chat_room_participant
			WHERE room_id = ?1
			ORDER BY user_id ASC",
		)
		.bind(room_id)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}

	async fn list_for_user(
		&self,
		connection: &mut dyn Connection,
		user_id: UserId,
	) -> Result<Vec<RoomSummary>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT
				r.id AS room_id,
				r.name AS room_name,
				r.last_message AS room_last_message,
				r.last_sent_user_id AS room_last_sent_user_id,
				u.id, u.username, u.first_name, u.second_name, u.patronymic, u.avatar, u.role
			FROM chat_room_participant own
			JOIN chat_room r ON r.id = own.room_id
			JOIN chat_room_participant other ON other.room_id = r.id AND other.user_id != own.user_id
			JOIN user u ON u.id = other.user_id
			WHERE own.user_id = ?1
			ORDER BY r.id ASC",
		)
		.bind(user_id)
		.fetch_all(connection)
		.await
		.map_err(Into::into)
	}
}

async fn find_by_pair(
	connection: &mut SqliteConnection,
	first: UserId,
	second: UserId,
) -> Result<Option<ChatRoom>, DatabaseError> {
	let [name, reversed_name] = room_name_candidates(first, second);

	query_as(
		r"SELECT id, name, last_message, last_sent_user_id
		FROM chat_room
		WHERE name IN (?1, ?2)
		ORDER BY id ASC
		LIMIT 1",
	)
	.bind(name)
	.bind(reversed_name)
	.fetch_optional(connection)
	.await
	.map_err(Into::into)
}
