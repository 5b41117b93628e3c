use super::{SqliteRepository, escape_like, sqlite_connection};
use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::user::fold_for_search;
use crate::user::model::{NewUser, User, UserId, UserSearch};
use crate::user::repository::UserRepository;
use async_trait::async_trait;
use sqlx::{query_as, query_scalar};

const SEARCH_CONDITION: &str = r"id != ?1 AND (
		username_folded LIKE ?2 ESCAPE '\'
		OR first_name_folded LIKE ?2 ESCAPE '\'
		OR second_name_folded LIKE ?2 ESCAPE '\'
		OR patronymic_folded LIKE ?2 ESCAPE '\'
	)";

fn prefix_pattern(prefix: &str) -> String {
	format!("{}%", escape_like(&fold_for_search(prefix)))
}

#[async_trait]
impl UserRepository for SqliteRepository {
	async fn get(&self, connection: &mut dyn Connection, user_id: UserId) -> Result<Option<User>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, username, first_name, second_name, patronymic, avatar, role
			FROM user
			WHERE id = ?1",
		)
		.bind(user_id)
		.fetch_optional(connection)
		.await
		.map_err(Into::into)
	}

	async fn find_by_username(
		&self,
		connection: &mut dyn Connection,
		username: &str,
	) -> Result<Option<User>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"SELECT id, username, first_name, second_name, patronymic, avatar, role
			FROM user
			WHERE username = ?1",
		)
		.bind(username)
		.fetch_optional(connection)
		.await
		.map_err(Into::into)
	}

	async fn create(&self, connection: &mut dyn Connection, new_user: &NewUser) -> Result<User, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		query_as(
			r"INSERT INTO user(
				username, first_name, second_name, patronymic, avatar, role,
				username_folded, first_name_folded, second_name_folded, patronymic_folded
			) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
			RETURNING id, username, first_name, second_name, patronymic, avatar, role",
		)
		.bind(&new_user.username)
		.bind(&new_user.first_name)
		.bind(&new_user.second_name)
		.bind(&new_user.patronymic)
		.bind(&new_user.avatar)
		.bind(new_user.role)
		.bind(fold_for_search(&new_user.username))
		.bind(fold_for_search(&new_user.first_name))
		.bind(fold_for_search(&new_user.second_name))
		.bind(fold_for_search(&new_user.patronymic))
		.fetch_one(connection)
		.await
		.map_err(Into::into)
	}

	async fn search(&self, connection: &mut dyn Connection, search: &UserSearch) -> Result<Vec<User>, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		let sql = format!(
			r"SELECT id, username, first_name, second_name, patronymic, avatar, role
			FROM user
			WHERE {SEARCH_CONDITION}
			ORDER BY id ASC
			LIMIT ?3 OFFSET ?4"
		);
		query_as(&sql)
			.bind(search.excluding)
			.bind(prefix_pattern(&search.prefix))
			.bind(search.limit)
			.bind(search.offset)
			.fetch_all(connection)
			.await
			.map_err(Into::into)
	}

	async fn count_search(&self, connection: &mut dyn Connection, search: &UserSearch) -> Result<i64, DatabaseError> {
		let connection = sqlite_connection(connection)?;

		let sql = format!("SELECT COUNT(*) FROM user WHERE {SEARCH_CONDITION}");
		query_scalar(&sql)
			.bind(search.excluding)
			.bind(prefix_pattern(&search.prefix))
			.fetch_one(connection)
			.await
			.map_err(Into::into)
	}
}
