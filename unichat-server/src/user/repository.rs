use crate::database::Connection;
use crate::database::error::DatabaseError;
use crate::user::model::{NewUser, User, UserId, UserSearch};
use async_trait::async_trait;
use static_assertions::assert_obj_safe;

#[cfg(test)]
mod tests;

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
	async fn get(&self, connection: &mut dyn Connection, user_id: UserId) -> Result<Option<User>, DatabaseError>;
	async fn find_by_username(
		&self,
		connection: &mut dyn Connection,
		username: &str,
	) -> Result<Option<User>, DatabaseError>;
	async fn create(&self, connection: &mut dyn Connection, new_user: &NewUser) -> Result<User, DatabaseError>;
	async fn search(&self, connection: &mut dyn Connection, search: &UserSearch) -> Result<Vec<User>, DatabaseError>;
	/// Number of matches for `search`, ignoring its limit and offset.
	async fn count_search(&self, connection: &mut dyn Connection, search: &UserSearch) -> Result<i64, DatabaseError>;
}

assert_obj_safe!(UserRepository);
