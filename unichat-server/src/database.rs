use crate::chat::repository::ChatRepository;
use crate::database::error::DatabaseError;
use crate::database::transaction::Transaction;
use crate::room::repository::RoomRepository;
use crate::user::repository::UserRepository;
use async_trait::async_trait;
use static_assertions::assert_obj_safe;
use std::any::{Any, type_name};

pub mod error;
pub mod sqlite;
pub mod transaction;

/// Storage of users, rooms and messages. Implementations hand out connections that the
/// [`Repository`] of the same backend knows how to use.
#[async_trait]
pub trait Database: Send + Sync {
	async fn migrate(&self) -> Result<(), DatabaseError>;

	async fn connection(&self) -> Result<Box<dyn Connection>, DatabaseError>;

	/// Starts a transaction on a connection that is held until the transaction is committed or rolled back.
	async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, DatabaseError>;
}

assert_obj_safe!(Database);

/// Backend specific connection, downcast by the matching repository.
pub trait Connection: Any + Send + Sync {
	fn type_name(&self) -> &'static str {
		type_name::<Self>()
	}
}

assert_obj_safe!(Connection);

/// Entry point to the per entity repositories of one backend.
pub trait Repository: UserRepository + RoomRepository + ChatRepository + Send + Sync + 'static {
	fn user(&self) -> &dyn UserRepository;
	fn room(&self) -> &dyn RoomRepository;
	fn chat(&self) -> &dyn ChatRepository;
}

assert_obj_safe!(Repository);
