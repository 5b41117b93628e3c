use crate::chat::repository::ChatRepository;
use crate::database::error::{DatabaseError, IntoStoreResult};
use crate::database::transaction::Transaction;
use crate::database::{Connection, Database, Repository};
use crate::room::repository::RoomRepository;
use crate::user::repository::UserRepository;
use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, migrate};
use std::any::Any;
use std::ops::DerefMut;
use std::str::FromStr;
use std::time::Duration;

mod chat;
mod room;
#[cfg(test)]
pub mod test_utils;
mod user;

#[derive(Clone)]
pub struct SqliteDatabase {
	pool: SqlitePool,
}

impl SqliteDatabase {
	pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
		let options = SqliteConnectOptions::from_str(database_url)
			.connection_error("Invalid database URL")?
			.create_if_missing(true)
			.foreign_keys(true)
			.busy_timeout(Duration::from_secs(5));

		// An in-memory database only lives as long as a connection to it is open.
		let pool_options = if is_in_memory(database_url) {
			SqlitePoolOptions::new()
				.max_connections(1)
				.min_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
		} else {
			SqlitePoolOptions::new()
		};

		let pool = pool_options
			.connect_with(options)
			.await
			.connection_error("Failed to connect to database")?;

		Ok(Self { pool })
	}
}

fn is_in_memory(database_url: &str) -> bool {
	database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[async_trait]
impl Database for SqliteDatabase {
	async fn migrate(&self) -> Result<(), DatabaseError> {
		migrate!().run(&self.pool).await.map_err(Into::into)
	}

	async fn connection(&self) -> Result<Box<dyn Connection>, DatabaseError> {
		self.pool
			.acquire()
			.await
			.map(|connection| Box::new(connection) as Box<dyn Connection>)
			.map_err(Into::into)
	}

	/// Transactions are only used for writes, so they take the write lock up front. A deferred
	/// transaction that reads before writing fails immediately with `SQLITE_BUSY` once another
	/// writer committed in between, while `BEGIN IMMEDIATE` waits for the busy timeout.
	async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, DatabaseError> {
		self.pool
			.begin_with("BEGIN IMMEDIATE")
			.await
			.map(|transaction| Box::new(SqliteTransaction(transaction)) as Box<dyn Transaction>)
			.map_err(Into::into)
	}
}

impl Connection for SqliteConnection {}
impl Connection for PoolConnection<Sqlite> {}
impl Connection for sqlx::Transaction<'static, Sqlite> {}

struct SqliteTransaction(sqlx::Transaction<'static, Sqlite>);

#[async_trait]
impl Transaction for SqliteTransaction {
	fn connection(&mut self) -> &mut dyn Connection {
		&mut self.0
	}

	async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
		self.0.commit().await.map_err(Into::into)
	}

	async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
		self.0.rollback().await.map_err(Into::into)
	}
}

#[derive(Default, Clone, Copy)]
pub struct SqliteRepository;

impl Repository for SqliteRepository {
	fn user(&self) -> &dyn UserRepository {
		self
	}

	fn room(&self) -> &dyn RoomRepository {
		self
	}

	fn chat(&self) -> &dyn ChatRepository {
		self
	}
}

fn sqlite_connection(connection: &mut dyn Connection) -> Result<&mut SqliteConnection, DatabaseError> {
	let type_name = connection.type_name();

	let connection: &mut dyn Any = connection;

	if connection.is::<PoolConnection<Sqlite>>() {
		return connection
			.downcast_mut::<PoolConnection<Sqlite>>()
			.map(DerefMut::deref_mut)
			.ok_or_else(|| mismatch(type_name));
	}

	if connection.is::<sqlx::Transaction<'static, Sqlite>>() {
		return connection
			.downcast_mut::<sqlx::Transaction<'static, Sqlite>>()
			.map(DerefMut::deref_mut)
			.ok_or_else(|| mismatch(type_name));
	}

	connection
		.downcast_mut::<SqliteConnection>()
		.ok_or_else(|| mismatch(type_name))
}

fn mismatch(type_name: &str) -> DatabaseError {
	DatabaseError::DatabaseMismatch(anyhow!("Expected SQLite connection, got {type_name}"))
}

/// Escapes `LIKE` wildcards so `text` only matches literally when used with `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for character in text.chars() {
		if matches!(character, '\\' | '%' | '_') {
			escaped.push('\\');
		}
		escaped.push(character);
	}
	escaped
}
