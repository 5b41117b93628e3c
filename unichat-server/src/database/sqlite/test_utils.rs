use crate::database::sqlite::{SqliteDatabase, SqliteRepository};
use crate::database::test::TestFactory;
use crate::database::{Connection, Database, Repository};
use std::sync::Arc;

pub struct SqliteTestFactory;

impl TestFactory for SqliteTestFactory {
	async fn connection() -> Box<dyn Connection> {
		database()
			.await
			.connection()
			.await
			.expect("Failed to connect to database")
	}

	async fn database() -> Arc<dyn Database> {
		database().await
	}

	fn repository() -> Arc<dyn Repository> {
		Arc::new(SqliteRepository)
	}
}

pub async fn database() -> Arc<dyn Database> {
	let database = SqliteDatabase::connect("sqlite::memory:")
		.await
		.expect("Failed to create in-memory SQLite database");
	database.migrate().await.expect("Failed to migrate database");

	Arc::new(database)
}

/// A database in a temporary file, served by a pool with several connections, so that concurrent
/// writers actually contend for the SQLite write lock. The directory is deleted when dropped.
pub async fn file_database() -> (Arc<dyn Database>, tempfile::TempDir) {
	let directory = tempfile::tempdir().expect("Failed to create temporary directory");
	let url = format!("sqlite://{}", directory.path().join("chat.sqlite3").display());
	let database = SqliteDatabase::connect(&url)
		.await
		.expect("Failed to create file based SQLite database");
	database.migrate().await.expect("Failed to migrate database");

	(Arc::new(database), directory)
}
