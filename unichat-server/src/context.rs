use crate::broadcast_group::BroadcastGroups;
use crate::configuration::Configuration;
use crate::database::error::DatabaseError;
use crate::database::sqlite::{SqliteDatabase, SqliteRepository};
use crate::database::{Database, Repository};
use crate::presence::PresenceDirectory;
use crate::presence::connection_id::ConnectionIdSequence;
use crate::token_authority::TokenAuthority;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub database: Arc<dyn Database>,
	pub repository: Arc<dyn Repository>,
	pub token_authority: TokenAuthority,
	pub presence: Arc<PresenceDirectory>,
	pub broadcast_groups: Arc<BroadcastGroups>,
	pub connection_id_sequence: Arc<ConnectionIdSequence>,
}

impl ApplicationContext {
	/// Connects to the configured database and brings its schema up to date.
	pub async fn new(configuration: Configuration) -> Result<ApplicationContext, DatabaseError> {
		let database = SqliteDatabase::connect(&configuration.database_url).await?;
		database.migrate().await?;

		Ok(Self::with_database(
			configuration,
			Arc::new(database),
			Arc::new(SqliteRepository),
		))
	}

	pub fn with_database(
		configuration: Configuration,
		database: Arc<dyn Database>,
		repository: Arc<dyn Repository>,
	) -> Self {
		let token_authority = TokenAuthority::new(&configuration.jwt_secret);
		Self {
			configuration,
			database,
			repository,
			token_authority,
			presence: Arc::default(),
			broadcast_groups: Arc::default(),
			connection_id_sequence: Arc::default(),
		}
	}
}
