use crate::configuration::ConfigurationError;
use crate::database::error::DatabaseError;
use crate::user::model::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnichatError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Invalid log filters: {0}")]
	LogFilter(#[from] tracing_subscriber::filter::ParseError),
	#[error("Database error: {0}")]
	Database(#[from] DatabaseError),
	#[error("IO error while serving requests: {0}")]
	Server(#[from] std::io::Error),
	#[error("Failed to issue token: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
	#[error("User {0} does not exist.")]
	UnknownUser(UserId),
}
