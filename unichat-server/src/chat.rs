use crate::chat::model::ChatMessage;
use crate::database::error::DatabaseError;
use crate::database::transaction::{DatabaseTransactionExtension, TransactionError};
use crate::database::{Database, Repository};
use crate::room::model::ChatRoom;
use crate::user::model::UserId;
use chrono::Utc;
use std::sync::Arc;

pub mod model;
pub mod repository;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
	#[error("Message was empty or whitespace-only.")]
	EmptyContent,
	#[error("Message is too long. (>{limit} characters)")]
	ContentTooLong { limit: usize },
	#[error("Recipient {0} doesn't exist.")]
	UnknownRecipient(UserId),
	#[error("Failed to store message: {0}")]
	Storage(anyhow::Error),
}

impl From<DatabaseError> for ChatError {
	fn from(error: DatabaseError) -> Self {
		Self::Storage(error.into())
	}
}

impl From<TransactionError<ChatError>> for ChatError {
	fn from(error: TransactionError<ChatError>) -> Self {
		match error {
			TransactionError::Application(error) => error,
			TransactionError::Database(error) => error.into(),
			exhausted @ TransactionError::AttemptsExhausted { .. } => Self::Storage(exhausted.into()),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredMessage {
	pub room: ChatRoom,
	pub message: ChatMessage,
}

pub fn validate_content(content: &str, message_length_limit: usize) -> Result<(), ChatError> {
	if content.trim().is_empty() {
		return Err(ChatError::EmptyContent);
	}

	if content.chars().count() > message_length_limit {
		return Err(ChatError::ContentTooLong {
			limit: message_length_limit,
		});
	}

	Ok(())
}

/// Stores a message from `sender` to `recipient`, creating their room on first contact.
///
/// Room, participants and message are written in a single transaction, so either all of them
/// are visible afterwards or none of them.
pub async fn store_chat_message(
	database: Arc<dyn Database>,
	repository: Arc<dyn Repository>,
	sender: UserId,
	recipient: UserId,
	content: String,
	message_length_limit: usize,
) -> Result<StoredMessage, ChatError> {
	validate_content(&content, message_length_limit)?;

	database
		.run_in_transaction(move |connection| {
			let repository = repository.clone();
			let content = content.clone();
			Box::pin(async move {
				if repository.user().get(connection, recipient).await?.is_none() {
					return Err(TransactionError::Application(ChatError::UnknownRecipient(recipient)));
				}

				let room = repository
					.room()
					.resolve_or_create(connection, sender, recipient, &content)
					.await?;
				repository.room().ensure_participant(connection, room.id, sender).await?;
				repository
					.room()
					.ensure_participant(connection, room.id, recipient)
					.await?;
				let message = repository
					.chat()
					.create(connection, room.id, sender, &content, Utc::now())
					.await?;

				Ok(StoredMessage { room, message })
			})
		})
		.await
		.map_err(ChatError::from)
}
