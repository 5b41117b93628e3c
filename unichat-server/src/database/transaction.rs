use crate::database::error::DatabaseError;
use crate::database::{Connection, Database};
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use static_assertions::assert_obj_safe;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

const MAXIMUM_ATTEMPTS: usize = 5;
const BASE_RETRY_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum TransactionError<ApplicationError> {
	#[error("Database error: {0}")]
	Database(#[from] DatabaseError),
	#[error("{0}")]
	Application(ApplicationError),
	#[error("Maximum attempts exceeded ({limit})")]
	AttemptsExhausted { limit: usize },
}

pub trait DatabaseTransactionExtension {
	/// Runs `operation` inside a transaction, committing on success and rolling back on error.
	/// The whole operation is retried when it lost a race against a concurrent writer.
	fn run_in_transaction<Operation, Output, ApplicationError>(
		&self,
		operation: Operation,
	) -> impl Future<Output = Result<Output, TransactionError<ApplicationError>>> + Send
	where
		Output: Send,
		ApplicationError: Send,
		Operation: for<'connection> FnMut(
				&'connection mut dyn Connection,
			) -> BoxFuture<'connection, Result<Output, TransactionError<ApplicationError>>>
			+ Send;
}

impl<D: Database + ?Sized> DatabaseTransactionExtension for D {
	async fn run_in_transaction<Operation, Output, ApplicationError>(
		&self,
		mut operation: Operation,
	) -> Result<Output, TransactionError<ApplicationError>>
	where
		Output: Send,
		ApplicationError: Send,
		Operation: for<'connection> FnMut(
				&'connection mut dyn Connection,
			) -> BoxFuture<'connection, Result<Output, TransactionError<ApplicationError>>>
			+ Send,
	{
		for attempt in 1..=MAXIMUM_ATTEMPTS {
			if attempt > 1 {
				sleep(retry_delay(attempt)).await;
			}

			let mut transaction = match self.begin_transaction().await {
				Ok(transaction) => transaction,
				Err(DatabaseError::TransactionSerialization(error)) => {
					warn!(attempt, %error, "Failed to begin transaction, retrying.");
					continue;
				}
				Err(error) => return Err(error.into()),
			};

			let serialization_error = match operation(transaction.connection()).await {
				Ok(output) => match transaction.commit().await {
					Ok(()) => return Ok(output),
					Err(DatabaseError::TransactionSerialization(error)) => error,
					Err(error) => return Err(error.into()),
				},
				Err(TransactionError::Database(DatabaseError::TransactionSerialization(error))) => {
					transaction.rollback().await?;
					error
				}
				Err(error) => {
					transaction.rollback().await?;
					return Err(error);
				}
			};

			warn!(attempt, %serialization_error, "Transaction serialization error, retrying.");
		}

		Err(TransactionError::AttemptsExhausted {
			limit: MAXIMUM_ATTEMPTS,
		})
	}
}

/// Exponential backoff with random jitter, so colliding writers spread out.
fn retry_delay(attempt: usize) -> Duration {
	let exponent = u32::try_from(attempt.saturating_sub(2)).unwrap_or(u32::MAX).min(8);
	let ceiling = BASE_RETRY_DELAY * 2u32.pow(exponent);
	ceiling / 2 + ceiling.mul_f64(rand::random::<f64>() / 2.0)
}

#[async_trait]
pub trait Transaction: Send + Sync {
	fn type_name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	fn connection(&mut self) -> &mut dyn Connection;

	async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
	async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

assert_obj_safe!(Transaction);

#[cfg(test)]
mod test {
	use super::*;
	use crate::database::test::{DefaultTestFactory, TestFactory};
	use crate::user::model::NewUser;
	use anyhow::anyhow;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[derive(Debug, thiserror::Error, PartialEq)]
	#[error("application failure")]
	struct ApplicationFailure;

	#[tokio::test]
	async fn should_commit_successful_operation() {
		let database = DefaultTestFactory::database().await;
		let repository = DefaultTestFactory::repository();

		let operation_repository = repository.clone();
		let user = database
			.run_in_transaction(move |connection| {
				let repository = operation_repository.clone();
				Box::pin(async move {
					let new_user = NewUser::builder().username("alice").build();
					let user = repository.user().create(connection, &new_user).await?;
					Ok::<_, TransactionError<ApplicationFailure>>(user)
				})
			})
			.await
			.expect("Transaction failed");

		let mut connection = database.connection().await.expect("Failed to get connection");
		let stored = repository
			.user()
			.get(&mut *connection, user.id)
			.await
			.expect("Failed to get user");
		assert_eq!(Some(user), stored);
	}

	#[tokio::test]
	async fn should_roll_back_on_application_error() {
		let database = DefaultTestFactory::database().await;
		let repository = DefaultTestFactory::repository();

		let operation_repository = repository.clone();
		let result = database
			.run_in_transaction(move |connection| {
				let repository = operation_repository.clone();
				Box::pin(async move {
					let new_user = NewUser::builder().username("bob").build();
					repository.user().create(connection, &new_user).await?;
					Err::<(), _>(TransactionError::Application(ApplicationFailure))
				})
			})
			.await;
		assert!(matches!(result, Err(TransactionError::Application(ApplicationFailure))));

		let mut connection = database.connection().await.expect("Failed to get connection");
		let found = repository
			.user()
			.find_by_username(&mut *connection, "bob")
			.await
			.expect("Failed to search user");
		assert_eq!(None, found);
	}

	#[tokio::test]
	async fn should_retry_serialization_errors_until_attempts_are_exhausted() {
		let database = DefaultTestFactory::database().await;
		let attempts = Arc::new(AtomicUsize::new(0));

		let counted_attempts = attempts.clone();
		let result = database
			.run_in_transaction(move |_connection| {
				let attempts = counted_attempts.clone();
				Box::pin(async move {
					attempts.fetch_add(1, Ordering::Relaxed);
					Err::<(), TransactionError<ApplicationFailure>>(TransactionError::Database(
						DatabaseError::TransactionSerialization(anyhow!("database is locked")),
					))
				})
			})
			.await;

		assert!(matches!(result, Err(TransactionError::AttemptsExhausted { limit: 5 })));
		assert_eq!(5, attempts.load(Ordering::Relaxed));
	}

	#[test]
	fn retry_delay_should_grow_and_stay_within_jitter_bounds() {
		for attempt in 2..=MAXIMUM_ATTEMPTS {
			let ceiling = BASE_RETRY_DELAY * 2u32.pow(u32::try_from(attempt - 2).expect("Small attempt count"));
			for _ in 0..100 {
				let delay = retry_delay(attempt);
				assert!(delay >= ceiling / 2, "{delay:?} below {:?}", ceiling / 2);
				assert!(delay <= ceiling, "{delay:?} above {ceiling:?}");
			}
		}
	}
}
