#[generic_tests::define(attrs(tokio::test))]
#[allow(clippy::non_ascii_literal)]
mod user_tests {
	use crate::database::error::DatabaseError;
	use crate::database::sqlite::test_utils::SqliteTestFactory;
	use crate::database::test::TestFactory;
	use crate::database::{Connection, Repository};
	use crate::user::model::{NewUser, User, UserId, UserRole, UserSearch};

	#[tokio::test]
	async fn creates_user<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let new_user = NewUser::builder()
			.username("ivanov")
			.first_name("Ivan")
			.second_name("Ivanov")
			.patronymic("Ivanovich")
			.avatar("avatars/ivan.png")
			.role(UserRole::Professor)
			.build();
		let User {
			id: _,
			username,
			first_name,
			second_name,
			patronymic,
			avatar,
			role,
		} = repository
			.user()
			.create(&mut *connection, &new_user)
			.await
			.expect("Failed to create user");

		assert_eq!("ivanov", username);
		assert_eq!("Ivan", first_name);
		assert_eq!("Ivanov", second_name);
		assert_eq!("Ivanovich", patronymic);
		assert_eq!(Some("avatars/ivan.png".to_owned()), avatar);
		assert_eq!(UserRole::Professor, role);
	}

	#[tokio::test]
	async fn gets_created_user<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let user = user(repository.as_ref(), &mut *connection, "petrov", "Petr").await;

		let found = repository
			.user()
			.get(&mut *connection, user.id)
			.await
			.expect("Failed to get user");
		assert_eq!(Some(user), found);
	}

	#[tokio::test]
	async fn doesnt_get_unknown_user<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let found = repository
			.user()
			.get(&mut *connection, UserId::from(1337))
			.await
			.expect("Failed to get user");
		assert_eq!(None, found);
	}

	#[tokio::test]
	async fn doesnt_create_user_with_same_username<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		user(repository.as_ref(), &mut *connection, "student", "").await;
		let result = repository
			.user()
			.create(&mut *connection, &NewUser::builder().username("student").build())
			.await;

		match result {
			Err(DatabaseError::UniqueViolation(_)) => { /* ok */ }
			Ok(_) => panic!("Expected unique constraint violation when creating user with duplicate username"),
			Err(err) => panic!("Expected UniqueViolation, got: {err:?}"),
		}
	}

	#[tokio::test]
	async fn doesnt_create_user_with_blank_username<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let result = repository
			.user()
			.create(&mut *connection, &NewUser::builder().username("   ").build())
			.await;

		assert!(matches!(result, Err(DatabaseError::OtherConstraintViolation(_))));
	}

	#[tokio::test]
	async fn searches_by_prefix_of_any_name_part<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let requester = user(repository.as_ref(), &mut *connection, "requester", "Ivan").await;
		let ivan = user(repository.as_ref(), &mut *connection, "ivan", "Ivan").await;
		let by_second_name = repository
			.user()
			.create(
				&mut *connection,
				&NewUser::builder()
					.username("s123")
					.first_name("Anna")
					.second_name("Ivanova")
					.build(),
			)
			.await
			.expect("Failed to create user");
		user(repository.as_ref(), &mut *connection, "bob", "Bob").await;

		let results = search(repository.as_ref(), &mut *connection, "iVa", requester.id, 10, 0).await;

		assert_eq!(vec![ivan, by_second_name], results);
	}

	#[tokio::test]
	async fn searches_case_insensitively_beyond_ascii<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let requester = user(repository.as_ref(), &mut *connection, "requester", "").await;
		let maria = user(repository.as_ref(), &mut *connection, "maria", "Мария").await;

		let results = search(repository.as_ref(), &mut *connection, "мар", requester.id, 10, 0).await;

		assert_eq!(vec![maria], results);
	}

	#[tokio::test]
	async fn search_treats_wildcards_literally<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let requester = user(repository.as_ref(), &mut *connection, "requester", "").await;
		user(repository.as_ref(), &mut *connection, "alice", "Alice").await;
		let underscored = user(repository.as_ref(), &mut *connection, "a_b", "").await;

		let results = search(repository.as_ref(), &mut *connection, "a_", requester.id, 10, 0).await;

		assert_eq!(vec![underscored], results);
	}

	#[tokio::test]
	async fn search_pages_and_counts_all_matches<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let requester = user(repository.as_ref(), &mut *connection, "requester", "").await;
		let mut students = Vec::new();
		for number in 0..5 {
			students.push(user(repository.as_ref(), &mut *connection, &format!("student{number}"), "").await);
		}

		let page = search(repository.as_ref(), &mut *connection, "stu", requester.id, 2, 2).await;
		let count = repository
			.user()
			.count_search(
				&mut *connection,
				&UserSearch {
					prefix: "stu".to_owned(),
					excluding: requester.id,
					limit: 2,
					offset: 2,
				},
			)
			.await
			.expect("Failed to count");

		assert_eq!(students[2..4].to_vec(), page);
		assert_eq!(5, count);
	}

	#[tokio::test]
	async fn search_never_returns_requester<Factory: TestFactory>() {
		let mut connection = Factory::connection().await;
		let repository = Factory::repository();

		let requester = user(repository.as_ref(), &mut *connection, "ivan", "Ivan").await;

		let results = search(repository.as_ref(), &mut *connection, "", requester.id, 10, 0).await;

		assert!(results.is_empty());
	}

	async fn user(repository: &dyn Repository, connection: &mut dyn Connection, username: &str, first_name: &str) -> User {
		repository
			.user()
			.create(
				connection,
				&NewUser::builder().username(username).first_name(first_name).build(),
			)
			.await
			.expect("Failed to create user")
	}

	async fn search(
		repository: &dyn Repository,
		connection: &mut dyn Connection,
		prefix: &str,
		excluding: UserId,
		limit: u32,
		offset: u32,
	) -> Vec<User> {
		repository
			.user()
			.search(
				connection,
				&UserSearch {
					prefix: prefix.to_owned(),
					excluding,
					limit,
					offset,
				},
			)
			.await
			.expect("Failed to search users")
	}

	#[instantiate_tests(<SqliteTestFactory>)]
	mod sqlite {}
}
