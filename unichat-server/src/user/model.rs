use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use typed_builder::TypedBuilder;

#[derive(
	Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, From, Into, Display,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(i64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserRole {
	Student,
	Professor,
	#[default]
	None,
}

impl FromStr for UserRole {
	type Err = UnknownRoleError;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		match text {
			"student" => Ok(Self::Student),
			"professor" => Ok(Self::Professor),
			"none" => Ok(Self::None),
			other => Err(UnknownRoleError(other.to_owned())),
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role '{0}', expected one of: student, professor, none")]
pub struct UnknownRoleError(String);

/// A portal account. Accounts are owned by the authentication subsystem, the chat only reads them.
#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub first_name: String,
	pub second_name: String,
	pub patronymic: String,
	pub avatar: Option<String>,
	pub role: UserRole,
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct NewUser {
	#[builder(setter(into))]
	pub username: String,
	#[builder(default, setter(into))]
	pub first_name: String,
	#[builder(default, setter(into))]
	pub second_name: String,
	#[builder(default, setter(into))]
	pub patronymic: String,
	#[builder(default, setter(strip_option, into))]
	pub avatar: Option<String>,
	#[builder(default)]
	pub role: UserRole,
}

/// Case-insensitive prefix search over username and the name parts, never returning `excluding`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSearch {
	pub prefix: String,
	pub excluding: UserId,
	pub limit: u32,
	pub offset: u32,
}
