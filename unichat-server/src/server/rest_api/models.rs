use crate::chat::model::{ChatMessage, MessageId};
use crate::room::model::{RoomId, RoomSummary};
use crate::server::rest_api::origin::RequestOrigin;
use crate::user::model::{User, UserId};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination values are parsed leniently, so malformed ones fall back to their defaults instead
/// of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParameters {
	#[serde(default)]
	pub query: String,
	pub limit: Option<String>,
	pub offset: Option<String>,
}

impl SearchParameters {
	pub fn limit(&self) -> u32 {
		parse_count(self.limit.as_deref())
			.filter(|limit| *limit > 0)
			.unwrap_or(DEFAULT_PAGE_SIZE)
			.min(MAX_PAGE_SIZE)
	}

	pub fn offset(&self) -> u32 {
		parse_count(self.offset.as_deref()).unwrap_or_default()
	}
}

fn parse_count(value: Option<&str>) -> Option<u32> {
	value.and_then(|value| value.trim().parse().ok())
}

/// Public profile of a user as shown in search results.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
	pub id: UserId,
	pub username: String,
	pub first_name: String,
	pub second_name: String,
	pub patronymic: String,
	pub avatar: Option<String>,
}

impl UserResponse {
	pub fn new(user: User, origin: &RequestOrigin, media_prefix: &str) -> Self {
		Self {
			id: user.id,
			avatar: user.avatar.map(|avatar| origin.media_url(media_prefix, &avatar)),
			username: user.username,
			first_name: user.first_name,
			second_name: user.second_name,
			patronymic: user.patronymic,
		}
	}
}

/// One page of a limit/offset paginated listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse<Item> {
	pub count: i64,
	pub next: Option<String>,
	pub previous: Option<String>,
	pub results: Vec<Item>,
}

/// Links to the neighbouring pages of `page_url`, `None` where there is no such page.
pub fn page_links(page_url: &Url, count: i64, limit: u32, offset: u32) -> (Option<String>, Option<String>) {
	let next_offset = offset.saturating_add(limit);
	let next = (i64::from(next_offset) < count).then(|| with_offset(page_url, limit, next_offset));
	let previous = (offset > 0).then(|| with_offset(page_url, limit, offset.saturating_sub(limit)));
	(next, previous)
}

fn with_offset(page_url: &Url, limit: u32, offset: u32) -> String {
	let retained = page_url
		.query_pairs()
		.filter(|(key, _)| key != "limit" && key != "offset")
		.map(|(key, value)| (key.into_owned(), value.into_owned()))
		.collect::<Vec<_>>();

	let mut url = page_url.clone();
	url.query_pairs_mut()
		.clear()
		.extend_pairs(retained)
		.append_pair("limit", &limit.to_string())
		.append_pair("offset", &offset.to_string());
	url.into()
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelfIdResponse {
	pub id: UserId,
}

/// Envelope of the chat listings, `data` carries the actual entries.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<Item> {
	pub status: bool,
	pub message: String,
	pub data: Vec<Item>,
}

impl<Item> ListResponse<Item> {
	pub fn new(message: &str, data: Vec<Item>) -> Self {
		Self {
			status: true,
			message: message.to_owned(),
			data,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
	pub id: MessageId,
	pub room: RoomId,
	pub user: UserId,
	pub content: String,
	pub created_at: String,
}

impl From<ChatMessage> for MessageResponse {
	fn from(message: ChatMessage) -> Self {
		Self {
			id: message.id,
			room: message.room_id,
			user: message.user_id,
			created_at: message.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
			content: message.content,
		}
	}
}

/// A room of the requesting user together with the profile of the other participant.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomResponse {
	#[serde(rename = "user__username")]
	pub user_username: String,
	#[serde(rename = "user__avatar")]
	pub user_avatar: Option<String>,
	#[serde(rename = "user__first_name")]
	pub user_first_name: String,
	#[serde(rename = "user__second_name")]
	pub user_second_name: String,
	#[serde(rename = "user__patronymic")]
	pub user_patronymic: String,
	#[serde(rename = "user__id")]
	pub user_id: UserId,
	#[serde(rename = "room__id")]
	pub room_id: RoomId,
	#[serde(rename = "room__name")]
	pub room_name: String,
	#[serde(rename = "room__last_message")]
	pub room_last_message: Option<String>,
	#[serde(rename = "room__last_sent_user")]
	pub room_last_sent_user: Option<UserId>,
}

impl RoomResponse {
	pub fn new(summary: RoomSummary, origin: &RequestOrigin, media_prefix: &str) -> Self {
		let peer = summary.peer;
		Self {
			user_username: peer.username,
			user_avatar: peer.avatar.map(|avatar| origin.media_url(media_prefix, &avatar)),
			user_first_name: peer.first_name,
			user_second_name: peer.second_name,
			user_patronymic: peer.patronymic,
			user_id: peer.id,
			room_id: summary.room_id,
			room_name: summary.room_name,
			room_last_message: summary.room_last_message,
			room_last_sent_user: summary.room_last_sent_user_id,
		}
	}
}
