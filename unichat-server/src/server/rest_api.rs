use crate::chat::model::ChatMessage;
use crate::context::ApplicationContext;
use crate::room::model::RoomId;
use crate::server::rest_api::error::ApiError;
use crate::server::rest_api::extract::{ApiPath, ApiQuery};
use crate::server::rest_api::models::{
	ListResponse, MessageResponse, PageResponse, RoomResponse, SearchParameters, SelfIdResponse, UserResponse,
	page_links,
};
use crate::server::rest_api::origin::RequestOrigin;
use crate::user::model::{User, UserId, UserSearch};
use axum::extract::State;
use axum::http::Uri;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tracing::debug;
use url::Url;

pub mod auth;
pub mod error;
pub mod extract;
pub mod models;
pub mod origin;

/// Routes of the read-only views, all of them expect the authenticated [`User`] as request extension.
pub fn routes() -> Router<ApplicationContext> {
	Router::new()
		.route("/users/search/", get(search_users))
		.route("/users/selfid/", get(self_id))
		.route("/room-messages/{user_id}/", get(pair_messages))
		.route("/room-messages/{user_id}/{room_id}/", get(room_messages))
		.route("/user-chatrooms/", get(user_chatrooms))
}

async fn search_users(
	State(application_context): State<ApplicationContext>,
	Extension(user): Extension<User>,
	origin: RequestOrigin,
	uri: Uri,
	ApiQuery(parameters): ApiQuery<SearchParameters>,
) -> Result<Json<PageResponse<UserResponse>>, ApiError> {
	let search = UserSearch {
		prefix: parameters.query.trim().to_owned(),
		excluding: user.id,
		limit: parameters.limit(),
		offset: parameters.offset(),
	};

	let mut connection = application_context.database.connection().await?;
	let repository = application_context.repository.user();
	let count = repository.count_search(&mut *connection, &search).await?;
	let users = repository.search(&mut *connection, &search).await?;

	let (next, previous) = match Url::parse(&format!("{origin}{uri}")) {
		Ok(page_url) => page_links(&page_url, count, search.limit, search.offset),
		Err(error) => {
			debug!(%error, %uri, "Can't build pagination links.");
			(None, None)
		}
	};
	let media_prefix = &application_context.configuration.media_prefix;
	Ok(Json(PageResponse {
		count,
		next,
		previous,
		results: users
			.into_iter()
			.map(|user| UserResponse::new(user, &origin, media_prefix))
			.collect(),
	}))
}

async fn self_id(Extension(user): Extension<User>) -> Json<SelfIdResponse> {
	Json(SelfIdResponse { id: user.id })
}

/// Messages exchanged between the requester and `user_id`, empty if they never talked.
async fn pair_messages(
	State(application_context): State<ApplicationContext>,
	Extension(user): Extension<User>,
	ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<ListResponse<MessageResponse>>, ApiError> {
	let mut connection = application_context.database.connection().await?;
	let messages = application_context
		.repository
		.chat()
		.list_by_pair(&mut *connection, user.id, user_id)
		.await?;

	Ok(Json(message_list(messages)))
}

/// Messages of one room, only visible to its participants.
async fn room_messages(
	State(application_context): State<ApplicationContext>,
	Extension(user): Extension<User>,
	ApiPath((_user_id, room_id)): ApiPath<(UserId, RoomId)>,
) -> Result<Json<ListResponse<MessageResponse>>, ApiError> {
	let mut connection = application_context.database.connection().await?;
	let repository = &application_context.repository;
	// Rooms of other users are indistinguishable from missing ones.
	if !repository
		.room()
		.is_participant(&mut *connection, room_id, user.id)
		.await?
	{
		return Err(ApiError::RoomNotFound(room_id));
	}

	let messages = repository.chat().list_by_room(&mut *connection, room_id).await?;
	Ok(Json(message_list(messages)))
}

fn message_list(messages: Vec<ChatMessage>) -> ListResponse<MessageResponse> {
	ListResponse::new(
		"Chat Room Messages",
		messages.into_iter().map(MessageResponse::from).collect(),
	)
}

async fn user_chatrooms(
	State(application_context): State<ApplicationContext>,
	Extension(user): Extension<User>,
	origin: RequestOrigin,
) -> Result<Json<ListResponse<RoomResponse>>, ApiError> {
	let mut connection = application_context.database.connection().await?;
	let rooms = application_context
		.repository
		.room()
		.list_for_user(&mut *connection, user.id)
		.await?;

	let media_prefix = &application_context.configuration.media_prefix;
	Ok(Json(ListResponse::new(
		"User Chat Room List",
		rooms
			.into_iter()
			.map(|summary| RoomResponse::new(summary, &origin, media_prefix))
			.collect(),
	)))
}
