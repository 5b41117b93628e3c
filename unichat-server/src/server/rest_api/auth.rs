use crate::context::ApplicationContext;
use crate::server::rest_api::error::ApiError;
use axum::extract::{Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

/// Alternative for specifying JWTs when headers aren't possible, i.e. `WebSockets`.
#[derive(Deserialize)]
pub struct QueryToken {
	token: String,
}

/// Resolves the requesting [`User`](crate::user::model::User) from its token and attaches it to the request.
pub async fn middleware(
	State(application_context): State<ApplicationContext>,
	mut request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	// Either accept a JWT via Bearer header or as query parameter.
	let token = match (bearer_token(&request), query_token(&request)) {
		(Some(token), None) | (None, Some(token)) => token,
		_ => return Err(ApiError::Unauthorized),
	};
	let user_id = application_context.token_authority.verify(&token)?;

	let user = {
		let mut connection = application_context.database.connection().await?;
		application_context.repository.user().get(&mut *connection, user_id).await?
	};
	let Some(user) = user else {
		debug!(%user_id, "User of token not found!");
		return Err(ApiError::Unauthorized);
	};
	request.extensions_mut().insert(user);

	Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
	let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
	header
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(ToOwned::to_owned)
}

fn query_token(request: &Request) -> Option<String> {
	Query::<QueryToken>::try_from_uri(request.uri())
		.ok()
		.map(|Query(query)| query.token)
}
