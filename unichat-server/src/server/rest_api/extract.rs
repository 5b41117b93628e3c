use crate::server::rest_api::error::ApiError;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

/// [`Path`] that rejects with a JSON [`ApiError`] instead of axum's plain text.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T, State> FromRequestParts<State> for ApiPath<T>
where
	T: DeserializeOwned + Send,
	State: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &State) -> Result<Self, Self::Rejection> {
		let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
		Ok(Self(value))
	}
}

/// [`Query`] that rejects with a JSON [`ApiError`] instead of axum's plain text.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, State> FromRequestParts<State> for ApiQuery<T>
where
	T: DeserializeOwned + Send,
	State: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &State) -> Result<Self, Self::Rejection> {
		let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
		Ok(Self(value))
	}
}
