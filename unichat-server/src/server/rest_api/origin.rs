use crate::context::ApplicationContext;
use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};

const FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Scheme and authority the client used to reach us, e.g. `https://portal.example`.
///
/// Honours `X-Forwarded-Proto` from a reverse proxy and falls back to the configured address
/// when the request carries no `Host` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOrigin(String);

impl RequestOrigin {
	pub fn from_headers(headers: &HeaderMap, fallback_host: &str) -> Self {
		let scheme = header_value(headers, &FORWARDED_PROTO)
			.and_then(|protocols| protocols.split(',').next())
			.map(str::trim)
			.filter(|scheme| !scheme.is_empty())
			.unwrap_or("http");
		let host = header_value(headers, &HOST).unwrap_or(fallback_host);

		Self(format!("{scheme}://{host}"))
	}

	/// Absolute URL of an uploaded file. Already absolute paths are returned unchanged.
	pub fn media_url(&self, media_prefix: &str, path: &str) -> String {
		if path.starts_with("http://") || path.starts_with("https://") {
			return path.to_owned();
		}

		let path = path.trim_start_matches('/');
		match media_prefix.trim_matches('/') {
			"" => format!("{self}/{path}"),
			prefix => format!("{self}/{prefix}/{path}"),
		}
	}
}

impl Display for RequestOrigin {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		formatter.write_str(&self.0)
	}
}

impl FromRequestParts<ApplicationContext> for RequestOrigin {
	type Rejection = Infallible;

	async fn from_request_parts(
		parts: &mut Parts,
		application_context: &ApplicationContext,
	) -> Result<Self, Self::Rejection> {
		let fallback_host = application_context.configuration.address.to_string();
		Ok(Self::from_headers(&parts.headers, &fallback_host))
	}
}

fn header_value<'headers>(headers: &'headers HeaderMap, name: &HeaderName) -> Option<&'headers str> {
	headers.get(name)?.to_str().ok()
}
