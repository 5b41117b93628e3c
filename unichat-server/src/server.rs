use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use crate::context::ApplicationContext;
use crate::lifecycle::run_client;
use crate::server::rest_api::error::ApiError;
use crate::server::rest_api::extract::ApiPath;
use crate::user::model::{User, UserId};
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router, middleware};
use futures_util::StreamExt;
use std::future::ready;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

pub mod rest_api;

const MAX_MESSAGE_SIZE: usize = 10 * 1024;
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

pub async fn run_server(application_context: ApplicationContext) -> Result<(), std::io::Error> {
	let address = application_context.configuration.address;
	let handle = axum_server::Handle::new();
	tokio::spawn(shutdown_on_interrupt(handle.clone()));

	info!(%address, "Starting server. Open websocket connections at 'ws://{address}/ws/chat/<user id>/'.");
	axum_server::bind(address)
		.handle(handle)
		.serve(create_router(application_context).into_make_service())
		.await
}

async fn shutdown_on_interrupt(handle: axum_server::Handle<std::net::SocketAddr>) {
	if let Err(error) = tokio::signal::ctrl_c().await {
		error!(%error, "Failed to listen for interrupt signal.");
		return;
	}

	info!("Shutting down.");
	handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
}

pub fn create_router(application_context: ApplicationContext) -> Router {
	Router::new()
		.route("/ws/chat/{user_id}/", get(websocket_handler))
		.merge(rest_api::routes())
		.route_layer(middleware::from_fn_with_state(
			application_context.clone(),
			rest_api::auth::middleware,
		))
		.layer(CorsLayer::permissive())
		.with_state(application_context)
}

async fn websocket_handler(
	State(application_context): State<ApplicationContext>,
	Extension(authenticated_user): Extension<User>,
	ApiPath(user_id): ApiPath<UserId>,
	websocket: WebSocketUpgrade,
) -> Result<Response, ApiError> {
	let user = {
		let mut connection = application_context.database.connection().await?;
		application_context.repository.user().get(&mut *connection, user_id).await?
	};
	let Some(user) = user else {
		debug!(%user_id, "Rejected connection for unknown user.");
		return Err(ApiError::UnknownUser(user_id));
	};
	if user.id != authenticated_user.id {
		debug!(%user_id, authenticated_user_id = %authenticated_user.id, "Rejected connection for another user.");
		return Err(ApiError::Unauthorized);
	}

	Ok(websocket
		.max_message_size(MAX_MESSAGE_SIZE)
		.max_frame_size(MAX_MESSAGE_SIZE)
		.on_upgrade(move |websocket| {
			let (sink, stream) = websocket.split();
			let message_sender = MessageSender::from(SinkMessageSender::new(sink));
			let stream = stream
				.take_while(|result| {
					if let Err(error) = result {
						debug!(%error, "Websocket stream ended with an error.");
					}
					ready(result.is_ok())
				})
				.filter_map(|result| ready(result.ok()));
			let message_receiver = MessageReceiver::from(StreamMessageReceiver::new(stream, message_sender.clone()));

			run_client(application_context, user, message_sender, message_receiver)
		}))
}
