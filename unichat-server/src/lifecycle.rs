use crate::chat::{ChatError, StoredMessage, store_chat_message};
use crate::connection::receiver::{MessageReceiver, ReceivedMessage};
use crate::connection::sender::MessageSender;
use crate::context::ApplicationContext;
use crate::message::chat_request::ChatRequest;
use crate::message::outgoing::error_message::{ErrorMessage, ErrorMessageType};
use crate::message::outgoing::{ChatBroadcast, OutgoingMessage};
use crate::presence::connection_handle::ConnectionHandle;
use crate::user::model::User;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tracing::{debug, error, info, warn};

/// Frames queued for a connection beyond this are dropped instead of slowing down the sender.
const OUTGOING_QUEUE_SIZE: usize = 64;

/// Received frames waiting to be processed, more than the rate limiter's burst.
const PENDING_FRAME_LIMIT: usize = 32;

const QUOTA: Quota = Quota::per_second(nonzero!(5u32)).allow_burst(nonzero!(20u32));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
	Closed,
	Timeout,
}

/// Serves one authenticated websocket connection until it is closed or stops answering heartbeats.
pub async fn run_client(
	application_context: ApplicationContext,
	user: User,
	message_sender: MessageSender,
	message_receiver: MessageReceiver,
) {
	let (outgoing_sender, outgoing_receiver) = mpsc::channel(OUTGOING_QUEUE_SIZE);
	let connection = ConnectionHandle::new(
		application_context.connection_id_sequence.next(),
		user.id,
		outgoing_sender,
	);
	application_context.presence.register(connection.clone());
	info!(
		user_id = %user.id,
		connection_id = %connection.id(),
		connections = application_context.presence.connection_count(user.id),
		"Connection opened."
	);

	let configuration = &application_context.configuration;
	let (pong_sender, pong_receiver) = mpsc::channel(usize::from(configuration.missed_heartbeat_limit.max(1)));

	let close_reason = tokio::select! {
		() = handle_messages(&application_context, &user, &connection, message_receiver, pong_sender) => CloseReason::Closed,
		() = send_outgoing_messages(message_sender.clone(), outgoing_receiver) => CloseReason::Closed,
		close_reason = heartbeat(
			message_sender.clone(),
			pong_receiver,
			configuration.heartbeat_interval,
			configuration.missed_heartbeat_limit,
		) => close_reason,
	};

	application_context
		.presence
		.unregister_connection(user.id, connection.id());
	application_context.broadcast_groups.leave_all(connection.id());
	if close_reason == CloseReason::Timeout {
		message_sender.close().await;
	}

	info!(user_id = %user.id, connection_id = %connection.id(), ?close_reason, "Connection closed.");
}

/// Reading and processing run side by side, so pongs keep reaching the heartbeat while a request
/// waits for the rate limiter or the database.
async fn handle_messages(
	application_context: &ApplicationContext,
	user: &User,
	connection: &ConnectionHandle,
	message_receiver: MessageReceiver,
	pong_sender: mpsc::Sender<Vec<u8>>,
) {
	let (frame_sender, frame_receiver) = mpsc::channel(PENDING_FRAME_LIMIT);
	tokio::join!(
		receive_frames(message_receiver, frame_sender, pong_sender),
		process_frames(application_context, user, connection, frame_receiver),
	);
}

/// Forwards pongs to the heartbeat right away and queues everything else for [`process_frames`].
async fn receive_frames(
	mut message_receiver: MessageReceiver,
	frame_sender: mpsc::Sender<ReceivedMessage>,
	pong_sender: mpsc::Sender<Vec<u8>>,
) {
	loop {
		match message_receiver.receive().await {
			ReceivedMessage::Finished => break,
			ReceivedMessage::Pong { payload } => {
				// a full queue means the heartbeat already has enough pongs to look at
				let _ = pong_sender.try_send(payload);
			}
			frame => {
				// A client that floods faster than its frames are processed waits here.
				if frame_sender.send(frame).await.is_err() {
					break;
				}
			}
		}
	}
}

async fn process_frames(
	application_context: &ApplicationContext,
	user: &User,
	connection: &ConnectionHandle,
	mut frame_receiver: mpsc::Receiver<ReceivedMessage>,
) {
	let rate_limiter = RateLimiter::direct(QUOTA);

	while let Some(frame) = frame_receiver.recv().await {
		let request = match frame {
			ReceivedMessage::Request(request) => request,
			ReceivedMessage::Malformed(error) => {
				rate_limiter.until_ready().await;
				warn!(user_id = %user.id, %error, "Received malformed frame.");
				reply_with_error(connection, ErrorMessageType::InvalidFormat, error.to_string());
				continue;
			}
			ReceivedMessage::Pong { .. } | ReceivedMessage::Finished => continue,
		};

		rate_limiter.until_ready().await;
		debug!(user_id = %user.id, to_user = %request.to_user, "Received chat message.");

		if let Err(error) = handle_chat_request(application_context, user, connection, request).await {
			let error_type = match &error {
				ChatError::EmptyContent | ChatError::ContentTooLong { .. } => ErrorMessageType::InvalidContent,
				ChatError::UnknownRecipient(_) => ErrorMessageType::UnknownRecipient,
				ChatError::Storage(_) => ErrorMessageType::InternalServerError,
			};
			if error_type == ErrorMessageType::InternalServerError {
				error!(user_id = %user.id, %error, "Failed to handle chat message.");
			} else {
				info!(user_id = %user.id, %error, "Rejected chat message.");
			}
			reply_with_error(connection, error_type, error.to_string());
		}
	}
}

async fn handle_chat_request(
	application_context: &ApplicationContext,
	user: &User,
	connection: &ConnectionHandle,
	ChatRequest { message, to_user }: ChatRequest,
) -> Result<(), ChatError> {
	let recipient_connection = application_context.presence.lookup(to_user);

	// Storing runs detached so a client disconnecting mid-way never leaves a half written message.
	let stored_message = tokio::spawn(store_chat_message(
		application_context.database.clone(),
		application_context.repository.clone(),
		user.id,
		to_user,
		message,
		application_context.configuration.message_length_limit,
	));
	let StoredMessage { room, message } = stored_message
		.await
		.map_err(|error| ChatError::Storage(error.into()))??;

	let broadcast_groups = &application_context.broadcast_groups;
	broadcast_groups.join(room.id, connection);
	if let Some(recipient_connection) = &recipient_connection {
		broadcast_groups.join(room.id, recipient_connection);
	}

	let delivered = broadcast_groups.broadcast(room.id, &OutgoingMessage::from(ChatBroadcast::from(&message)));
	debug!(room_id = %room.id, message_id = %message.id, delivered, "Delivered chat message.");

	Ok(())
}

fn reply_with_error(connection: &ConnectionHandle, error: ErrorMessageType, message: String) {
	connection.enqueue(OutgoingMessage::from(
		ErrorMessage::builder().error(error).message(message).build(),
	));
}

async fn send_outgoing_messages(message_sender: MessageSender, mut outgoing_receiver: mpsc::Receiver<OutgoingMessage>) {
	while let Some(message) = outgoing_receiver.recv().await {
		if message_sender.send_message(message).await.is_err() {
			break;
		}
	}
}

async fn heartbeat(
	message_sender: MessageSender,
	mut pong_receiver: mpsc::Receiver<Vec<u8>>,
	heartbeat_interval: Duration,
	missed_heartbeat_limit: u8,
) -> CloseReason {
	let mut interval = interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
	interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
	let mut missed_heartbeats = 0;

	for count in 0..u64::MAX {
		interval.tick().await;

		let payload = count.to_be_bytes();
		if message_sender.send_ping(payload.to_vec()).await.is_err() {
			return CloseReason::Closed;
		}

		let receive_pong = async {
			while let Some(pong_payload) = pong_receiver.recv().await {
				if pong_payload == payload {
					return true;
				}
			}
			false
		};
		match timeout(heartbeat_interval, receive_pong).await {
			Ok(true) => missed_heartbeats = 0,
			Ok(false) => return CloseReason::Closed,
			Err(_elapsed) => {
				missed_heartbeats += 1;
				if missed_heartbeats >= missed_heartbeat_limit {
					break;
				}
			}
		}
	}

	CloseReason::Timeout
}
