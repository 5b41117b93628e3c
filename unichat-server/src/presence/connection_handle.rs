use crate::message::outgoing::OutgoingMessage;
use crate::presence::connection_id::ConnectionId;
use crate::user::model::UserId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Handle for pushing frames to one open websocket connection from anywhere in the server.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
	id: ConnectionId,
	user_id: UserId,
	outgoing: mpsc::Sender<OutgoingMessage>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
	Queued,
	/// The connection is alive but can't keep up, the frame was discarded.
	Dropped,
	Closed,
}

impl ConnectionHandle {
	pub fn new(id: ConnectionId, user_id: UserId, outgoing: mpsc::Sender<OutgoingMessage>) -> Self {
		Self { id, user_id, outgoing }
	}

	pub fn id(&self) -> ConnectionId {
		self.id
	}

	pub fn user_id(&self) -> UserId {
		self.user_id
	}

	/// Queues `message` without waiting, so one slow client never stalls delivery to the others.
	pub fn enqueue(&self, message: OutgoingMessage) -> Delivery {
		match self.outgoing.try_send(message) {
			Ok(()) => Delivery::Queued,
			Err(TrySendError::Full(_)) => {
				warn!(connection_id = %self.id, user_id = %self.user_id, "Outgoing queue is full, dropping frame.");
				Delivery::Dropped
			}
			Err(TrySendError::Closed(_)) => Delivery::Closed,
		}
	}

	pub fn is_closed(&self) -> bool {
		self.outgoing.is_closed()
	}
}
