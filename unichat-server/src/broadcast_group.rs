use crate::message::outgoing::OutgoingMessage;
use crate::presence::connection_handle::{ConnectionHandle, Delivery};
use crate::presence::connection_id::ConnectionId;
use crate::room::model::RoomId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Per-room fan-out of chat frames to the connections that took part in a conversation.
///
/// Membership is keyed by connection, so a connection receives each frame of a room once,
/// no matter how often it joined.
#[derive(Default)]
pub struct BroadcastGroups {
	members_by_room: Mutex<HashMap<RoomId, BTreeMap<ConnectionId, ConnectionHandle>>>,
}

impl BroadcastGroups {
	pub fn join(&self, room_id: RoomId, connection: &ConnectionHandle) {
		self.members_by_room
			.lock()
			.entry(room_id)
			.or_default()
			.insert(connection.id(), connection.clone());
	}

	/// Removes a connection from every room it joined.
	pub fn leave_all(&self, connection_id: ConnectionId) {
		self.members_by_room.lock().retain(|_, members| {
			members.remove(&connection_id);
			!members.is_empty()
		});
	}

	/// Queues `message` for every member of the room. Returns to how many connections it was queued.
	pub fn broadcast(&self, room_id: RoomId, message: &OutgoingMessage) -> usize {
		let mut members_by_room = self.members_by_room.lock();
		let Some(members) = members_by_room.get_mut(&room_id) else {
			return 0;
		};

		let mut queued = 0;
		members.retain(|connection_id, connection| match connection.enqueue(message.clone()) {
			Delivery::Queued => {
				queued += 1;
				true
			}
			Delivery::Dropped => true,
			Delivery::Closed => {
				debug!(%connection_id, %room_id, "Removing closed connection from room.");
				false
			}
		});
		if members.is_empty() {
			members_by_room.remove(&room_id);
		}

		queued
	}

	#[cfg(test)]
	pub fn members(&self, room_id: RoomId) -> Vec<ConnectionId> {
		self.members_by_room
			.lock()
			.get(&room_id)
			.map(|members| members.keys().copied().collect())
			.unwrap_or_default()
	}
}
