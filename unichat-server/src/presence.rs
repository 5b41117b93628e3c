use crate::presence::connection_handle::ConnectionHandle;
use crate::presence::connection_id::ConnectionId;
use crate::user::model::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

pub mod connection_handle;
pub mod connection_id;

/// Which users are currently connected to this server process and how to reach them.
///
/// A user may hold several connections at once. Messages addressed to a user go to the most
/// recently registered one.
#[derive(Default)]
pub struct PresenceDirectory {
	connections_by_user: Mutex<HashMap<UserId, Vec<ConnectionHandle>>>,
}

impl PresenceDirectory {
	pub fn register(&self, connection: ConnectionHandle) {
		let mut connections_by_user = self.connections_by_user.lock();
		connections_by_user
			.entry(connection.user_id())
			.or_default()
			.push(connection);
	}

	/// The most recently registered connection of `user_id` that is still open.
	pub fn lookup(&self, user_id: UserId) -> Option<ConnectionHandle> {
		self.connections_by_user
			.lock()
			.get(&user_id)
			.and_then(|connections| connections.iter().rev().find(|connection| !connection.is_closed()))
			.cloned()
	}

	pub fn is_online(&self, user_id: UserId) -> bool {
		self.connections_by_user.lock().contains_key(&user_id)
	}

	/// Forgets every connection of `user_id`. Returns how many were removed.
	pub fn unregister(&self, user_id: UserId) -> usize {
		self.connections_by_user
			.lock()
			.remove(&user_id)
			.map_or(0, |connections| connections.len())
	}

	/// Forgets a single connection, leaving other connections of the same user reachable.
	pub fn unregister_connection(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
		let mut connections_by_user = self.connections_by_user.lock();
		let Entry::Occupied(mut entry) = connections_by_user.entry(user_id) else {
			return false;
		};

		let connections = entry.get_mut();
		let count_before = connections.len();
		connections.retain(|connection| connection.id() != connection_id);
		let removed = connections.len() != count_before;
		if connections.is_empty() {
			entry.remove();
		}

		removed
	}

	pub fn connection_count(&self, user_id: UserId) -> usize {
		self.connections_by_user.lock().get(&user_id).map_or(0, Vec::len)
	}
}
