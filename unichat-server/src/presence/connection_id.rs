use std::fmt::{Display, Formatter};
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;

/// Identifies one websocket connection. A user with several open tabs has several of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl From<u64> for ConnectionId {
	fn from(id: u64) -> Self {
		Self(id)
	}
}

impl Display for ConnectionId {
	fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
		write!(formatter, "ConnectionId({})", self.0)
	}
}

#[derive(Default)]
pub struct ConnectionIdSequence {
	next_id: AtomicU64,
}

impl ConnectionIdSequence {
	pub fn next(&self) -> ConnectionId {
		// Only uniqueness matters, no other memory accesses are ordered by this counter.
		ConnectionId(self.next_id.fetch_add(1, Relaxed))
	}
}
