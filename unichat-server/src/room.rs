use crate::user::model::UserId;

pub mod model;
pub mod repository;

/// Name under which the room between two users is stored. Independent of argument order.
pub fn canonical_room_name(first: UserId, second: UserId) -> String {
	let (lower, higher) = if first <= second { (first, second) } else { (second, first) };
	format!("{lower}-{higher}")
}

/// Both orderings of the pair, so rooms named by either participant are found.
pub fn room_name_candidates(first: UserId, second: UserId) -> [String; 2] {
	[format!("{first}-{second}"), format!("{second}-{first}")]
}
