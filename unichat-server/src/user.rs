pub mod model;
pub mod repository;

/// Case folding applied to both the stored names and the query of a user search.
pub fn fold_for_search(text: &str) -> String {
	text.trim().to_lowercase()
}

#[cfg(test)]
#[allow(clippy::non_ascii_literal)]
mod test {
	use super::*;

	#[test]
	fn should_fold_ascii_and_cyrillic_names() {
		assert_eq!("ivanov", fold_for_search("Ivanov"));
		assert_eq!("иванов", fold_for_search("Иванов"));
		assert_eq!("петр", fold_for_search("  ПЕТР  "));
	}
}
