use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new("<[^>]*>").expect("Tag pattern must compile."));

/// Removes markup tags from free-text fields such as catalog descriptions
/// (`<p>`, `<br>`, ...) and trims surrounding whitespace. Empty input yields
/// an empty string.
pub fn strip_markup(raw: &str) -> String {
	TAG.replace_all(raw, "").trim().to_string()
}

/// Builds the single string that gets embedded for a book: title and stripped
/// description separated by one space, or the title alone when the
/// description is empty.
pub fn embeddable_text(title: &str, description: &str) -> String {
	let description = description.trim();

	if description.is_empty() {
		title.to_string()
	} else {
		format!("{title} {description}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_nested_tags() {
		assert_eq!(strip_markup("<p>Hello <b>World</b></p>"), "Hello World");
	}

	#[test]
	fn empty_input_yields_empty_string() {
		assert_eq!(strip_markup(""), "");
		assert_eq!(strip_markup("   "), "");
	}

	#[test]
	fn plain_text_passes_through_trimmed() {
		assert_eq!(strip_markup("  plain text  "), "plain text");
	}

	#[test]
	fn embeddable_text_joins_title_and_description() {
		assert_eq!(embeddable_text("Dune", "A desert planet."), "Dune A desert planet.");
	}

	#[test]
	fn embeddable_text_without_description_is_title_alone() {
		assert_eq!(embeddable_text("Dune", ""), "Dune");
		assert_eq!(embeddable_text("Dune", "   "), "Dune");
	}
}
