//! Reading of inline `style` attributes. The grid is laid out entirely with
//! inline declarations, so this is all the CSS the pipeline needs.

/// Iterates the `property: value` declarations of an inline style, with the
/// property lowercased and both sides trimmed.
fn declarations(style: &str) -> impl Iterator<Item = (String, &str)> {
	style.split(';').filter_map(|decl| {
		let (property, value) = decl.split_once(':')?;

		Some((property.trim().to_ascii_lowercase(), value.trim()))
	})
}

/// Integer pixel value of `property`, e.g. `top` in `top: 136px`.
///
/// Only whole, non-negative pixel lengths are accepted; anything else is
/// treated as absent.
#[must_use]
pub fn pixels(style: &str, property: &str) -> Option<u32> {
	declarations(style)
		.filter(|(name, _)| name == property)
		.find_map(|(_, value)| {
			let digits = value.strip_suffix("px")?.trim_end();

			if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
				return None;
			}

			digits.parse().ok()
		})
}

/// Whether the style declares `position: absolute`.
#[must_use]
pub fn is_absolute(style: &str) -> bool {
	declarations(style)
		.any(|(name, value)| name == "position" && value.eq_ignore_ascii_case("absolute"))
}
