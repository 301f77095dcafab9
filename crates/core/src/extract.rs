use select::{
	document::Document,
	node::Node,
	predicate::{Attr, Class, Name, Predicate},
};
use tracing::debug;

use crate::{report::SkipReason, style};

pub const EVENT_TEXT_CLASS: &str = "eventText";
pub const EVENT_TABLE_CLASS: &str = "event";
pub const ACCESSIBLE_LABEL: &str = "aria-label";

/// One event box as drawn on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventBox {
	pub left: u32,
	pub top: u32,
	/// Height of the box's inner table, when it declares one.
	pub height: Option<u32>,
	pub accessible_text: String,
}

/// Nearest `div` ancestor of `node` positioned absolutely.
fn positioned_ancestor(node: Node<'_>) -> Option<Node<'_>> {
	let mut current = node.parent();

	while let Some(candidate) = current {
		if candidate.is(Name("div")) && candidate.attr("style").is_some_and(style::is_absolute) {
			return Some(candidate);
		}

		current = candidate.parent();
	}

	None
}

fn box_height(container: Node<'_>) -> Option<u32> {
	container
		.find(Name("table").and(Class(EVENT_TABLE_CLASS)))
		.next()?
		.attr("style")
		.and_then(|s| style::pixels(s, "height"))
}

fn read_box(node: Node<'_>) -> Result<RawEventBox, SkipReason> {
	let container = positioned_ancestor(node).ok_or(SkipReason::NoPositionedAncestor)?;
	let style = container.attr("style").unwrap_or_default();

	let (Some(left), Some(top)) = (style::pixels(style, "left"), style::pixels(style, "top")) else {
		return Err(SkipReason::MissingPosition);
	};

	Ok(RawEventBox {
		left,
		top,
		height: box_height(container),
		accessible_text: node.attr(ACCESSIBLE_LABEL).unwrap_or_default().to_string(),
	})
}

/// Every event box of the document, in document order. Boxes whose geometry
/// cannot be read are returned as the reason they were dropped.
#[must_use]
pub fn event_boxes(document: &Document) -> Vec<Result<RawEventBox, SkipReason>> {
	document
		.find(
			Name("div")
				.and(Attr(ACCESSIBLE_LABEL, ()))
				.and(Class(EVENT_TEXT_CLASS)),
		)
		.map(|node| {
			let raw = read_box(node);

			if let Err(reason) = &raw {
				debug!(%reason, label = node.attr(ACCESSIBLE_LABEL), "dropping event box");
			}

			raw
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn boxes(html: &str) -> Vec<Result<RawEventBox, SkipReason>> {
		event_boxes(&Document::from(html))
	}

	#[test]
	fn reads_geometry_from_positioned_ancestor() {
		let found = boxes(
			r#"
			<div style="position: absolute; left: 180px; top: 136px; width: 110px">
				<table class="event" style="height:35px"><tr><td>
					<div><div class="eventText" aria-label="Algorithmique null Salle B203">Algorithmique</div></div>
				</td></tr></table>
			</div>
			"#,
		);

		assert_eq!(
			found,
			vec![Ok(RawEventBox {
				left: 180,
				top: 136,
				height: Some(35),
				accessible_text: "Algorithmique null Salle B203".to_string(),
			})]
		);
	}

	#[test]
	fn height_is_optional() {
		let found = boxes(
			r#"
			<div style="position:absolute;left:0px;top:40px">
				<table class="event"><tr><td><div class="eventText" aria-label="TD">TD</div></td></tr></table>
			</div>
			"#,
		);

		assert_eq!(found.len(), 1);
		assert_eq!(found[0].as_ref().unwrap().height, None);
	}

	#[test]
	fn skips_boxes_without_geometry() {
		let found = boxes(
			r#"
			<div class="eventText" aria-label="orphan">orphan</div>
			<div style="position: absolute; left: 10px">
				<div class="eventText" aria-label="no top">no top</div>
			</div>
			<div style="position: relative; left: 10px; top: 10px">
				<div class="eventText" aria-label="relative">relative</div>
			</div>
			"#,
		);

		assert_eq!(
			found,
			vec![
				Err(SkipReason::NoPositionedAncestor),
				Err(SkipReason::MissingPosition),
				Err(SkipReason::NoPositionedAncestor),
			]
		);
	}

	#[test]
	fn requires_both_label_and_marker() {
		let found = boxes(
			r#"
			<div style="position:absolute;left:0px;top:0px">
				<div class="eventText">no label</div>
				<div aria-label="no marker">no marker</div>
				<div class="other eventText" aria-label="both">both</div>
			</div>
			"#,
		);

		assert_eq!(found.len(), 1);
		assert_eq!(found[0].as_ref().unwrap().accessible_text, "both");
	}

	#[test]
	fn nearest_positioned_ancestor_wins() {
		let found = boxes(
			r#"
			<div style="position:absolute;left:500px;top:500px">
				<div style="position:absolute;left:120px;top:60px">
					<div class="eventText" aria-label="inner">inner</div>
				</div>
			</div>
			"#,
		);

		let raw = found[0].as_ref().unwrap();

		assert_eq!((raw.left, raw.top), (120, 60));
	}
}
