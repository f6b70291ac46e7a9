//! Keeps validation markers visible in read-only editors.
//!
//! While read-only, the widget's view queries its model with
//! `filter_out_validation = true`, which hides schema diagnostics.
//! [`MarkerVisible`] wraps the model and always asks for them.

use std::ops::Range;

/// Decoration category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
	/// Diagnostic produced by schema validation.
	Validation,
	/// Anything else: highlights, folding, selections.
	Other,
}

/// A decorated span, in 1-based lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
	pub lines: Range<u32>,
	pub kind: DecorationKind,
	pub owner: Option<u32>,
	pub in_overview_ruler: bool,
}

impl Decoration {
	fn visible(&self, owner: Option<u32>, filter_out_validation: bool) -> bool {
		if filter_out_validation && self.kind == DecorationKind::Validation {
			return false;
		}
		owner.is_none_or(|owner| self.owner == Some(owner))
	}

	fn touches(&self, lines: &Range<u32>) -> bool {
		self.lines.start < lines.end && lines.start < self.lines.end
	}
}

/// Decoration queries a text model answers.
pub trait DecorationSource {
	/// Decorations on `line`.
	fn line_decorations(&self, line: u32, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration>;

	/// Decorations on lines `start..=end`.
	fn lines_decorations(&self, start: u32, end: u32, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration>;

	/// Decorations intersecting `range`.
	fn decorations_in_range(&self, range: Range<u32>, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration>;

	/// Decorations shown in the overview ruler.
	fn overview_ruler_decorations(&self, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration>;

	/// Every decoration.
	fn all_decorations(&self, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration>;
}

/// In-memory [`DecorationSource`] that honours `filter_out_validation`.
#[derive(Debug, Clone, Default)]
pub struct DecorationSet {
	pub decorations: Vec<Decoration>,
}

impl DecorationSet {
	fn query(&self, range: Option<Range<u32>>, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration> {
		self.decorations
			.iter()
			.filter(|d| d.visible(owner, filter_out_validation))
			.filter(|d| range.as_ref().is_none_or(|r| d.touches(r)))
			.cloned()
			.collect()
	}
}

impl DecorationSource for DecorationSet {
	fn line_decorations(&self, line: u32, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration> {
		self.query(Some(line..line.saturating_add(1)), owner, filter_out_validation)
	}

	fn lines_decorations(&self, start: u32, end: u32, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration> {
		self.query(Some(start..end.saturating_add(1)), owner, filter_out_validation)
	}

	fn decorations_in_range(&self, range: Range<u32>, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration> {
		self.query(Some(range), owner, filter_out_validation)
	}

	fn overview_ruler_decorations(&self, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration> {
		let mut found = self.query(None, owner, filter_out_validation);
		found.retain(|d| d.in_overview_ruler);
		found
	}

	fn all_decorations(&self, owner: Option<u32>, filter_out_validation: bool) -> Vec<Decoration> {
		self.query(None, owner, filter_out_validation)
	}
}

/// Forwards every query with `filter_out_validation = false`.
#[derive(Debug, Clone, Default)]
pub struct MarkerVisible<M> {
	inner: M,
}

impl<M: DecorationSource> MarkerVisible<M> {
	pub fn new(inner: M) -> Self {
		Self { inner }
	}

	pub fn inner(&self) -> &M {
		&self.inner
	}

	pub fn into_inner(self) -> M {
		self.inner
	}
}

impl<M: DecorationSource> DecorationSource for MarkerVisible<M> {
	fn line_decorations(&self, line: u32, owner: Option<u32>, _filter_out_validation: bool) -> Vec<Decoration> {
		self.inner.line_decorations(line, owner, false)
	}

	fn lines_decorations(&self, start: u32, end: u32, owner: Option<u32>, _filter_out_validation: bool) -> Vec<Decoration> {
		self.inner.lines_decorations(start, end, owner, false)
	}

	fn decorations_in_range(&self, range: Range<u32>, owner: Option<u32>, _filter_out_validation: bool) -> Vec<Decoration> {
		self.inner.decorations_in_range(range, owner, false)
	}

	fn overview_ruler_decorations(&self, owner: Option<u32>, _filter_out_validation: bool) -> Vec<Decoration> {
		self.inner.overview_ruler_decorations(owner, false)
	}

	fn all_decorations(&self, owner: Option<u32>, _filter_out_validation: bool) -> Vec<Decoration> {
		self.inner.all_decorations(owner, false)
	}
}
