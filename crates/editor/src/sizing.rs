//! Content-driven editor height.
//!
//! The widget reports how many visual lines it renders (wrapped lines
//! included). Height follows that count up to a ceiling. Container resizes
//! change wrapping, so each resize triggers a relayout and a fresh count;
//! resizes are throttled with both a leading and a trailing edge.

use std::time::{Duration, Instant};

use courier_config::EditorConfig;
use tracing::trace;

/// Leading- and trailing-edge throttle.
///
/// The first hit in a quiet period fires at once. Further hits inside the
/// window are coalesced into a single trailing fire at the window's end.
#[derive(Debug, Clone)]
pub struct Throttle {
	window: Duration,
	last_fire: Option<Instant>,
	trailing: bool,
}

impl Throttle {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			last_fire: None,
			trailing: false,
		}
	}

	/// Records a hit. Returns `true` if it fires immediately.
	pub fn hit(&mut self, now: Instant) -> bool {
		let quiet = self.last_fire.is_none_or(|last| now.saturating_duration_since(last) >= self.window);
		if quiet {
			self.last_fire = Some(now);
			self.trailing = false;
			true
		} else {
			self.trailing = true;
			false
		}
	}

	/// When the pending trailing fire is due, if one is pending.
	pub fn deadline(&self) -> Option<Instant> {
		if !self.trailing {
			return None;
		}
		self.last_fire.map(|last| last + self.window)
	}

	/// Fires the trailing edge if it is due. Returns `true` if it fired.
	pub fn flush(&mut self, now: Instant) -> bool {
		match self.deadline() {
			Some(due) if now >= due => {
				self.trailing = false;
				self.last_fire = Some(now);
				true
			}
			_ => false,
		}
	}
}

/// Height model for one editor.
#[derive(Debug, Clone)]
pub struct AutoHeight {
	line_height_px: u32,
	max_height_px: u32,
	line_count: u32,
	throttle: Throttle,
}

impl AutoHeight {
	pub fn new(line_height_px: u32, max_height_px: u32, throttle: Duration) -> Self {
		Self {
			line_height_px,
			max_height_px,
			line_count: 0,
			throttle: Throttle::new(throttle),
		}
	}

	pub fn from_config(config: &EditorConfig) -> Self {
		Self::new(config.line_height_px, config.max_height_px, config.resize_throttle())
	}

	/// Height for `line_count` visual lines.
	pub fn height_for(&self, line_count: u32) -> u32 {
		line_count.saturating_mul(self.line_height_px).min(self.max_height_px)
	}

	/// Records a line count announced by the widget and returns the new height.
	pub fn announce_lines(&mut self, line_count: u32) -> u32 {
		self.line_count = line_count;
		self.height_px()
	}

	pub fn height_px(&self) -> u32 {
		self.height_for(self.line_count)
	}

	pub fn line_count(&self) -> u32 {
		self.line_count
	}

	/// Handles a container resize.
	///
	/// If the throttle lets it through, `relayout` runs and its returned line
	/// count is announced. Returns the new height when a relayout happened.
	pub fn on_resize(&mut self, now: Instant, relayout: impl FnOnce() -> u32) -> Option<u32> {
		if !self.throttle.hit(now) {
			trace!("editor.resize.coalesced");
			return None;
		}
		Some(self.announce_lines(relayout()))
	}

	/// Runs the trailing relayout if one is due.
	pub fn flush(&mut self, now: Instant, relayout: impl FnOnce() -> u32) -> Option<u32> {
		if !self.throttle.flush(now) {
			return None;
		}
		Some(self.announce_lines(relayout()))
	}

	/// When [`Self::flush`] should next be called.
	pub fn next_flush(&self) -> Option<Instant> {
		self.throttle.deadline()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const WINDOW: Duration = Duration::from_millis(50);

	#[test]
	fn height_tracks_lines_up_to_the_ceiling() {
		let mut model = AutoHeight::from_config(&EditorConfig::default());
		assert_eq!(model.announce_lines(3), 66);
		assert_eq!(model.announce_lines(25), 550);
		assert_eq!(model.announce_lines(26), 560);
		assert_eq!(model.announce_lines(10_000), 560);
		assert_eq!(model.announce_lines(0), 0);
	}

	#[test]
	fn throttle_fires_leading_and_trailing() {
		let start = Instant::now();
		let mut throttle = Throttle::new(WINDOW);

		assert!(throttle.hit(start));
		assert!(!throttle.hit(start + Duration::from_millis(10)));
		assert!(!throttle.hit(start + Duration::from_millis(20)));
		assert_eq!(throttle.deadline(), Some(start + WINDOW));

		assert!(!throttle.flush(start + Duration::from_millis(49)));
		assert!(throttle.flush(start + WINDOW));
		assert!(!throttle.flush(start + WINDOW * 2));
		assert_eq!(throttle.deadline(), None);

		assert!(throttle.hit(start + WINDOW * 3));
	}

	#[test]
	fn resize_relayouts_and_reannounces() {
		let start = Instant::now();
		let mut model = AutoHeight::new(20, 1000, WINDOW);
		model.announce_lines(4);

		assert_eq!(model.on_resize(start, || 6), Some(120));
		assert_eq!(model.on_resize(start + Duration::from_millis(5), || unreachable!()), None);
		assert_eq!(model.next_flush(), Some(start + WINDOW));
		assert_eq!(model.flush(start + WINDOW, || 9), Some(180));
		assert_eq!(model.line_count(), 9);
	}
}
