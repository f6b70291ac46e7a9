//! Widget options with the wrapper's defaults.

use serde::{Deserialize, Serialize};

/// When fold controls are shown in the gutter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldingControls {
	#[default]
	Always,
	Mouseover,
	Never,
}

/// Line wrapping mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordWrap {
	#[default]
	On,
	Off,
}

/// Options handed to the widget, serialized in its camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
	pub read_only: bool,
	pub show_folding_controls: FoldingControls,
	pub quick_suggestions: bool,
	pub parameter_hints: bool,
	pub code_lens: bool,
	pub minimap: bool,
	pub context_menu: bool,
	pub scroll_beyond_last_line: bool,
	pub font_size: u16,
	pub word_wrap: WordWrap,
}

impl Default for EditorOptions {
	fn default() -> Self {
		Self {
			read_only: false,
			show_folding_controls: FoldingControls::Always,
			quick_suggestions: false,
			parameter_hints: false,
			code_lens: false,
			minimap: false,
			context_menu: false,
			scroll_beyond_last_line: false,
			font_size: 16,
			word_wrap: WordWrap::On,
		}
	}
}

/// Caller overrides; unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EditorOverrides {
	pub read_only: Option<bool>,
	pub show_folding_controls: Option<FoldingControls>,
	pub quick_suggestions: Option<bool>,
	pub parameter_hints: Option<bool>,
	pub code_lens: Option<bool>,
	pub minimap: Option<bool>,
	pub context_menu: Option<bool>,
	pub scroll_beyond_last_line: Option<bool>,
	pub font_size: Option<u16>,
	pub word_wrap: Option<WordWrap>,
}

impl EditorOptions {
	/// Defaults with `overrides` applied on top.
	pub fn merged(overrides: &EditorOverrides) -> Self {
		let d = Self::default();
		Self {
			read_only: overrides.read_only.unwrap_or(d.read_only),
			show_folding_controls: overrides.show_folding_controls.unwrap_or(d.show_folding_controls),
			quick_suggestions: overrides.quick_suggestions.unwrap_or(d.quick_suggestions),
			parameter_hints: overrides.parameter_hints.unwrap_or(d.parameter_hints),
			code_lens: overrides.code_lens.unwrap_or(d.code_lens),
			minimap: overrides.minimap.unwrap_or(d.minimap),
			context_menu: overrides.context_menu.unwrap_or(d.context_menu),
			scroll_beyond_last_line: overrides.scroll_beyond_last_line.unwrap_or(d.scroll_beyond_last_line),
			font_size: overrides.font_size.unwrap_or(d.font_size),
			word_wrap: overrides.word_wrap.unwrap_or(d.word_wrap),
		}
	}

	/// Editable editors trap focus inside a wrapper so Tab stays in the editor.
	pub fn needs_focus_wrapper(&self) -> bool {
		!self.read_only
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn overrides_apply_over_defaults() {
		let overrides: EditorOverrides = serde_json::from_value(json!({ "readOnly": true, "fontSize": 12 })).unwrap();
		let options = EditorOptions::merged(&overrides);

		assert!(options.read_only);
		assert_eq!(options.font_size, 12);
		assert_eq!(options.word_wrap, WordWrap::On);
		assert!(!options.needs_focus_wrapper());
		assert!(EditorOptions::default().needs_focus_wrapper());
	}

	#[test]
	fn serializes_in_widget_shape() {
		let wire = serde_json::to_value(EditorOptions::default()).unwrap();
		assert_eq!(wire["showFoldingControls"], json!("always"));
		assert_eq!(wire["scrollBeyondLastLine"], json!(false));
		assert_eq!(wire["fontSize"], json!(16));
		assert_eq!(wire["wordWrap"], json!("on"));
	}

	#[test]
	fn unknown_override_keys_are_rejected() {
		assert!(serde_json::from_value::<EditorOverrides>(json!({ "theme": "dark" })).is_err());
	}
}
