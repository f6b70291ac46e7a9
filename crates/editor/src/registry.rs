//! The external JSON schema registry consumed by the editor's diagnostics.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::reactive::{Notifier, Watch, Watchable};

/// Associates documents with a validation schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMapping {
	/// Schema identity; unique within a registry.
	pub uri: String,
	/// Document URIs the schema applies to.
	pub file_match: Vec<String>,
	/// The schema document.
	pub schema: Option<Arc<Value>>,
}

/// Snapshot of the registry's JSON diagnostics settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticsOptions {
	pub validate: bool,
	pub allow_comments: bool,
	pub schemas: Vec<SchemaMapping>,
}

impl DiagnosticsOptions {
	/// Looks up the mapping registered under `uri`.
	pub fn mapping(&self, uri: &str) -> Option<&SchemaMapping> {
		self.schemas.iter().find(|m| m.uri == uri)
	}
}

/// Shared store of diagnostics settings.
///
/// Reads return a snapshot and writes replace the whole value. Watchers are
/// notified after every write.
pub trait SchemaRegistry: Watchable {
	/// Current settings.
	fn diagnostics_options(&self) -> DiagnosticsOptions;

	/// Replaces the settings.
	fn set_diagnostics_options(&self, options: DiagnosticsOptions);
}

/// Process-local [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct InMemorySchemaRegistry {
	options: Mutex<DiagnosticsOptions>,
	notifier: Notifier,
	writes: AtomicUsize,
}

impl InMemorySchemaRegistry {
	pub fn new(initial: DiagnosticsOptions) -> Self {
		Self {
			options: Mutex::new(initial),
			notifier: Notifier::new(),
			writes: AtomicUsize::new(0),
		}
	}

	/// Number of writes since creation.
	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}
}

impl Watchable for InMemorySchemaRegistry {
	fn watch(&self, callback: Arc<dyn Fn() + Send + Sync>) -> Watch {
		self.notifier.watch(callback)
	}
}

impl SchemaRegistry for InMemorySchemaRegistry {
	fn diagnostics_options(&self) -> DiagnosticsOptions {
		self.options.lock().clone()
	}

	fn set_diagnostics_options(&self, options: DiagnosticsOptions) {
		*self.options.lock() = options;
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.notifier.notify();
	}
}
