//! Keeps the external schema registry in step with one editor instance.
//!
//! Each instance contributes at most one mapping, keyed by its document URI.
//! Other instances write to the same registry concurrently, so every tick
//! re-reads a fresh snapshot, computes the desired contents from it, and only
//! writes when the result differs structurally from what is already there.
//!
//! Registry writes wake every mounted instance. Unless its own inputs changed,
//! an instance woken that way only restores its own mapping when it has been
//! removed. A mapping another instance replaced under the same URI is left to
//! the last writer.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::reactive::{Effect, Observable, Watch, Watchable};
use crate::registry::{DiagnosticsOptions, SchemaMapping, SchemaRegistry};

/// Registry-facing state of one editor instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorBinding {
	/// Document currently shown.
	pub model_uri: Option<String>,
	/// URI of the mapping this instance last installed.
	pub registered_schema_uri: Option<String>,
	/// Schema last applied.
	pub schema: Option<Arc<Value>>,
}

#[derive(Debug, Default)]
struct Slot {
	binding: EditorBinding,
	/// Cleared by unmount under this lock; runs still in flight stop here.
	mounted: bool,
	/// Whether the current mount has reconciled at least once.
	synced: bool,
}

impl Slot {
	/// Whether `uri` and `schema` differ from what was last applied.
	fn inputs_changed(&self, uri: Option<&str>, schema: Option<&Arc<Value>>) -> bool {
		let same_schema = match (self.binding.schema.as_ref(), schema) {
			(None, None) => true,
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		};
		!self.synced || self.binding.model_uri.as_deref() != uri || !same_schema
	}

	/// Whether this instance installed a mapping that is no longer there.
	fn own_mapping_missing(&self, registry: &dyn SchemaRegistry) -> bool {
		match (self.binding.registered_schema_uri.as_deref(), &self.binding.schema) {
			(Some(uri), Some(_)) => registry.diagnostics_options().mapping(uri).is_none(),
			_ => false,
		}
	}
}

/// Lifecycle state of a [`SchemaSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
	Unmounted,
	MountedNoDocument,
	MountedWithDocument,
}

/// Schema registry synchronization for one editor instance.
///
/// Inputs are set through [`Self::set_document`] and [`Self::set_schema`];
/// while mounted, every change reconciles the registry.
pub struct SchemaSync {
	registry: Arc<dyn SchemaRegistry>,
	model_uri: Observable<Option<String>>,
	schema: Observable<Option<Arc<Value>>>,
	slot: Arc<Mutex<Slot>>,
	effect: Option<Effect>,
}

impl SchemaSync {
	/// Creates an unmounted controller over `registry`.
	pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
		Self {
			registry,
			model_uri: Observable::new(None),
			schema: Observable::new(None),
			slot: Arc::new(Mutex::new(Slot::default())),
			effect: None,
		}
	}

	/// Starts reconciling. Runs one tick immediately.
	pub fn mount(&mut self) {
		if self.effect.is_some() {
			return;
		}

		let registry = Arc::clone(&self.registry);
		let model_uri = self.model_uri.clone();
		let schema = self.schema.clone();
		let slot = Arc::clone(&self.slot);
		let registry_dep = RegistryDep(Arc::clone(&self.registry));
		{
			let mut slot = slot.lock();
			slot.mounted = true;
			slot.synced = false;
		}

		self.effect = Some(Effect::new(&[&self.model_uri, &self.schema, &registry_dep], move || {
			let uri = model_uri.get();
			let schema = schema.get();
			let mut slot = slot.lock();
			if !slot.mounted {
				return;
			}
			if !slot.inputs_changed(uri.as_deref(), schema.as_ref()) && !slot.own_mapping_missing(&*registry) {
				trace!("schema_sync.skip");
				return;
			}
			reconcile(&*registry, &mut slot.binding, uri.as_deref(), schema.as_ref());
			slot.synced = true;
		}));
		debug!("schema_sync.mount");
	}

	/// Stops reconciling and removes this instance's mapping, if any.
	pub fn unmount(&mut self) {
		let Some(effect) = self.effect.take() else {
			return;
		};
		effect.dispose();

		let mut slot = self.slot.lock();
		slot.mounted = false;
		if let Some(uri) = slot.binding.registered_schema_uri.take() {
			let current = self.registry.diagnostics_options();
			let mut desired = current.clone();
			desired.schemas.retain(|m| m.uri != uri);
			commit(&*self.registry, &current, desired);
		}
		debug!("schema_sync.unmount");
	}

	/// Sets the active document.
	pub fn set_document(&self, uri: Option<String>) {
		self.model_uri.set(uri);
	}

	/// Sets the schema for the active document.
	pub fn set_schema(&self, schema: Option<Arc<Value>>) {
		self.schema.set(schema);
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SyncState {
		if self.effect.is_none() {
			SyncState::Unmounted
		} else if self.model_uri.get().is_some() {
			SyncState::MountedWithDocument
		} else {
			SyncState::MountedNoDocument
		}
	}

	/// Snapshot of the registry-facing state.
	pub fn binding(&self) -> EditorBinding {
		self.slot.lock().binding.clone()
	}
}

impl Drop for SchemaSync {
	fn drop(&mut self) {
		self.unmount();
	}
}

impl std::fmt::Debug for SchemaSync {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SchemaSync")
			.field("state", &self.state())
			.field("binding", &self.slot.lock().binding)
			.finish()
	}
}

struct RegistryDep(Arc<dyn SchemaRegistry>);

impl Watchable for RegistryDep {
	fn watch(&self, callback: Arc<dyn Fn() + Send + Sync>) -> Watch {
		self.0.watch(callback)
	}
}

/// Runs one reconciliation tick against a fresh registry snapshot.
///
/// Returns `true` if the registry was written.
pub fn reconcile(
	registry: &dyn SchemaRegistry,
	binding: &mut EditorBinding,
	model_uri: Option<&str>,
	schema: Option<&Arc<Value>>,
) -> bool {
	let current = registry.diagnostics_options();
	let mut schemas = current.schemas.clone();

	if let Some(uri) = model_uri {
		match schema {
			Some(schema) => upsert(&mut schemas, uri, schema),
			None => schemas.retain(|m| m.uri != uri),
		}
	}

	if let Some(previous) = binding.registered_schema_uri.as_deref() {
		if model_uri != Some(previous) {
			schemas.retain(|m| m.uri != previous);
		}
	}

	let desired = DiagnosticsOptions {
		validate: true,
		schemas,
		..current.clone()
	};
	let written = commit(registry, &current, desired);

	binding.model_uri = model_uri.map(str::to_string);
	binding.registered_schema_uri = model_uri.map(str::to_string);
	binding.schema = schema.cloned();
	written
}

fn upsert(schemas: &mut Vec<SchemaMapping>, uri: &str, schema: &Arc<Value>) {
	let existing = schemas.iter().position(|m| m.uri == uri);
	if let Some(idx) = existing {
		if schemas[idx].schema.as_ref().is_some_and(|s| Arc::ptr_eq(s, schema)) {
			return;
		}
	}

	let mapping = SchemaMapping {
		uri: uri.to_string(),
		file_match: vec![uri.to_string()],
		schema: Some(Arc::clone(schema)),
	};
	match existing {
		Some(idx) => schemas[idx] = mapping,
		None => schemas.push(mapping),
	}
}

fn commit(registry: &dyn SchemaRegistry, current: &DiagnosticsOptions, desired: DiagnosticsOptions) -> bool {
	if *current == desired {
		trace!("schema_sync.unchanged");
		return false;
	}
	debug!(schemas = desired.schemas.len(), validate = desired.validate, "schema_sync.commit");
	registry.set_diagnostics_options(desired);
	true
}
