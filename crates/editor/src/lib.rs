#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Self-sizing code editor wrapper with schema validation sync.
//!
//! # Main Types
//!
//! - [`SchemaSync`] - Keeps the shared [`SchemaRegistry`] in step with one editor instance
//! - [`EditorLoader`] / [`EditorHost`] - Lazy widget loading with bounded retries
//! - [`AutoHeight`] - Height derived from the widget's visual line count
//! - [`MarkerVisible`] - Keeps validation markers visible in read-only editors
//!
//! # Architecture
//!
//! ```text
//! SchemaSync
//! ├── model_uri: Observable<Option<String>>   // active document
//! ├── schema: Observable<Option<Arc<Value>>>  // schema prop
//! └── effect: Effect                          // re-runs on either, or on registry writes
//!        └── reconcile() -> SchemaRegistry    // fresh read, diffed whole-value write
//! ```

pub mod error;
pub mod loader;
pub mod markers;
pub mod options;
pub mod reactive;
pub mod registry;
pub mod schema_sync;
pub mod sizing;

pub use error::LoadError;
pub use loader::{EditorHost, EditorLoader, ErrorReporter, LoadPolicy, RenderedEditor, WidgetLoader};
pub use markers::{Decoration, DecorationKind, DecorationSet, DecorationSource, MarkerVisible};
pub use options::{EditorOptions, EditorOverrides, FoldingControls, WordWrap};
pub use reactive::{Effect, Notifier, Observable, Watch, Watchable};
pub use registry::{DiagnosticsOptions, InMemorySchemaRegistry, SchemaMapping, SchemaRegistry};
pub use schema_sync::{EditorBinding, SchemaSync, SyncState, reconcile};
pub use sizing::{AutoHeight, Throttle};
