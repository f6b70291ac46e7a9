//! Courier command line driver.
//!
//! Starts one background context and runs a single operation through it:
//! - `decode`: undo content codings on a file
//! - `test-encodings`: report a file's size under each coding
//! - `build-api`: normalize an OpenAPI document
//! - `schema-demo`: sync a schema into an in-memory registry and tear it down

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use courier_config::{Config, LogLevel};
use courier_editor::{AutoHeight, DiagnosticsOptions, InMemorySchemaRegistry, SchemaRegistry, SchemaSync};
use courier_rpc::TransferableBuffer;
use courier_worker::{WorkerApi, spawn_background};
use serde_json::{Value, json};
use tracing::info;

/// Courier command line arguments.
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Run background decoding, encoding size checks and schema sync")]
struct Args {
	/// Configuration file (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Decode a body encoded with the given content codings
	Decode {
		/// Encoded input file
		input: PathBuf,
		/// Content codings in the order they were applied
		#[arg(short, long = "encoding", value_delimiter = ',')]
		encodings: Vec<String>,
		/// Write the decoded body here instead of stdout
		#[arg(short, long, value_name = "PATH")]
		output: Option<PathBuf>,
	},
	/// Print the size of a file under each known content coding
	TestEncodings {
		/// Decoded input file
		input: PathBuf,
	},
	/// Print normalized metadata for an OpenAPI document (JSON)
	BuildApi {
		/// OpenAPI document
		spec: PathBuf,
		/// Resolve a request against the operations, e.g. `GET /pets/1`
		#[arg(long, num_args = 2, value_names = ["METHOD", "PATH"])]
		find: Option<Vec<String>>,
	},
	/// Register a schema for a document, print the registry, then unmount
	SchemaDemo {
		/// JSON schema file
		schema: PathBuf,
		/// Document URI the schema applies to
		#[arg(long, default_value = "inmemory://model/1")]
		document: String,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();
	let config = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if args.verbose {
			tracing::Level::DEBUG
		} else {
			level(config.log.level)
		})
		.with_writer(std::io::stderr)
		.finish();

	tracing::subscriber::set_global_default(subscriber)?;

	info!(thread = %config.worker.thread_name, "courier.start");
	let (api, handle) = spawn_background(&config.worker.thread_name)?;

	let result = run(&api, &config, args.command).await;

	drop(api);
	tokio::task::spawn_blocking(move || handle.join()).await?;
	result
}

async fn run(api: &WorkerApi, config: &Config, command: Command) -> Result<(), Box<dyn std::error::Error>> {
	let mut stdout = std::io::stdout();
	match command {
		Command::Decode {
			input,
			encodings,
			output,
		} => {
			let mut body = TransferableBuffer::from(std::fs::read(&input)?);
			let out = api.decode_body(&mut body, &encodings).await?;
			info!(encoded = out.encoded.len(), decoded = out.decoded.len(), "courier.decode");
			match output {
				Some(path) => std::fs::write(path, out.decoded.as_bytes())?,
				None => stdout.write_all(out.decoded.as_bytes())?,
			}
		}
		Command::TestEncodings { input } => {
			let body = TransferableBuffer::from(std::fs::read(&input)?);
			let sizes = api.test_encodings(&body).await?;
			serde_json::to_writer_pretty(&mut stdout, &sizes)?;
			writeln!(stdout)?;
		}
		Command::BuildApi { spec, find } => {
			let document: Value = serde_json::from_slice(&std::fs::read(&spec)?)?;
			let metadata = api.build_api_metadata(document).await?;
			match find.as_deref() {
				Some([method, path]) => match metadata.find_operation(method, path) {
					Some(op) => serde_json::to_writer_pretty(&mut stdout, op)?,
					None => return Err(format!("no operation matches {method} {path}").into()),
				},
				_ => serde_json::to_writer_pretty(&mut stdout, &metadata)?,
			}
			writeln!(stdout)?;
		}
		Command::SchemaDemo { schema, document } => {
			let schema: Value = serde_json::from_slice(&std::fs::read(&schema)?)?;
			let pretty = serde_json::to_string_pretty(&schema)?;
			let mut sizing = AutoHeight::from_config(&config.editor);
			let height = sizing.announce_lines(line_count(&pretty));

			let registry = Arc::new(InMemorySchemaRegistry::default());
			let mut sync = SchemaSync::new(registry.clone());
			sync.set_document(Some(document));
			sync.set_schema(Some(Arc::new(schema)));
			sync.mount();

			let mounted = describe(&registry.diagnostics_options());
			sync.unmount();
			let report = json!({
				"heightPx": height,
				"mounted": mounted,
				"unmounted": describe(&registry.diagnostics_options()),
				"writes": registry.writes(),
			});
			serde_json::to_writer_pretty(&mut stdout, &report)?;
			writeln!(stdout)?;
		}
	}
	Ok(())
}

fn line_count(text: &str) -> u32 {
	u32::try_from(text.lines().count()).unwrap_or(u32::MAX)
}

fn describe(options: &DiagnosticsOptions) -> Value {
	let schemas: Vec<Value> = options
		.schemas
		.iter()
		.map(|m| {
			json!({
				"uri": m.uri,
				"fileMatch": m.file_match,
				"schema": m.schema.as_deref(),
			})
		})
		.collect();
	json!({
		"validate": options.validate,
		"allowComments": options.allow_comments,
		"schemas": schemas,
	})
}

fn level(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Error => tracing::Level::ERROR,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Trace => tracing::Level::TRACE,
	}
}
