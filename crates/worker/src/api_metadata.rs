//! Normalized metadata for OpenAPI documents.

use std::fmt;

use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

const METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Errors raised while building API metadata.
#[derive(Debug, Error)]
pub enum ApiError {
	/// The document is not a usable OpenAPI document.
	#[error("invalid OpenAPI spec: {0}")]
	InvalidSpec(String),

	/// A path template could not be turned into a matcher.
	#[error("invalid path template {path:?}")]
	InvalidPath {
		/// The offending template.
		path: String,
		/// Regex compilation failure.
		#[source]
		source: regex::Error,
	},
}

/// Normalized description of an API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
	/// `info.title`.
	pub title: String,
	/// `info.version`.
	pub version: String,
	/// Server base URLs; `/` when the document lists none.
	pub servers: Vec<String>,
	/// Operations, most specific path first.
	pub operations: Vec<OperationMetadata>,
}

impl ApiMetadata {
	/// Finds the first operation matching `method` and a server-relative `path`.
	pub fn find_operation(&self, method: &str, path: &str) -> Option<&OperationMetadata> {
		let path = path.split(['?', '#']).next().unwrap_or(path);
		self.operations
			.iter()
			.find(|op| op.method.eq_ignore_ascii_case(method) && op.matcher.is_match(path))
	}
}

/// One operation of an API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
	/// Upper-case HTTP method.
	pub method: String,
	/// Path template, e.g. `/pets/{petId}`.
	pub path: String,
	/// `operationId`, if declared.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub operation_id: Option<String>,
	/// Operation summary, falling back to the path item summary.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
	/// Matcher for concrete request paths.
	pub matcher: PathMatcher,
}

/// Anchored matcher for a path template where `{param}` matches one segment.
#[derive(Clone)]
pub struct PathMatcher(Regex);

impl PathMatcher {
	/// Compiles a path template.
	pub fn from_template(template: &str) -> Result<Self, ApiError> {
		let mut pattern = String::from("^");
		let mut rest = template;
		while let Some(open) = rest.find('{') {
			let Some(close) = rest[open..].find('}') else {
				break;
			};
			pattern.push_str(&regex::escape(&rest[..open]));
			pattern.push_str("[^/]+");
			rest = &rest[open + close + 1..];
		}
		pattern.push_str(&regex::escape(rest));
		pattern.push('$');
		Self::from_pattern(&pattern).map_err(|source| ApiError::InvalidPath {
			path: template.to_string(),
			source,
		})
	}

	fn from_pattern(pattern: &str) -> Result<Self, regex::Error> {
		Regex::new(pattern).map(Self)
	}

	/// Returns `true` if `path` matches the template.
	pub fn is_match(&self, path: &str) -> bool {
		self.0.is_match(path)
	}

	/// The compiled regular expression source.
	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl fmt::Debug for PathMatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("PathMatcher").field(&self.as_str()).finish()
	}
}

impl PartialEq for PathMatcher {
	fn eq(&self, other: &Self) -> bool {
		self.as_str() == other.as_str()
	}
}

impl Serialize for PathMatcher {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for PathMatcher {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let pattern = String::deserialize(deserializer)?;
		Self::from_pattern(&pattern).map_err(de::Error::custom)
	}
}

/// Builds normalized metadata from an OpenAPI document.
pub fn build_api_metadata(spec: &JsonValue) -> Result<ApiMetadata, ApiError> {
	let root = spec
		.as_object()
		.ok_or_else(|| ApiError::InvalidSpec("document is not an object".into()))?;
	let info = object_field(root, "info")?;
	let paths = object_field(root, "paths")?;

	let title = string_field(info, "title").unwrap_or_default();
	let version = string_field(info, "version").unwrap_or_default();

	let mut servers: Vec<String> = root
		.get("servers")
		.and_then(JsonValue::as_array)
		.map(|list| {
			list.iter()
				.filter_map(|server| server.get("url").and_then(JsonValue::as_str))
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default();
	if servers.is_empty() {
		servers.push("/".to_string());
	}

	let mut operations = Vec::new();
	for (path, item) in paths {
		let Some(item) = item.as_object() else {
			continue;
		};
		let item_summary = string_field(item, "summary");
		for method in METHODS {
			let Some(op) = item.get(method).and_then(JsonValue::as_object) else {
				continue;
			};
			operations.push(OperationMetadata {
				method: method.to_ascii_uppercase(),
				path: path.clone(),
				operation_id: string_field(op, "operationId"),
				summary: string_field(op, "summary").or_else(|| item_summary.clone()),
				matcher: PathMatcher::from_template(path)?,
			});
		}
	}

	operations.sort_by(|a, b| {
		literal_segments(&b.path)
			.cmp(&literal_segments(&a.path))
			.then_with(|| a.path.cmp(&b.path))
			.then_with(|| a.method.cmp(&b.method))
	});

	Ok(ApiMetadata {
		title,
		version,
		servers,
		operations,
	})
}

fn object_field<'a>(obj: &'a Map<String, JsonValue>, key: &str) -> Result<&'a Map<String, JsonValue>, ApiError> {
	obj.get(key)
		.and_then(JsonValue::as_object)
		.ok_or_else(|| ApiError::InvalidSpec(format!("missing `{key}` object")))
}

fn string_field(obj: &Map<String, JsonValue>, key: &str) -> Option<String> {
	obj.get(key).and_then(JsonValue::as_str).map(str::to_string)
}

fn literal_segments(path: &str) -> usize {
	path.split('/').filter(|seg| !seg.is_empty() && !seg.contains('{')).count()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn petstore() -> JsonValue {
		json!({
			"openapi": "3.0.0",
			"info": { "title": "Petstore", "version": "1.0.0" },
			"servers": [{ "url": "https://petstore.example.com/v1" }],
			"paths": {
				"/pets/{petId}": {
					"summary": "A single pet",
					"get": { "operationId": "showPetById" },
					"delete": { "operationId": "deletePet", "summary": "Remove a pet" }
				},
				"/pets/mine": {
					"get": { "operationId": "listMyPets" }
				},
				"/pets": {
					"get": { "operationId": "listPets" },
					"post": { "operationId": "createPets" },
					"parameters": []
				}
			}
		})
	}

	#[test]
	fn builds_operations_from_paths() {
		let api = build_api_metadata(&petstore()).unwrap();
		assert_eq!(api.title, "Petstore");
		assert_eq!(api.version, "1.0.0");
		assert_eq!(api.servers, vec!["https://petstore.example.com/v1".to_string()]);

		let ids: Vec<_> = api.operations.iter().map(|op| op.operation_id.as_deref().unwrap()).collect();
		assert_eq!(ids, vec!["listMyPets", "listPets", "createPets", "deletePet", "showPetById"]);
	}

	#[test]
	fn literal_paths_win_over_templates() {
		let api = build_api_metadata(&petstore()).unwrap();
		let mine = api.find_operation("get", "/pets/mine").unwrap();
		assert_eq!(mine.operation_id.as_deref(), Some("listMyPets"));

		let one = api.find_operation("GET", "/pets/42?verbose=true").unwrap();
		assert_eq!(one.operation_id.as_deref(), Some("showPetById"));
		assert_eq!(one.summary.as_deref(), Some("A single pet"));

		assert!(api.find_operation("GET", "/pets/42/toys").is_none());
		assert!(api.find_operation("PATCH", "/pets").is_none());
	}

	#[test]
	fn missing_servers_default_to_root() {
		let api = build_api_metadata(&json!({ "info": {}, "paths": {} })).unwrap();
		assert_eq!(api.servers, vec!["/".to_string()]);
		assert!(api.operations.is_empty());
	}

	#[test]
	fn rejects_documents_without_paths() {
		let err = build_api_metadata(&json!({ "info": { "title": "x" } })).unwrap_err();
		assert!(matches!(err, ApiError::InvalidSpec(ref msg) if msg.contains("paths")));
		assert!(matches!(build_api_metadata(&json!([])), Err(ApiError::InvalidSpec(_))));
	}

	#[test]
	fn template_characters_are_escaped() {
		let matcher = PathMatcher::from_template("/v1.0/items/{id}.json").unwrap();
		assert!(matcher.is_match("/v1.0/items/7.json"));
		assert!(!matcher.is_match("/v1x0/items/7.json"));
	}

	#[test]
	fn metadata_survives_serialization() {
		let api = build_api_metadata(&petstore()).unwrap();
		let wire = serde_json::to_value(&api).unwrap();
		let back: ApiMetadata = serde_json::from_value(wire).unwrap();
		assert_eq!(back, api);
		assert!(back.find_operation("POST", "/pets").is_some());
	}
}
