//! JSON:API document shapes consumed by the client.
//!
//! Only the parts the transport needs are modelled: single-resource documents
//! (`data.type`, `data.id`, `data.attributes`) and error documents whose
//! `source.pointer` values are folded into per-field messages.

// self
use crate::_prelude::*;

/// JSON:API media type negotiated on every request.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Key used by [`ErrorDocument::field_errors`] for errors without a field pointer.
pub const BASE_FIELD: &str = "base";

/// Messages grouped by the attribute (or relationship) they refer to.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Top-level document with a single primary resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<A> {
	/// Primary resource.
	pub data: Resource<A>,
	/// Free-form meta object.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<serde_json::Value>,
}

/// Resource object carrying typed attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource<A> {
	/// Resource type name.
	#[serde(rename = "type")]
	pub kind: String,
	/// Resource identifier; absent on client-generated payloads.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Typed attribute object.
	pub attributes: A,
}
impl<A> Resource<A> {
	/// Creates a resource without an identifier, as used for create payloads.
	pub fn new(kind: impl Into<String>, attributes: A) -> Self {
		Self { kind: kind.into(), id: None, attributes }
	}

	/// Attaches an identifier.
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());

		self
	}

	/// Wraps the resource into a top-level document.
	pub fn into_document(self) -> Document<A> {
		Document { data: self, meta: None }
	}
}

/// Error document returned for failed requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
	/// Individual error objects.
	#[serde(default)]
	pub errors: Vec<ErrorObject>,
}
impl ErrorDocument {
	/// Parses a response body, returning `None` when it is not a non-empty error document.
	pub fn parse(body: &[u8]) -> Option<Self> {
		serde_json::from_slice::<Self>(body).ok().filter(|doc| !doc.errors.is_empty())
	}

	/// Groups error messages by the field their `source.pointer` targets.
	///
	/// `/data/attributes/<field>` and `/data/relationships/<field>` map to `<field>`;
	/// nested pointers keep their remaining segments joined by `.`. Errors without a
	/// pointer (or with one outside the resource) land under [`BASE_FIELD`].
	pub fn field_errors(&self) -> FieldErrors {
		let mut fields = FieldErrors::new();

		for error in &self.errors {
			let Some(message) = error.message() else {
				continue;
			};
			let field = error
				.source
				.as_ref()
				.and_then(|source| source.pointer.as_deref())
				.and_then(pointer_field)
				.unwrap_or_else(|| BASE_FIELD.to_owned());

			fields.entry(field).or_default().push(message.to_owned());
		}

		fields
	}
}

/// Single JSON:API error object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
	/// HTTP status as a string, per the JSON:API format.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	/// Application-specific error code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Short summary.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Occurrence-specific explanation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
	/// Location of the offending value in the request document.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<ErrorSource>,
}
impl ErrorObject {
	/// Returns the most specific human-readable message (detail, then title).
	pub fn message(&self) -> Option<&str> {
		self.detail.as_deref().or(self.title.as_deref()).filter(|msg| !msg.trim().is_empty())
	}
}

/// `source` member of an error object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
	/// JSON pointer (RFC 6901) into the request document.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pointer: Option<String>,
	/// Query parameter that caused the error.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parameter: Option<String>,
}

fn pointer_field(pointer: &str) -> Option<String> {
	let mut segments = pointer.strip_prefix('/')?.split('/').map(unescape_segment);

	if segments.next()? != "data" {
		return None;
	}

	match segments.next()?.as_str() {
		"attributes" | "relationships" => {},
		_ => return None,
	}

	let rest = segments.filter(|segment| !segment.is_empty()).collect::<Vec<_>>();

	if rest.is_empty() { None } else { Some(rest.join(".")) }
}

fn unescape_segment(segment: &str) -> String {
	segment.replace("~1", "/").replace("~0", "~")
}
