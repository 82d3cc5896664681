use thiserror::Error;

/// Errors raised while encoding a sum value. No partial output survives one.
#[derive(Error, Debug)]
pub enum EncodeError {
	/// The value is empty and the sum was declared with `NoZero`.
	#[error("empty value is not allowed for sum {sum}")]
	EmptyRejected { sum: &'static str },
	/// The dynamic type is not a variant of a sealed sum.
	#[error("{variant} is not a declared variant of sealed sum {sum}")]
	Undeclared { sum: &'static str, variant: &'static str },
	/// Internal tagging needs the payload to be a JSON object.
	#[error("cannot internally tag non-object payload of {variant} in sum {sum}")]
	NonObjectPayload { sum: &'static str, variant: &'static str },
	/// The generic encoder failed on the payload.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
}

/// A failed decode, with enough context to locate the problem in the input.
#[derive(Error, Debug)]
#[error("cannot decode {value} as {sum} at offset {offset}: {kind}")]
pub struct DecodeError {
	/// Short description of the offending value (a tag, a key, or a fragment).
	pub value: String,
	/// Rust type name of the target sum.
	pub sum: &'static str,
	/// Byte offset into the input.
	pub offset: usize,
	pub kind: DecodeErrorKind,
}

/// Why a decode failed.
#[derive(Error, Debug)]
pub enum DecodeErrorKind {
	#[error("untagged sums cannot be decoded")]
	Untagged,
	#[error("sum type is not declared")]
	Undeclared,
	#[error("empty value is not allowed")]
	EmptyRejected,
	#[error("invalid externally tagged object: extra key {0:?}")]
	ExtraKey(String),
	#[error("invalid externally tagged object: no key")]
	EmptyObject,
	#[error("missing tag field {0:?}")]
	MissingTag(String),
	#[error("cannot unquote tag field {0:?}")]
	MalformedTag(String),
	#[error("missing content field {0:?}")]
	MissingContent(String),
	#[error("unknown variant tag {0:?}")]
	UnknownTag(String),
	#[error("malformed input: {0}")]
	Syntax(serde_json::Error),
	#[error("input is not valid UTF-8: {0}")]
	Utf8(std::str::Utf8Error),
	#[error("invalid payload for {variant}: {message}")]
	Payload { variant: &'static str, message: String },
}
