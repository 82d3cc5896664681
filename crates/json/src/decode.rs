//! Tagged decoder.
//!
//! # Role
//!
//! Inverse of [`crate::encode`] for the decodable strategies. The top-level
//! object is scanned once into deferred fields ([`RawObject`]); the
//! discriminant is resolved against the declaration, and only then is the
//! payload handed to the variant's cached decode hook.
//!
//! # Invariants
//!
//! - A failure yields `Err` and no value.
//! - Every [`DecodeError`] carries a byte offset into the caller's input: the
//!   offending fragment for structural errors, the parser position for
//!   syntax errors.

use std::any::type_name;

use serde_json::value::RawValue;
use tagsum_core::{Declaration, Registry, Sum, Tagging, VariantEntry};

use crate::error::{DecodeError, DecodeErrorKind};
use crate::raw::{RawObject, describe, offset_at, offset_of, unquote};

/// Decodes a value of `S` using the global registry.
pub fn from_str<S: ?Sized + Sum>(input: &str) -> Result<Option<Box<S>>, DecodeError> {
	from_str_in(Registry::global(), input)
}

/// Decodes a value of `S` from UTF-8 bytes using the global registry.
pub fn from_slice<S: ?Sized + Sum>(input: &[u8]) -> Result<Option<Box<S>>, DecodeError> {
	from_slice_in(Registry::global(), input)
}

pub fn from_slice_in<S: ?Sized + Sum>(registry: &Registry, input: &[u8]) -> Result<Option<Box<S>>, DecodeError> {
	let input = std::str::from_utf8(input).map_err(|err| DecodeError {
		value: describe(&String::from_utf8_lossy(input)),
		sum: type_name::<S>(),
		offset: err.valid_up_to(),
		kind: DecodeErrorKind::Utf8(err),
	})?;
	from_str_in(registry, input)
}

/// Decodes a value of `S` using the declaration found in `registry`.
pub fn from_str_in<S: ?Sized + Sum>(registry: &Registry, input: &str) -> Result<Option<Box<S>>, DecodeError> {
	let Some(decl) = registry.lookup::<S>() else {
		return Err(DecodeError {
			value: describe(input),
			sum: type_name::<S>(),
			offset: 0,
			kind: DecodeErrorKind::Undeclared,
		});
	};
	let cx = Context { input, decl: &decl };

	if !decl.tagging().is_decodable() {
		return Err(cx.fail(describe(input), 0, DecodeErrorKind::Untagged));
	}

	let object: Option<RawObject<'_>> = serde_json::from_str(input).map_err(|err| {
		let offset = offset_at(input, err.line(), err.column());
		cx.fail(describe(input), offset, DecodeErrorKind::Syntax(err))
	})?;
	let Some(object) = object else {
		if decl.rejects_empty() {
			return Err(cx.fail("null".to_owned(), cx.start(), DecodeErrorKind::EmptyRejected));
		}
		return Ok(None);
	};

	tracing::trace!(sum = decl.sum_name(), tagging = ?decl.tagging(), fields = object.fields.len(), "decoding tagged value");
	let value = match decl.tagging() {
		Tagging::Externally => cx.externally(&object)?,
		Tagging::Adjacently { tag, content } => cx.adjacently(&object, tag, content)?,
		Tagging::Internally { tag } => cx.internally(&object, tag)?,
		Tagging::Untagged => return Err(cx.fail(describe(input), 0, DecodeErrorKind::Untagged)),
	};
	Ok(Some(value))
}

struct Context<'a, S: ?Sized> {
	input: &'a str,
	decl: &'a Declaration<S>,
}

impl<'a, S: ?Sized + Sum> Context<'a, S> {
	fn fail(&self, value: String, offset: usize, kind: DecodeErrorKind) -> DecodeError {
		DecodeError {
			value,
			sum: self.decl.sum_name(),
			offset,
			kind,
		}
	}

	/// Offset of the first non-whitespace byte.
	fn start(&self) -> usize {
		self.input.len() - self.input.trim_start().len()
	}

	fn offset(&self, raw: &RawValue) -> usize {
		offset_of(self.input, raw.get())
	}

	fn entry(&self, name: &str, raw: &RawValue) -> Result<&'a VariantEntry<S>, DecodeError> {
		self.decl
			.variant_named(name)
			.ok_or_else(|| self.fail(name.to_owned(), self.offset(raw), DecodeErrorKind::UnknownTag(name.to_owned())))
	}

	/// Exactly one key. A key repeated on its own collapses to its last
	/// occurrence, as fields do under the other strategies.
	fn externally(&self, object: &RawObject<'_>) -> Result<Box<S>, DecodeError> {
		let (Some((name, _)), Some((_, raw))) = (object.fields.first(), object.fields.last()) else {
			return Err(self.fail(describe(self.input), self.start(), DecodeErrorKind::EmptyObject));
		};
		if let Some((extra, extra_raw)) = object.fields.iter().find(|(key, _)| key != name) {
			return Err(self.fail(extra.clone(), self.offset(extra_raw), DecodeErrorKind::ExtraKey(extra.clone())));
		}
		let entry = self.entry(name, raw)?;
		self.payload(entry, raw.get(), self.offset(raw))
	}

	fn adjacently(&self, object: &RawObject<'_>, tag: &str, content: &str) -> Result<Box<S>, DecodeError> {
		let entry = self.tagged_entry(object, tag)?;
		let Some(raw) = object.get(content) else {
			return Err(self.fail(
				describe(self.input),
				self.start(),
				DecodeErrorKind::MissingContent(content.to_owned()),
			));
		};
		self.payload(entry, raw.get(), self.offset(raw))
	}

	fn internally(&self, object: &RawObject<'_>, tag: &str) -> Result<Box<S>, DecodeError> {
		let entry = self.tagged_entry(object, tag)?;
		let whole = object.reassemble();
		self.payload(entry, &whole, self.start())
	}

	/// Reads and resolves the string discriminant stored under `tag`.
	fn tagged_entry(&self, object: &RawObject<'_>, tag: &str) -> Result<&'a VariantEntry<S>, DecodeError> {
		let Some(raw) = object.get(tag) else {
			return Err(self.fail(describe(self.input), self.start(), DecodeErrorKind::MissingTag(tag.to_owned())));
		};
		let Some(name) = unquote(raw) else {
			return Err(self.fail(
				describe(raw.get()),
				self.offset(raw),
				DecodeErrorKind::MalformedTag(tag.to_owned()),
			));
		};
		self.entry(&name, raw)
	}

	/// Runs the variant's decode hook over one JSON fragment.
	fn payload(&self, entry: &VariantEntry<S>, fragment: &str, offset: usize) -> Result<Box<S>, DecodeError> {
		let mut json = serde_json::Deserializer::from_str(fragment);
		let decoded = entry.decode(&mut <dyn erased_serde::Deserializer>::erase(&mut json));
		let fail = |message: String| {
			self.fail(
				describe(fragment),
				offset,
				DecodeErrorKind::Payload {
					variant: entry.type_name(),
					message,
				},
			)
		};
		let value = decoded.map_err(|err| fail(err.to_string()))?;
		json.end().map_err(|err| fail(err.to_string()))?;
		Ok(value)
	}
}
