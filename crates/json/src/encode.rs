//! Tagged encoder.
//!
//! # Role
//!
//! Converts `Option<&S>` into JSON bytes following the tagging strategy of
//! the sum's declaration. The payload itself is produced by `serde_json`
//! through the value's [`Member`] capability; this module only adds the
//! discriminant around (or inside) it.
//!
//! # Invariants
//!
//! - Output is written into a buffer owned by the call; an error drops it, so
//!   callers never observe partial output.
//! - Internal tagging appends the tag field last. A payload that already
//!   carries a field with the tag's name ends up with it twice, and decoders
//!   keep the last one.

use tagsum_core::{Member, Registry, Sum, Tagging, dynamic_type_id};

use crate::error::EncodeError;

/// Encodes `value` using the global registry.
pub fn to_vec<S: ?Sized + Sum>(value: Option<&S>) -> Result<Vec<u8>, EncodeError> {
	to_vec_in(Registry::global(), value)
}

/// Encodes `value` into a `String` using the global registry.
pub fn to_string<S: ?Sized + Sum>(value: Option<&S>) -> Result<String, EncodeError> {
	to_string_in(Registry::global(), value)
}

/// Encodes `value` using the declaration found in `registry`.
pub fn to_vec_in<S: ?Sized + Sum>(registry: &Registry, value: Option<&S>) -> Result<Vec<u8>, EncodeError> {
	let mut out = Vec::with_capacity(128);
	encode_into(registry, value, &mut out)?;
	Ok(out)
}

pub fn to_string_in<S: ?Sized + Sum>(registry: &Registry, value: Option<&S>) -> Result<String, EncodeError> {
	let bytes = to_vec_in(registry, value)?;
	String::from_utf8(bytes).map_err(|err| EncodeError::Json(serde::ser::Error::custom(err)))
}

fn encode_into<S: ?Sized + Sum>(registry: &Registry, value: Option<&S>, out: &mut Vec<u8>) -> Result<(), EncodeError> {
	let Some(decl) = registry.lookup::<S>() else {
		return write_plain(out, value.map(Sum::as_member));
	};

	let Some(value) = value else {
		if decl.rejects_empty() {
			return Err(EncodeError::EmptyRejected { sum: decl.sum_name() });
		}
		out.extend_from_slice(b"null");
		return Ok(());
	};

	let member = value.as_member();
	let Some(name) = decl.resolve_name(dynamic_type_id(value)) else {
		if decl.is_sealed() {
			return Err(EncodeError::Undeclared {
				sum: decl.sum_name(),
				variant: member.type_name(),
			});
		}
		tracing::debug!(sum = decl.sum_name(), variant = member.type_name(), "undeclared variant, encoding without tag");
		return write_plain(out, Some(member));
	};

	match decl.tagging() {
		Tagging::Externally => {
			out.push(b'{');
			write_str(out, name)?;
			out.push(b':');
			write_plain(out, Some(member))?;
			out.push(b'}');
		}
		Tagging::Adjacently { tag, content } => {
			out.push(b'{');
			write_str(out, tag)?;
			out.push(b':');
			write_str(out, name)?;
			out.push(b',');
			write_str(out, content)?;
			out.push(b':');
			write_plain(out, Some(member))?;
			out.push(b'}');
		}
		Tagging::Internally { tag } => {
			let start = out.len();
			write_plain(out, Some(member))?;
			if out.get(start) != Some(&b'{') || out.last() != Some(&b'}') {
				return Err(EncodeError::NonObjectPayload {
					sum: decl.sum_name(),
					variant: member.type_name(),
				});
			}
			out.pop();
			if out.len() - start > 1 {
				out.push(b',');
			}
			write_str(out, tag)?;
			out.push(b':');
			write_str(out, name)?;
			out.push(b'}');
		}
		Tagging::Untagged => write_plain(out, Some(member))?,
	}
	Ok(())
}

/// Generic encoding of a member, `null` when absent.
fn write_plain(out: &mut Vec<u8>, member: Option<&dyn Member>) -> Result<(), EncodeError> {
	match member {
		Some(member) => serde_json::to_writer(&mut *out, member as &dyn erased_serde::Serialize)?,
		None => out.extend_from_slice(b"null"),
	}
	Ok(())
}

fn write_str(out: &mut Vec<u8>, text: &str) -> Result<(), EncodeError> {
	serde_json::to_writer(&mut *out, text)?;
	Ok(())
}
