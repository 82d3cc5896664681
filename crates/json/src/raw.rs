//! Deferred parsing of a top-level JSON object.
//!
//! The discriminant of an adjacently or internally tagged payload may follow
//! the fields it describes, so the payload cannot be decoded until the whole
//! object has been scanned. [`RawObject`] keeps every field as an unparsed
//! [`RawValue`] borrowed from the input.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;

/// Fields of one JSON object in input order, duplicates included.
pub(crate) struct RawObject<'a> {
	pub fields: Vec<(String, &'a RawValue)>,
}

impl<'a> RawObject<'a> {
	/// The last occurrence of `key`.
	pub fn get(&self, key: &str) -> Option<&'a RawValue> {
		self.fields.iter().rev().find(|(name, _)| name == key).map(|(_, raw)| *raw)
	}

	/// Reserializes the fields into one object, keeping the last occurrence
	/// of a duplicated key at its first position.
	pub fn reassemble(&self) -> String {
		let mut last: FxHashMap<&str, usize> = FxHashMap::default();
		for (index, (key, _)) in self.fields.iter().enumerate() {
			last.insert(key, index);
		}

		let mut out = String::with_capacity(self.fields.iter().map(|(k, v)| k.len() + v.get().len() + 4).sum::<usize>() + 2);
		out.push('{');
		let mut first = true;
		for (key, _) in &self.fields {
			let Some(index) = last.remove(key.as_str()) else {
				continue;
			};
			if !first {
				out.push(',');
			}
			first = false;
			out.push_str(&quote(key));
			out.push(':');
			out.push_str(self.fields[index].1.get());
		}
		out.push('}');
		out
	}
}

impl<'de> Deserialize<'de> for RawObject<'de> {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_map(ObjectVisitor)
	}
}

struct ObjectVisitor;

impl<'de> Visitor<'de> for ObjectVisitor {
	type Value = RawObject<'de>;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a JSON object")
	}

	fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
	where
		M: MapAccess<'de>,
	{
		let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(4));
		while let Some((key, raw)) = map.next_entry::<String, &'de RawValue>()? {
			fields.push((key, raw));
		}
		Ok(RawObject { fields })
	}
}

/// Quotes a string as a JSON literal.
pub(crate) fn quote(text: &str) -> String {
	serde_json::Value::from(text).to_string()
}

/// Parses a JSON string literal.
pub(crate) fn unquote(raw: &RawValue) -> Option<String> {
	serde_json::from_str(raw.get()).ok()
}

/// Byte offset of `fragment` inside `input`, clamped to the input length.
pub(crate) fn offset_of(input: &str, fragment: &str) -> usize {
	let offset = (fragment.as_ptr() as usize).saturating_sub(input.as_ptr() as usize);
	offset.min(input.len())
}

/// Byte offset of a 1-based line and column reported by the parser.
pub(crate) fn offset_at(input: &str, line: usize, column: usize) -> usize {
	if line == 0 {
		return 0;
	}
	let line_start: usize = input.split_inclusive('\n').take(line - 1).map(str::len).sum();
	(line_start + column.saturating_sub(1)).min(input.len())
}

/// Shortens a fragment for error messages.
pub(crate) fn describe(fragment: &str) -> String {
	const LIMIT: usize = 48;
	match fragment.char_indices().nth(LIMIT) {
		Some((end, _)) => format!("{}...", &fragment[..end]),
		None => fragment.to_owned(),
	}
}
