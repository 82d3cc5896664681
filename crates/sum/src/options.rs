//! Configuration options applied to a declaration at registration time.
//!
//! Options are applied in order; later options override earlier ones on the
//! same setting. Every registration call re-applies its options to the whole
//! declaration, so an incremental [`crate::add_variant`] may also change
//! global settings such as the tagging strategy.

use std::any::TypeId;

use serde::{Deserialize, Serialize};

/// Wire convention used to mark which variant a payload represents.
///
/// Derives serde so a strategy can be read from configuration:
/// `{"strategy": "adjacently", "tag": "kind", "content": "obj"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Tagging {
	/// `{"Cat": {...}}`
	#[default]
	Externally,
	/// `{"kind": "Cat", "obj": {...}}`
	Adjacently { tag: String, content: String },
	/// `{..., "type": "Cat"}`
	Internally { tag: String },
	/// `{...}`, encode only.
	Untagged,
}

impl Tagging {
	/// Whether payloads in this convention can be decoded back.
	pub fn is_decodable(&self) -> bool {
		!matches!(self, Self::Untagged)
	}

	pub(crate) fn validate(&self) -> Result<(), &'static str> {
		match self {
			Self::Adjacently { tag, content } if tag.is_empty() || content.is_empty() => {
				Err("adjacent tag and content field names must not be empty")
			}
			Self::Adjacently { tag, content } if tag == content => {
				Err("adjacent tag and content field names must differ")
			}
			Self::Internally { tag } if tag.is_empty() => Err("internal tag field name must not be empty"),
			_ => Ok(()),
		}
	}
}

/// A single registration option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opt {
	/// Sets the wire name of one variant.
	Rename {
		variant: TypeId,
		type_name: &'static str,
		name: String,
	},
	/// Empty values are an error rather than `null`.
	NoZero,
	/// Closes the variant set for dispatch, encoding, and later additions.
	Sealed,
	/// Selects the tagging strategy.
	Tagging(Tagging),
}

impl Opt {
	pub fn rename<V: 'static>(name: impl Into<String>) -> Self {
		Self::Rename {
			variant: TypeId::of::<V>(),
			type_name: std::any::type_name::<V>(),
			name: name.into(),
		}
	}

	pub fn no_zero() -> Self {
		Self::NoZero
	}

	pub fn sealed() -> Self {
		Self::Sealed
	}

	/// The default strategy.
	pub fn externally() -> Self {
		Self::Tagging(Tagging::Externally)
	}

	pub fn adjacently(tag: impl Into<String>, content: impl Into<String>) -> Self {
		Self::Tagging(Tagging::Adjacently {
			tag: tag.into(),
			content: content.into(),
		})
	}

	pub fn internally(tag: impl Into<String>) -> Self {
		Self::Tagging(Tagging::Internally { tag: tag.into() })
	}

	pub fn untagged() -> Self {
		Self::Tagging(Tagging::Untagged)
	}
}

impl From<Tagging> for Opt {
	fn from(tagging: Tagging) -> Self {
		Self::Tagging(tagging)
	}
}
