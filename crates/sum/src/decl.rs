//! Per-sum metadata: the variant set, the name maps, and configuration.
//!
//! # Invariants
//!
//! - `variants` holds each variant type at most once. Re-registering a type
//!   removes the old entry and appends the new one.
//! - `name_to_type` is exactly the inverse of `type_to_name`. Both are
//!   rebuilt by [`Declaration::reindex`] after every mutation, so a rename
//!   drops the old name.
//! - No two variants share a name; a collision fails the whole mutation.

use std::any::{TypeId, type_name};
use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::member::{Sum, Variant, dynamic_type_id, short_type_name};
use crate::options::{Opt, Tagging};

/// One registered variant of the sum `S`.
///
/// Carries the hooks cached at registration so dispatch and decoding never
/// need to re-check the capability set.
pub struct VariantEntry<S: ?Sized> {
	type_id: TypeId,
	type_name: &'static str,
	decode: for<'de> fn(&mut dyn erased_serde::Deserializer<'de>) -> Result<Box<S>, erased_serde::Error>,
}

impl<S: ?Sized + Sum> VariantEntry<S> {
	fn new<V: Variant<S>>() -> Self {
		Self {
			type_id: TypeId::of::<V>(),
			type_name: type_name::<V>(),
			decode: decode_variant::<S, V>,
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	/// Fully qualified Rust type name.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Decodes a payload of this variant and moves it into the sum.
	pub fn decode<'de>(&self, deserializer: &mut dyn erased_serde::Deserializer<'de>) -> Result<Box<S>, erased_serde::Error> {
		(self.decode)(deserializer)
	}
}

fn decode_variant<'de, S: ?Sized + Sum, V: Variant<S>>(
	deserializer: &mut dyn erased_serde::Deserializer<'de>,
) -> Result<Box<S>, erased_serde::Error> {
	let value: V = erased_serde::deserialize(deserializer)?;
	Ok(Box::new(value).into_sum())
}

impl<S: ?Sized> Clone for VariantEntry<S> {
	fn clone(&self) -> Self {
		Self {
			type_id: self.type_id,
			type_name: self.type_name,
			decode: self.decode,
		}
	}
}

impl<S: ?Sized> fmt::Debug for VariantEntry<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VariantEntry").field("type_name", &self.type_name).finish()
	}
}

/// The closed variant set of one sum type.
pub struct Declaration<S: ?Sized> {
	sum_name: &'static str,
	variants: Vec<VariantEntry<S>>,
	name_to_type: FxHashMap<String, TypeId>,
	type_to_name: FxHashMap<TypeId, String>,
	sealed: bool,
	reject_empty: bool,
	tagging: Tagging,
}

impl<S: ?Sized + Sum> Declaration<S> {
	pub(crate) fn new() -> Self {
		Self {
			sum_name: type_name::<S>(),
			variants: Vec::new(),
			name_to_type: FxHashMap::default(),
			type_to_name: FxHashMap::default(),
			sealed: false,
			reject_empty: false,
			tagging: Tagging::default(),
		}
	}

	/// Rust type name of the sum supertype.
	pub fn sum_name(&self) -> &'static str {
		self.sum_name
	}

	/// Variants in registration order.
	pub fn variants(&self) -> impl ExactSizeIterator<Item = &VariantEntry<S>> {
		self.variants.iter()
	}

	/// Variants in registration order, paired with their wire names.
	pub fn named_variants(&self) -> impl Iterator<Item = (&str, &VariantEntry<S>)> {
		self.variants
			.iter()
			.filter_map(|entry| Some((self.type_to_name.get(&entry.type_id)?.as_str(), entry)))
	}

	pub fn len(&self) -> usize {
		self.variants.len()
	}

	pub fn is_empty(&self) -> bool {
		self.variants.is_empty()
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	/// Whether empty values are an error (the `NoZero` option).
	pub fn rejects_empty(&self) -> bool {
		self.reject_empty
	}

	pub fn tagging(&self) -> &Tagging {
		&self.tagging
	}

	/// Resolves a wire name to its variant type.
	pub fn resolve_type(&self, name: &str) -> Option<TypeId> {
		self.name_to_type.get(name).copied()
	}

	/// Resolves a variant type to its wire name.
	pub fn resolve_name(&self, type_id: TypeId) -> Option<&str> {
		self.type_to_name.get(&type_id).map(String::as_str)
	}

	pub fn variant(&self, type_id: TypeId) -> Option<&VariantEntry<S>> {
		self.variants.iter().find(|entry| entry.type_id == type_id)
	}

	pub fn variant_named(&self, name: &str) -> Option<&VariantEntry<S>> {
		self.variant(self.resolve_type(name)?)
	}

	/// The entry matching the dynamic type of `value`, if declared.
	pub fn variant_of(&self, value: &S) -> Option<&VariantEntry<S>> {
		self.variant(dynamic_type_id(value))
	}

	/// Adds or replaces the variant `V` under its default name.
	///
	/// Names are only bound by [`Self::reindex`], after options had a chance
	/// to rename, so two types sharing a short name can still be declared.
	pub(crate) fn insert<V: Variant<S>>(&mut self) -> Result<(), ConfigError> {
		let type_id = TypeId::of::<V>();
		match self.variants.iter().position(|entry| entry.type_id == type_id) {
			Some(index) => {
				self.variants.remove(index);
			}
			None if self.sealed => {
				return Err(ConfigError::Sealed {
					sum: self.sum_name,
					variant: type_name::<V>(),
				});
			}
			None => {}
		}

		self.variants.push(VariantEntry::new::<V>());
		self.type_to_name.insert(type_id, short_type_name(type_name::<V>()).to_owned());
		Ok(())
	}

	pub(crate) fn apply(&mut self, opt: &Opt) -> Result<(), ConfigError> {
		match opt {
			Opt::Rename {
				variant,
				type_name: variant_name,
				name,
			} => {
				if self.variant(*variant).is_none() {
					return Err(ConfigError::UnknownVariant {
						sum: self.sum_name,
						variant: *variant_name,
					});
				}
				self.type_to_name.insert(*variant, name.clone());
			}
			Opt::NoZero => self.reject_empty = true,
			Opt::Sealed => self.sealed = true,
			Opt::Tagging(tagging) => {
				tagging.validate().map_err(|reason| ConfigError::InvalidTagging {
					sum: self.sum_name,
					reason,
				})?;
				self.tagging = tagging.clone();
			}
		}
		Ok(())
	}

	/// Rebuilds the name to type map from the type to name map.
	pub(crate) fn reindex(&mut self) -> Result<(), ConfigError> {
		let mut name_to_type = FxHashMap::default();
		for entry in &self.variants {
			let Some(name) = self.type_to_name.get(&entry.type_id) else {
				continue;
			};
			if let Some(existing) = name_to_type.insert(name.clone(), entry.type_id) {
				let existing = self.variant(existing).map_or("<unknown>", VariantEntry::type_name);
				return Err(ConfigError::DuplicateName {
					sum: self.sum_name,
					name: name.clone(),
					existing,
					incoming: entry.type_name,
				});
			}
		}
		self.name_to_type = name_to_type;
		Ok(())
	}
}

impl<S: ?Sized> Clone for Declaration<S> {
	fn clone(&self) -> Self {
		Self {
			sum_name: self.sum_name,
			variants: self.variants.clone(),
			name_to_type: self.name_to_type.clone(),
			type_to_name: self.type_to_name.clone(),
			sealed: self.sealed,
			reject_empty: self.reject_empty,
			tagging: self.tagging.clone(),
		}
	}
}

impl<S: ?Sized> fmt::Debug for Declaration<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Declaration")
			.field("sum", &self.sum_name)
			.field("variants", &self.variants)
			.field("names", &self.name_to_type.keys().collect::<Vec<_>>())
			.field("sealed", &self.sealed)
			.field("reject_empty", &self.reject_empty)
			.field("tagging", &self.tagging)
			.finish()
	}
}
