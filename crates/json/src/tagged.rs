//! Serde bridge for sums nested inside ordinary types.
//!
//! [`Tagged`] wraps an optional boxed sum value and (de)serializes through the
//! tagged codec of the global registry, so a derived struct can hold a field
//! such as `Tagged<dyn Currency>`. It only works with `serde_json`: the
//! encoded payload is spliced in as a [`RawValue`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use tagsum_core::{Member, Sum};

use crate::{decode, encode};

/// A possibly empty value of the sum `S`, tagged on the wire.
pub struct Tagged<S: ?Sized + Sum>(pub Option<Box<S>>);

impl<S: ?Sized + Sum> Tagged<S> {
	pub fn new(value: Box<S>) -> Self {
		Self(Some(value))
	}

	pub fn empty() -> Self {
		Self(None)
	}

	pub fn get(&self) -> Option<&S> {
		self.0.as_deref()
	}

	pub fn into_inner(self) -> Option<Box<S>> {
		self.0
	}
}

impl<S: ?Sized + Sum> Default for Tagged<S> {
	fn default() -> Self {
		Self::empty()
	}
}

impl<S: ?Sized + Sum> From<Box<S>> for Tagged<S> {
	fn from(value: Box<S>) -> Self {
		Self::new(value)
	}
}

impl<S: ?Sized + Sum> fmt::Debug for Tagged<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Tagged").field(&self.get().map(|value| Member::type_name(value.as_member()))).finish()
	}
}

impl<S: ?Sized + Sum> Serialize for Tagged<S> {
	fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
		use serde::ser::Error;

		let json = encode::to_string(self.get()).map_err(Ser::Error::custom)?;
		let raw = RawValue::from_string(json).map_err(Ser::Error::custom)?;
		raw.serialize(serializer)
	}
}

impl<'de, S: ?Sized + Sum> Deserialize<'de> for Tagged<S> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		use serde::de::Error;

		let raw = Box::<RawValue>::deserialize(deserializer)?;
		decode::from_str::<S>(raw.get()).map(Self).map_err(D::Error::custom)
	}
}
