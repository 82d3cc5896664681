//! Closed sum types over open trait objects.
//!
//! A trait such as `Pet` has any number of implementors. This crate lets a
//! program declare a fixed, ordered set of them as the variants of
//! `dyn Pet`, giving it:
//!
//! - exhaustive dispatch ([`Declared::switch`], [`Switch`]) with a single
//!   fallback for empty or unknown values,
//! - stable wire names for each variant, used by the tagged codec in
//!   `tagsum-json`.
//!
//! # Declaring a sum
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use tagsum_core::{Member, Opt, Unmatched, declare, sum_type, variant};
//!
//! trait Pet: Member {}
//! sum_type!(dyn Pet);
//!
//! #[derive(Serialize, Deserialize)]
//! struct Dog {
//! 	tax_number: i64,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Cat {
//! 	name: String,
//! }
//!
//! impl Pet for Dog {}
//! impl Pet for Cat {}
//! variant!(dyn Pet => Dog, Cat);
//!
//! let pets = declare::<dyn Pet, (Dog, Cat)>([Opt::adjacently("kind", "obj")]).unwrap();
//!
//! let pet: Box<dyn Pet> = Box::new(Cat { name: "Simba".into() });
//! let chore = pets.switch(
//! 	Some(&*pet),
//! 	(
//! 		|dog: &Dog| format!("pay tax: {}", dog.tax_number),
//! 		|cat: &Cat| format!("clean litterbox: {}", cat.name),
//! 	),
//! 	|other: Unmatched<'_, dyn Pet>| format!("remove vermin: {other:?}"),
//! )
//! .unwrap();
//! assert_eq!(chore, "clean litterbox: Simba");
//! ```
//!
//! # Initialization order
//!
//! The registry is process-wide and never torn down. Declare every sum
//! before the first switch, encode, or decode that relies on it, typically
//! during startup. Registration errors ([`ConfigError`]) describe programming
//! mistakes and are meant to be treated as fatal.

pub mod decl;
pub mod error;
pub mod member;
pub mod options;
pub mod registry;
pub mod switch;

pub use decl::{Declaration, VariantEntry};
pub use error::ConfigError;
pub use member::{Member, Sum, Variant, downcast, dynamic_type_id};
pub use options::{Opt, Tagging};
pub use registry::{Declared, Registry, VariantList, add_variant, declare, lookup};
pub use switch::{Dispatcher, Handlers, Switch, Unmatched};
