#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Tagged JSON codec for `tagsum` sum types.
//!
//! Encodes a value of a declared sum together with the wire name of its
//! variant, and decodes it back into the right concrete type. Four
//! strategies are supported, chosen per sum at declaration time
//! ([`tagsum_core::Tagging`]). For `Cat { Name: "Simba" }`:
//!
//! | Strategy | Output |
//! |---|---|
//! | Externally | `{"Cat":{"Name":"Simba"}}` |
//! | Adjacently `("kind", "obj")` | `{"kind":"Cat","obj":{"Name":"Simba"}}` |
//! | Internally `("type")` | `{"Name":"Simba","type":"Cat"}` |
//! | Untagged | `{"Name":"Simba"}` (encode only) |
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use tagsum_core::{Member, Opt, declare, downcast, sum_type, variant};
//!
//! trait Pet: Member {}
//! sum_type!(dyn Pet);
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Cat {
//! 	name: String,
//! }
//!
//! impl Pet for Cat {}
//! variant!(dyn Pet => Cat);
//!
//! declare::<dyn Pet, (Cat,)>([Opt::internally("type")]).unwrap();
//!
//! let pet: Box<dyn Pet> = Box::new(Cat { name: "Simba".into() });
//! let json = tagsum_json::to_string(Some(&*pet)).unwrap();
//! assert_eq!(json, r#"{"Name":"Simba","type":"Cat"}"#);
//!
//! let back = tagsum_json::from_str::<dyn Pet>(&json).unwrap().unwrap();
//! assert_eq!(downcast::<dyn Pet, Cat>(&*back), Some(&Cat { name: "Simba".into() }));
//! ```

pub mod decode;
pub mod encode;
pub mod error;
mod raw;
pub mod tagged;

pub use decode::{from_slice, from_slice_in, from_str, from_str_in};
pub use encode::{to_string, to_string_in, to_vec, to_vec_in};
pub use error::{DecodeError, DecodeErrorKind, EncodeError};
pub use tagged::Tagged;
