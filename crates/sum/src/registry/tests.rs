use std::any::TypeId;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

use super::Registry;
use crate::{ConfigError, Member, Opt, Tagging, sum_type, variant};

trait Pet: Member {}
sum_type!(dyn Pet);

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Dog {
	tax_number: i64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Cat {
	name: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Fish;

impl Pet for Dog {}
impl Pet for Cat {}
impl Pet for Fish {}
variant!(dyn Pet => Dog, Cat, Fish);

mod other {
	use serde::{Deserialize, Serialize};

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	pub struct Cat;

	impl super::Pet for Cat {}
	crate::variant!(dyn super::Pet => Cat);
}

fn names(registry: &Registry) -> Vec<String> {
	let decl = registry.lookup::<dyn Pet>().expect("declared");
	decl.named_variants().map(|(name, _)| name.to_owned()).collect()
}

/// Declaring a sum registers the tuple in order under unqualified type names.
#[test]
fn test_declare_registers_in_order() {
	let registry = Registry::new();
	let pets = registry.declare::<dyn Pet, (Dog, Cat)>([]).unwrap();
	let decl = pets.declaration();

	assert_eq!(decl.len(), 2);
	assert_eq!(names(&registry), ["Dog", "Cat"]);
	assert_eq!(decl.resolve_type("Cat"), Some(TypeId::of::<Cat>()));
	assert_eq!(decl.resolve_name(TypeId::of::<Dog>()), Some("Dog"));
	assert_eq!(decl.tagging(), &Tagging::Externally);
	assert!(!decl.is_sealed());

	let pairs: Vec<(&str, TypeId)> = decl.named_variants().map(|(name, entry)| (name, entry.type_id())).collect();
	assert_eq!(pairs, [("Dog", TypeId::of::<Dog>()), ("Cat", TypeId::of::<Cat>())]);
	assert!(!decl.rejects_empty());
}

/// Looking up a sum that was never declared yields nothing.
#[test]
fn test_lookup_absent() {
	let registry = Registry::new();
	assert!(registry.lookup::<dyn Pet>().is_none());
}

/// Re-registering a variant under a new name drops the old name.
#[test]
fn test_rename_replaces_old_name() {
	let registry = Registry::new();
	registry.add_variant::<dyn Pet, Cat>([Opt::rename::<Cat>("a")]).unwrap();
	let decl = registry.add_variant::<dyn Pet, Cat>([Opt::rename::<Cat>("b")]).unwrap();

	assert_eq!(decl.resolve_type("a"), None);
	assert_eq!(decl.resolve_type("b"), Some(TypeId::of::<Cat>()));
	assert_eq!(decl.resolve_name(TypeId::of::<Cat>()), Some("b"));
	assert_eq!(decl.len(), 1);
}

/// Re-registration replaces the entry and moves it to the end.
#[test]
fn test_reregistration_moves_variant_last() {
	let registry = Registry::new();
	registry.declare::<dyn Pet, (Dog, Cat, Fish)>([]).unwrap();
	registry.add_variant::<dyn Pet, Dog>([]).unwrap();

	assert_eq!(names(&registry), ["Cat", "Fish", "Dog"]);
}

/// Options passed with a later variant change settings of the whole sum.
#[test]
fn test_add_variant_reapplies_global_options() {
	let registry = Registry::new();
	let first = registry.add_variant::<dyn Pet, Dog>([]).unwrap();
	assert_eq!(first.tagging(), &Tagging::Externally);

	let decl = registry.add_variant::<dyn Pet, Cat>([Opt::internally("type"), Opt::no_zero()]).unwrap();
	assert_eq!(decl.tagging(), &Tagging::Internally { tag: "type".into() });
	assert!(decl.rejects_empty());

	// Snapshots handed out earlier are not mutated in place.
	assert_eq!(first.tagging(), &Tagging::Externally);
	assert_eq!(first.len(), 1);
}

/// Later options override earlier ones.
#[test]
fn test_later_options_win() {
	let registry = Registry::new();
	let pets = registry
		.declare::<dyn Pet, (Dog, Cat)>([Opt::adjacently("t", "c"), Opt::untagged(), Opt::rename::<Cat>("kitty"), Opt::rename::<Cat>("tiger")])
		.unwrap();
	let decl = pets.declaration();

	assert_eq!(decl.tagging(), &Tagging::Untagged);
	assert_eq!(decl.resolve_type("tiger"), Some(TypeId::of::<Cat>()));
	assert_eq!(decl.resolve_type("kitty"), None);
}

/// Two variants claiming one name is a configuration error that leaves the
/// published declaration untouched.
#[test]
fn test_duplicate_name_rejected() {
	let registry = Registry::new();
	registry.declare::<dyn Pet, (Dog, Cat)>([]).unwrap();
	let before = registry.lookup::<dyn Pet>().unwrap();

	let err = registry.add_variant::<dyn Pet, Fish>([Opt::rename::<Fish>("Dog")]).unwrap_err();
	assert_eq!(
		err,
		ConfigError::DuplicateName {
			sum: std::any::type_name::<dyn Pet>(),
			name: "Dog".into(),
			existing: std::any::type_name::<Dog>(),
			incoming: std::any::type_name::<Fish>(),
		}
	);

	let after = registry.lookup::<dyn Pet>().unwrap();
	assert!(Arc::ptr_eq(&before, &after), "failed registration must not publish");
	assert_eq!(after.resolve_type("Fish"), None);
}

/// Types sharing a short name coexist when one of them is renamed in the
/// same call.
#[test]
fn test_short_name_clash_resolved_by_rename() {
	let registry = Registry::new();
	registry.add_variant::<dyn Pet, Cat>([]).unwrap();

	let err = registry.add_variant::<dyn Pet, other::Cat>([]).unwrap_err();
	assert!(matches!(err, ConfigError::DuplicateName { .. }));

	let decl = registry.add_variant::<dyn Pet, other::Cat>([Opt::rename::<other::Cat>("OtherCat")]).unwrap();
	assert_eq!(decl.resolve_type("Cat"), Some(TypeId::of::<Cat>()));
	assert_eq!(decl.resolve_type("OtherCat"), Some(TypeId::of::<other::Cat>()));
}

/// Sealing in the declaring call keeps its variants; later additions fail,
/// while re-registering an existing variant stays allowed.
#[test]
fn test_sealed_blocks_new_variants() {
	let registry = Registry::new();
	registry.declare::<dyn Pet, (Dog, Cat)>([Opt::sealed()]).unwrap();

	let err = registry.add_variant::<dyn Pet, Fish>([]).unwrap_err();
	assert_eq!(
		err,
		ConfigError::Sealed {
			sum: std::any::type_name::<dyn Pet>(),
			variant: std::any::type_name::<Fish>(),
		}
	);

	let decl = registry.add_variant::<dyn Pet, Cat>([Opt::rename::<Cat>("kitty")]).unwrap();
	assert_eq!(decl.len(), 2);
	assert_eq!(decl.resolve_type("kitty"), Some(TypeId::of::<Cat>()));
}

/// Renaming a type that is not a variant fails.
#[test]
fn test_rename_unknown_variant() {
	let registry = Registry::new();
	let err = registry.declare::<dyn Pet, (Dog,)>([Opt::rename::<Cat>("kitty")]).unwrap_err();
	assert!(matches!(err, ConfigError::UnknownVariant { variant, .. } if variant == std::any::type_name::<Cat>()));
	assert!(registry.lookup::<dyn Pet>().is_none());
}

/// Tagging parameters that cannot round-trip are rejected.
#[test]
fn test_invalid_tagging() {
	let registry = Registry::new();
	for opt in [Opt::adjacently("", "obj"), Opt::adjacently("same", "same"), Opt::internally("")] {
		let err = registry.declare::<dyn Pet, (Dog,)>([opt]).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidTagging { .. }), "{err}");
	}
}

/// The decode hook cached at registration builds the concrete variant.
#[test]
fn test_cached_decode_hook() {
	let registry = Registry::new();
	registry.declare::<dyn Pet, (Dog, Cat)>([]).unwrap();
	let decl = registry.lookup::<dyn Pet>().unwrap();
	let entry = decl.variant_named("Cat").unwrap();

	let mut json = serde_json::Deserializer::from_str(r#"{"Name":"Simba"}"#);
	let pet = entry.decode(&mut <dyn erased_serde::Deserializer>::erase(&mut json)).unwrap();

	assert_eq!(crate::downcast::<dyn Pet, Cat>(&*pet), Some(&Cat { name: "Simba".into() }));
	assert!(decl.variant_of(&*pet).is_some_and(|entry| entry.type_id() == TypeId::of::<Cat>()));
}

/// Tagging strategies load from configuration.
#[test]
fn test_tagging_from_config() {
	let tagging: Tagging = serde_json::from_str(r#"{"strategy":"adjacently","tag":"kind","content":"obj"}"#).unwrap();
	assert_eq!(
		tagging,
		Tagging::Adjacently {
			tag: "kind".into(),
			content: "obj".into(),
		}
	);

	let tagging: Tagging = serde_json::from_str(r#"{"strategy":"untagged"}"#).unwrap();
	assert!(!tagging.is_decodable());
}
