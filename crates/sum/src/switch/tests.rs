use std::cell::Cell;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

use super::{Switch, Unmatched};
use crate::{ConfigError, Member, Opt, Registry, sum_type, variant};

trait Offer: Member {}
sum_type!(dyn Offer);

#[derive(Debug, Serialize, Deserialize)]
struct Accepted {
	sum: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Unchecked {
	sum: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Stray;

impl Offer for Accepted {}
impl Offer for Unchecked {}
impl Offer for Stray {}
variant!(dyn Offer => Accepted, Unchecked, Stray);

fn describe(registry: &Registry, offer: Option<&dyn Offer>) -> String {
	let offers = registry.declare::<dyn Offer, (Accepted, Unchecked)>([]).unwrap();
	offers
		.switch(
			offer,
			(
				|offer: &Accepted| format!("accepted {}", offer.sum),
				|offer: &Unchecked| format!("unchecked {}", offer.sum),
			),
			|other: Unmatched<'_, dyn Offer>| format!("{other:?}"),
		)
		.unwrap()
}

/// The handler matching the dynamic type runs, and only that one.
#[test]
fn test_typed_switch_narrows_value() {
	let registry = Registry::new();
	let accepted: Box<dyn Offer> = Box::new(Accepted { sum: 2 });
	let unchecked: Box<dyn Offer> = Box::new(Unchecked { sum: 3 });

	assert_eq!(describe(&registry, Some(&*accepted)), "accepted 2");
	assert_eq!(describe(&registry, Some(&*unchecked)), "unchecked 3");
}

/// Empty and undeclared values reach the fallback, classified by the
/// declaration's settings.
#[test]
fn test_typed_switch_fallback_classification() {
	let registry = Registry::new();
	let stray: Box<dyn Offer> = Box::new(Stray);

	assert_eq!(describe(&registry, None), "Empty");
	assert_eq!(describe(&registry, Some(&*stray)), format!("Undeclared({:?})", std::any::type_name::<Stray>()));

	registry.declare::<dyn Offer, (Accepted, Unchecked)>([Opt::sealed(), Opt::no_zero()]).unwrap();
	assert_eq!(describe(&registry, None), "ForbiddenEmpty");
	assert_eq!(describe(&registry, Some(&*stray)), format!("SealedViolation({:?})", std::any::type_name::<Stray>()));
}

/// Exactly one handler runs per call.
#[test]
fn test_exactly_one_handler_runs() {
	let registry = Registry::new();
	let offers = registry.declare::<dyn Offer, (Accepted, Unchecked)>([]).unwrap();
	let calls = Cell::new(0);
	let offer: Box<dyn Offer> = Box::new(Unchecked { sum: 1 });

	offers
		.switch(
			Some(&*offer),
			(|_: &Accepted| calls.set(calls.get() + 1), |_: &Unchecked| calls.set(calls.get() + 10)),
			|_| calls.set(calls.get() + 100),
		)
		.unwrap();
	assert_eq!(calls.get(), 10);
}

/// A built switch dispatches like the typed form and is reusable.
#[test]
fn test_runtime_switch_dispatch() {
	let registry = Registry::new();
	registry.add_variant::<dyn Offer, Accepted>([]).unwrap();
	registry.add_variant::<dyn Offer, Unchecked>([Opt::sealed()]).unwrap();

	let mut switch = Switch::<dyn Offer, &str>::new(&registry)
		.unwrap()
		.case(|_: &Accepted| "accepted")
		.case(|_: &Unchecked| "unchecked")
		.build(|other| if other.is_violation() { "violation" } else { "other" })
		.unwrap();

	let accepted: Box<dyn Offer> = Box::new(Accepted { sum: 1 });
	let stray: Box<dyn Offer> = Box::new(Stray);
	assert_eq!(switch.dispatch(Some(&*accepted)), "accepted");
	assert_eq!(switch.dispatch(Some(&*stray)), "violation");
	assert_eq!(switch.dispatch(None), "other");
}

/// Fewer handlers than variants plus fallback is rejected at build time.
#[test]
fn test_runtime_switch_arity() {
	let registry = Registry::new();
	registry.declare::<dyn Offer, (Accepted, Unchecked)>([]).unwrap();

	let err = Switch::<dyn Offer, ()>::new(&registry)
		.unwrap()
		.case(|_: &Accepted| ())
		.build(|_| ())
		.err()
		.unwrap();
	assert_eq!(
		err,
		ConfigError::Arity {
			sum: std::any::type_name::<dyn Offer>(),
			expected: 3,
			found: 2,
		}
	);
}

/// Handlers out of declaration order are rejected at build time.
#[test]
fn test_runtime_switch_order() {
	let registry = Registry::new();
	registry.declare::<dyn Offer, (Accepted, Unchecked)>([]).unwrap();

	let err = Switch::<dyn Offer, ()>::new(&registry)
		.unwrap()
		.case(|_: &Unchecked| ())
		.case(|_: &Accepted| ())
		.build(|_| ())
		.err()
		.unwrap();
	assert!(matches!(err, ConfigError::CaseOrder { position: 0, .. }), "{err}");
}

/// A switch over an undeclared sum cannot be started.
#[test]
fn test_runtime_switch_undeclared() {
	let registry = Registry::new();
	let err = Switch::<dyn Offer, ()>::new(&registry).err().unwrap();
	assert!(matches!(err, ConfigError::Undeclared { .. }));
}

/// A typed handle whose sum later grew refuses to dispatch instead of
/// sending the new variant to the fallback.
#[test]
fn test_typed_switch_rejects_grown_sum() {
	let registry = Registry::new();
	let offers = registry.declare::<dyn Offer, (Accepted,)>([]).unwrap();
	registry.add_variant::<dyn Offer, Unchecked>([Opt::sealed()]).unwrap();

	let calls = Cell::new(0);
	let offer: Box<dyn Offer> = Box::new(Unchecked { sum: 1 });
	let err = offers
		.switch(Some(&*offer), (|_: &Accepted| calls.set(calls.get() + 1),), |_| calls.set(calls.get() + 100))
		.unwrap_err();

	assert_eq!(
		err,
		ConfigError::Arity {
			sum: std::any::type_name::<dyn Offer>(),
			expected: 3,
			found: 2,
		}
	);
	assert_eq!(calls.get(), 0);

	// A handle over the full tuple works again.
	let offers = registry.declare::<dyn Offer, (Accepted, Unchecked)>([]).unwrap();
	let result = offers
		.switch(Some(&*offer), (|_: &Accepted| "accepted", |_: &Unchecked| "unchecked"), |_| "other")
		.unwrap();
	assert_eq!(result, "unchecked");
}

/// A typed handle whose variants were reordered by re-registration fails
/// with the first mismatching position.
#[test]
fn test_typed_switch_rejects_reordered_sum() {
	let registry = Registry::new();
	let offers = registry.declare::<dyn Offer, (Accepted, Unchecked)>([]).unwrap();
	registry.add_variant::<dyn Offer, Accepted>([]).unwrap();

	let err = offers.switch(None, (|_: &Accepted| (), |_: &Unchecked| ()), |_| ()).unwrap_err();
	assert!(matches!(err, ConfigError::CaseOrder { position: 0, .. }), "{err}");
}

/// A built dispatcher labels variants registered after it as unhandled,
/// never as violations.
#[test]
fn test_dispatcher_unhandled_variant() {
	let registry = Registry::new();
	registry.add_variant::<dyn Offer, Accepted>([]).unwrap();

	let mut switch = Switch::<dyn Offer, String>::new(&registry)
		.unwrap()
		.case(|_: &Accepted| "accepted".to_owned())
		.build(|other| format!("{other:?} violation={}", other.is_violation()))
		.unwrap();

	registry.add_variant::<dyn Offer, Unchecked>([Opt::sealed()]).unwrap();

	let unchecked: Box<dyn Offer> = Box::new(Unchecked { sum: 2 });
	let stray: Box<dyn Offer> = Box::new(Stray);
	assert_eq!(
		switch.dispatch(Some(&*unchecked)),
		format!("Unhandled({:?}) violation=false", std::any::type_name::<Unchecked>())
	);
	assert_eq!(
		switch.dispatch(Some(&*stray)),
		format!("SealedViolation({:?}) violation=true", std::any::type_name::<Stray>())
	);
}
