//! Process-wide table of sum declarations.
//!
//! # Role
//!
//! Maps the `TypeId` of a sum supertype to its [`Declaration`]. Declarations
//! are created lazily by the first registration call and live for the rest of
//! the process. The codec and the switch only read from here.
//!
//! # Concurrency
//!
//! - **Reads:** Wait-free (atomic load of the current map).
//! - **Writes:** Serialized by a mutex. A writer clones the affected
//!   declaration, mutates the clone, and publishes a new map, so a failed
//!   registration leaves the published state untouched and readers never see
//!   a half-applied option list.
//!
//! Registration is expected to settle at startup, before the first switch,
//! encode, or decode that depends on it.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::decl::Declaration;
use crate::error::ConfigError;
use crate::member::{Sum, Variant};
use crate::options::Opt;

type DeclMap = FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Registry of sum declarations keyed by supertype.
pub struct Registry {
	decls: ArcSwap<DeclMap>,
	write: Mutex<()>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	pub fn new() -> Self {
		Self {
			decls: ArcSwap::from_pointee(DeclMap::default()),
			write: Mutex::new(()),
		}
	}

	/// The process-wide registry used by the free functions and the codec.
	pub fn global() -> &'static Registry {
		&GLOBAL
	}

	/// Returns the current declaration of `S`.
	pub fn lookup<S: ?Sized + Sum>(&self) -> Option<Arc<Declaration<S>>> {
		let entry = self.decls.load().get(&TypeId::of::<S>())?.clone();
		entry.downcast::<Declaration<S>>().ok()
	}

	/// Declares the sum `S` with the variants of the tuple `L`.
	///
	/// Creates the declaration if absent, registers each variant in tuple
	/// order, then applies `opts` in order. A sum declared and sealed in the
	/// same call keeps its variants; a sum sealed earlier rejects new ones.
	pub fn declare<S, L>(&self, opts: impl IntoIterator<Item = Opt>) -> Result<Declared<'_, S, L>, ConfigError>
	where
		S: ?Sized + Sum,
		L: VariantList<S>,
	{
		let opts: Vec<Opt> = opts.into_iter().collect();
		let decl = self.update::<S>(|decl| {
			L::register(decl)?;
			opts.iter().try_for_each(|opt| decl.apply(opt))
		})?;
		tracing::debug!(sum = decl.sum_name(), variants = decl.len(), tagging = ?decl.tagging(), "declared sum");

		Ok(Declared {
			registry: self,
			decl,
			_list: PhantomData,
		})
	}

	/// Adds or re-registers the single variant `V` of `S`.
	///
	/// Creates a default declaration first when `S` is unknown. The options
	/// apply to the whole declaration, so this may also change the tagging
	/// strategy or seal the sum.
	pub fn add_variant<S, V>(&self, opts: impl IntoIterator<Item = Opt>) -> Result<Arc<Declaration<S>>, ConfigError>
	where
		S: ?Sized + Sum,
		V: Variant<S>,
	{
		let opts: Vec<Opt> = opts.into_iter().collect();
		let decl = self.update::<S>(|decl| {
			decl.insert::<V>()?;
			opts.iter().try_for_each(|opt| decl.apply(opt))
		})?;
		tracing::debug!(
			sum = decl.sum_name(),
			variant = type_name::<V>(),
			name = ?decl.resolve_name(TypeId::of::<V>()),
			"registered variant"
		);
		Ok(decl)
	}

	fn update<S: ?Sized + Sum>(
		&self,
		mutate: impl FnOnce(&mut Declaration<S>) -> Result<(), ConfigError>,
	) -> Result<Arc<Declaration<S>>, ConfigError> {
		let _guard = self.write.lock();
		let current = self.decls.load_full();
		let key = TypeId::of::<S>();

		let mut decl = match current.get(&key).and_then(|entry| entry.downcast_ref::<Declaration<S>>()) {
			Some(existing) => existing.clone(),
			None => {
				tracing::debug!(sum = type_name::<S>(), "creating declaration");
				Declaration::new()
			}
		};

		if let Err(error) = mutate(&mut decl).and_then(|()| decl.reindex()) {
			tracing::warn!(sum = decl.sum_name(), %error, "registration rejected");
			return Err(error);
		}

		let decl = Arc::new(decl);
		let mut next = DeclMap::clone(&current);
		next.insert(key, decl.clone());
		self.decls.store(Arc::new(next));
		Ok(decl)
	}
}

/// An ordered tuple of variant types, `(Dog, Cat)`.
///
/// Implemented for tuples of up to twelve variants.
pub trait VariantList<S: ?Sized + Sum> {
	#[doc(hidden)]
	fn register(decl: &mut Declaration<S>) -> Result<(), ConfigError>;

	/// Checks that `decl` has exactly these variants, in this order.
	#[doc(hidden)]
	fn check(decl: &Declaration<S>) -> Result<(), ConfigError>;
}

/// Typed handle returned by [`Registry::declare`].
///
/// Remembers the declared variant tuple so [`Declared::switch`] can check the
/// handler list at compile time.
pub struct Declared<'r, S: ?Sized + Sum, L> {
	registry: &'r Registry,
	decl: Arc<Declaration<S>>,
	_list: PhantomData<fn() -> L>,
}

impl<S: ?Sized + Sum, L> Declared<'_, S, L> {
	/// The current declaration, including later registrations.
	pub fn declaration(&self) -> Arc<Declaration<S>> {
		self.registry.lookup::<S>().unwrap_or_else(|| self.decl.clone())
	}
}

impl<S: ?Sized + Sum, L> fmt::Debug for Declared<'_, S, L> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Declared")
			.field("decl", &self.decl)
			.field("list", &type_name::<L>())
			.finish()
	}
}

impl<S: ?Sized + Sum, L> Clone for Declared<'_, S, L> {
	fn clone(&self) -> Self {
		Self {
			registry: self.registry,
			decl: self.decl.clone(),
			_list: PhantomData,
		}
	}
}

/// Declares `S` in the global registry. See [`Registry::declare`].
pub fn declare<S, L>(opts: impl IntoIterator<Item = Opt>) -> Result<Declared<'static, S, L>, ConfigError>
where
	S: ?Sized + Sum,
	L: VariantList<S>,
{
	Registry::global().declare(opts)
}

/// Adds a variant in the global registry. See [`Registry::add_variant`].
pub fn add_variant<S, V>(opts: impl IntoIterator<Item = Opt>) -> Result<Arc<Declaration<S>>, ConfigError>
where
	S: ?Sized + Sum,
	V: Variant<S>,
{
	Registry::global().add_variant::<S, V>(opts)
}

/// Looks up `S` in the global registry.
pub fn lookup<S: ?Sized + Sum>() -> Option<Arc<Declaration<S>>> {
	Registry::global().lookup::<S>()
}

#[cfg(test)]
mod tests;
