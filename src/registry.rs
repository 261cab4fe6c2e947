use std::sync::{Arc, OnceLock};

use ahash::RandomState;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use parking_lot::RwLock;
use tracing::debug;

use crate::erased::{DynStore, StoreHandle};
use crate::error::{Error, ResolveError, Result};
use crate::resolve::{CallerFrame, CallerResolver};
use crate::store::ResultStore;
use crate::unit::UnitId;

/// Maps each registered callable unit to its own result store and carries
/// the result access protocol: register, check-registered, store-result,
/// check-cached, get-result.
///
/// Each operation comes in two forms. The explicit-identifier form is the
/// primary contract; the `*_caller` form resolves the identifier from the
/// live call stack and is otherwise identical. Registries are plain values
/// meant to be constructed once and handed to their consumers; a process-wide
/// instance is available through [`UnitRegistry::global`] when injection is
/// impractical.
///
/// All operations are synchronous and safe to call from any thread. The
/// registry's lock covers only the identifier map; store operations run on a
/// handle cloned out of it, so the store's own concurrency guarantees are
/// what govern concurrent `put`/`get`/`contains_key` for one unit.
///
/// # Example
///
/// ```
/// use call_memo::{MokaStore, UnitId, UnitRegistry};
///
/// # fn main() -> call_memo::Result<()> {
/// let registry = UnitRegistry::new();
/// let id = UnitId::new("db::Lookup", "find", "fn(&str) -> usize");
///
/// registry.register(id.clone(), MokaStore::<String, usize>::new("find-results"))?;
/// registry.store_result(&id, "alice".to_string(), 5usize)?;
///
/// assert!(registry.is_result_cached::<String, usize>(&id, &"alice".to_string())?);
/// assert_eq!(registry.get_result::<String, usize>(&id, &"alice".to_string())?, Some(5));
/// assert_eq!(registry.get_result::<String, usize>(&id, &"bob".to_string())?, None);
/// # Ok(())
/// # }
/// ```
pub struct UnitRegistry {
	units: RwLock<HashMap<UnitId, StoreHandle, RandomState>>,
	resolver: CallerResolver,
}

impl UnitRegistry {
	/// Registry with the default caller resolver (skip 0).
	pub fn new() -> Self {
		Self::with_resolver(CallerResolver::new())
	}

	/// Registry with an explicitly configured resolver.
	pub fn with_resolver(resolver: CallerResolver) -> Self {
		Self {
			units: RwLock::new(HashMap::with_hasher(RandomState::new())),
			resolver,
		}
	}

	/// Process-wide shared registry.
	///
	/// Initialization is race-free: concurrent first callers observe the
	/// same instance.
	pub fn global() -> &'static UnitRegistry {
		static GLOBAL: OnceLock<UnitRegistry> = OnceLock::new();
		GLOBAL.get_or_init(UnitRegistry::new)
	}

	/// Register `store` as the cache for the unit named by `id`.
	///
	/// The existence check and the insertion are one step under the write
	/// lock, so two racing registrations for the same identifier see exactly
	/// one success and one [`Error::AlreadyRegistered`].
	pub fn register<K, V, S>(&self, id: UnitId, store: S) -> Result<()>
	where
		K: 'static,
		V: 'static,
		S: ResultStore<K, V>,
	{
		self.register_handle(id, StoreHandle::new(store, false))
	}

	fn register_handle(&self, id: UnitId, handle: StoreHandle) -> Result<()> {
		let mut units = self.units.write();
		match units.entry(id) {
			Entry::Occupied(entry) => Err(Error::AlreadyRegistered(entry.key().clone())),
			Entry::Vacant(entry) => {
				debug!(unit = %entry.key(), store = handle.store_name(), "registered callable unit");
				entry.insert(handle);
				Ok(())
			}
		}
	}

	/// Whether a store is registered for the unit named by `id`.
	pub fn is_registered(&self, id: &UnitId) -> bool {
		self.units.read().contains_key(id)
	}

	/// Cache `value` as the result of invoking the unit with the arguments
	/// represented by `key`.
	///
	/// Fails with [`Error::NotRegistered`] if the unit has no store, and
	/// with [`Error::TypeMismatch`] — before the store is touched — if the
	/// key or value type differs from the types registered for the unit.
	pub fn store_result<K, V>(&self, id: &UnitId, key: K, value: V) -> Result<()>
	where
		K: 'static,
		V: 'static,
	{
		let store = self.typed_store::<K, V>(id)?;
		store.put(key, value);
		Ok(())
	}

	/// Whether a result is cached for `(id, key)`.
	pub fn is_result_cached<K, V>(&self, id: &UnitId, key: &K) -> Result<bool>
	where
		K: 'static,
		V: 'static,
	{
		let store = self.typed_store::<K, V>(id)?;
		Ok(store.contains_key(key))
	}

	/// The cached result for `(id, key)`, or `None` when nothing is stored —
	/// indistinguishably whether it never was or the store expired it.
	pub fn get_result<K, V>(&self, id: &UnitId, key: &K) -> Result<Option<V>>
	where
		K: 'static,
		V: 'static,
	{
		let store = self.typed_store::<K, V>(id)?;
		Ok(store.get(key))
	}

	/// Register `store` for the unit that called this method, deriving the
	/// identifier from the caller's stack frame. Returns the derived
	/// identifier; keep it if the explicit forms will be used later.
	///
	/// The derived identifier carries the caller's full symbol as its
	/// descriptor and is matched by later caller resolution only through
	/// that exact symbol. A unit registered this way and the same unit
	/// registered explicitly are two distinct identifiers; pick one style
	/// per unit.
	pub fn register_caller<K, V, S>(&self, store: S) -> Result<UnitId>
	where
		K: 'static,
		V: 'static,
		S: ResultStore<K, V>,
	{
		let frame = self.resolver.capture()?;
		let id = frame.unit_id();
		self.register_handle(id.clone(), StoreHandle::new(store, true))?;
		Ok(id)
	}

	/// Whether the unit that called this method is registered.
	///
	/// A caller matching no registered unit answers `false`; only capture
	/// failures and ambiguous matches are errors.
	pub fn is_caller_registered(&self) -> Result<bool> {
		let frame = self.resolver.capture()?;
		Ok(self.match_frame(&frame)?.is_some())
	}

	/// [`store_result`](Self::store_result) with the identifier resolved
	/// from the caller's stack frame.
	pub fn store_caller_result<K, V>(&self, key: K, value: V) -> Result<()>
	where
		K: 'static,
		V: 'static,
	{
		let frame = self.resolver.capture()?;
		match self.match_frame(&frame)? {
			Some(id) => self.store_result(&id, key, value),
			None => Err(unmatched_caller(frame)),
		}
	}

	/// [`is_result_cached`](Self::is_result_cached) with the identifier
	/// resolved from the caller's stack frame.
	pub fn is_caller_result_cached<K, V>(&self, key: &K) -> Result<bool>
	where
		K: 'static,
		V: 'static,
	{
		let frame = self.resolver.capture()?;
		match self.match_frame(&frame)? {
			Some(id) => self.is_result_cached::<K, V>(&id, key),
			None => Err(unmatched_caller(frame)),
		}
	}

	/// [`get_result`](Self::get_result) with the identifier resolved from
	/// the caller's stack frame.
	pub fn get_caller_result<K, V>(&self, key: &K) -> Result<Option<V>>
	where
		K: 'static,
		V: 'static,
	{
		let frame = self.resolver.capture()?;
		match self.match_frame(&frame)? {
			Some(id) => self.get_result(&id, key),
			None => Err(unmatched_caller(frame)),
		}
	}

	/// Resolve the calling unit against the registered set without touching
	/// any store. An unmatched caller is a resolution failure here, since
	/// there is nothing else to answer with.
	pub fn resolve_caller(&self) -> Result<UnitId> {
		let frame = self.resolver.capture()?;
		match self.match_frame(&frame)? {
			Some(id) => Ok(id),
			None => Err(Error::Resolution(ResolveError::NoMatch {
				owner: frame.owner,
				name: frame.name,
			})),
		}
	}

	/// Number of registered units.
	pub fn len(&self) -> usize {
		self.units.read().len()
	}

	/// Whether no units are registered.
	pub fn is_empty(&self) -> bool {
		self.units.read().is_empty()
	}

	/// Cross-reference a caller frame against the registered identifiers.
	///
	/// An exact descriptor match wins: stack-registered units carry the full
	/// symbol as their descriptor, which tells monomorphizations and other
	/// same-named duplicates apart, and is the only way such units match.
	/// Failing that, a unique (owner, name) match covers explicitly
	/// registered units; several such candidates cannot be told apart from
	/// the frame alone.
	fn match_frame(&self, frame: &CallerFrame) -> std::result::Result<Option<UnitId>, ResolveError> {
		let units = self.units.read();
		if let Some(id) = units.keys().find(|id| id.descriptor() == frame.symbol) {
			return Ok(Some(id.clone()));
		}
		let mut candidates = units.iter().filter_map(|(id, handle)| {
			(!handle.stack_registered() && id.owner() == frame.owner && id.name() == frame.name)
				.then_some(id)
		});
		match (candidates.next(), candidates.next()) {
			(Some(id), None) => Ok(Some(id.clone())),
			(Some(_), Some(_)) => Err(ResolveError::Ambiguous {
				owner: frame.owner.clone(),
				name: frame.name.clone(),
			}),
			(None, _) => Ok(None),
		}
	}

	/// Look up the unit's store handle at its concrete types, releasing the
	/// registry lock before the store is used.
	fn typed_store<K, V>(&self, id: &UnitId) -> Result<Arc<DynStore<K, V>>>
	where
		K: 'static,
		V: 'static,
	{
		let units = self.units.read();
		let handle = units.get(id).ok_or_else(|| Error::NotRegistered(id.clone()))?;
		handle.downcast::<K, V>().ok_or_else(|| handle.mismatch_error::<K, V>(id))
	}
}

impl Default for UnitRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// The caller frame resolved cleanly but names no registered unit.
fn unmatched_caller(frame: CallerFrame) -> Error {
	debug!(file = ?frame.file, line = frame.line, "caller frame matched no registered unit");
	Error::NotRegistered(frame.unit_id())
}
