use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use crate::error::Error;
use crate::store::ResultStore;
use crate::unit::UnitId;

/// A registered unit's store behind a trait object.
///
/// This is the single concrete type the registry erases to, so a
/// [`StoreHandle`] can be downcast back by key/value type alone without
/// knowing which store implementation was registered.
pub(crate) struct DynStore<K, V> {
	inner: Box<dyn ResultStore<K, V>>,
}

impl<K: 'static, V: 'static> DynStore<K, V> {
	pub fn put(&self, key: K, value: V) {
		self.inner.put(key, value);
	}

	pub fn get(&self, key: &K) -> Option<V> {
		self.inner.get(key)
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.inner.contains_key(key)
	}

	pub fn name(&self) -> &str {
		self.inner.name()
	}
}

/// Type-erased registry entry: one unit's store plus the type metadata
/// captured at registration.
///
/// The store is held as `Arc<dyn Any>` so typed operations can clone the
/// handle out and release the registry lock before touching the store.
pub(crate) struct StoreHandle {
	key_type: TypeId,
	value_type: TypeId,
	key_type_name: &'static str,
	value_type_name: &'static str,
	store_name: String,
	/// Whether the unit was registered through caller resolution. Such
	/// entries carry their caller symbol as descriptor and are only ever
	/// matched by that exact symbol, never by owner/name alone.
	stack_registered: bool,
	store: Arc<dyn Any + Send + Sync>,
}

impl StoreHandle {
	/// Erase a concrete store, capturing its key and value types.
	pub fn new<K, V, S>(store: S, stack_registered: bool) -> Self
	where
		K: 'static,
		V: 'static,
		S: ResultStore<K, V>,
	{
		Self {
			key_type: TypeId::of::<K>(),
			value_type: TypeId::of::<V>(),
			key_type_name: type_name::<K>(),
			value_type_name: type_name::<V>(),
			store_name: store.name().to_string(),
			stack_registered,
			store: Arc::new(DynStore {
				inner: Box::new(store) as Box<dyn ResultStore<K, V>>,
			}),
		}
	}

	pub fn store_name(&self) -> &str {
		&self.store_name
	}

	pub fn stack_registered(&self) -> bool {
		self.stack_registered
	}

	/// Clone the store handle back at its concrete key/value types.
	///
	/// Returns `None` when the requested types differ from those captured at
	/// registration.
	pub fn downcast<K: 'static, V: 'static>(&self) -> Option<Arc<DynStore<K, V>>> {
		Arc::downcast::<DynStore<K, V>>(Arc::clone(&self.store)).ok()
	}

	/// Build the [`Error::TypeMismatch`] naming whichever of the two types
	/// diverged. Called only after a failed [`downcast`](Self::downcast).
	pub fn mismatch_error<K: 'static, V: 'static>(&self, unit: &UnitId) -> Error {
		if self.key_type != TypeId::of::<K>() {
			Error::TypeMismatch {
				unit: unit.clone(),
				expected: self.key_type_name,
				found: type_name::<K>(),
			}
		} else {
			debug_assert!(self.value_type != TypeId::of::<V>());
			Error::TypeMismatch {
				unit: unit.clone(),
				expected: self.value_type_name,
				found: type_name::<V>(),
			}
		}
	}
}
