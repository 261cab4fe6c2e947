use std::hash::Hash;
use std::time::Duration;

use moka::sync::Cache;

/// Store name reserved for the registry's own bookkeeping.
///
/// [`MokaStore`] refuses it so no user-chosen store can ever collide with it.
pub const REGISTRY_STORE_NAME: &str = "_unit_registry_control_";

/// A pluggable key-value store holding one registered unit's results.
///
/// The three operations are the whole contract: no ordering, no iteration.
/// Whatever bounding, expiry, or eviction the backing engine applies is
/// opaque to the registry; a `get` miss reads the same whether the key was
/// never stored or was evicted. Implementations must be safe for concurrent
/// calls from multiple threads.
pub trait ResultStore<K, V>: Send + Sync + 'static {
	/// Insert or overwrite the value for `key`. Must not fail for a
	/// well-formed key.
	fn put(&self, key: K, value: V);

	/// The value previously stored under an equal key, if it is still live
	/// under the store's own expiry policy.
	fn get(&self, key: &K) -> Option<V>;

	/// Whether a live value is currently stored for an equal key.
	fn contains_key(&self, key: &K) -> bool;

	/// Name addressing this store when several coexist in one process.
	fn name(&self) -> &str;
}

/// Configuration for the default store adapter.
#[derive(Clone, Debug)]
pub struct StoreConfig {
	/// Maximum number of elements held (default: 1000).
	pub max_elements: u64,
	/// Expire entries this long after write (default: 24 h).
	pub time_to_live: Duration,
	/// Expire entries this long after last access (default: 24 h).
	pub time_to_idle: Duration,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			max_elements: 1000,
			time_to_live: Duration::from_secs(60 * 60 * 24),
			time_to_idle: Duration::from_secs(60 * 60 * 24),
		}
	}
}

/// Default [`ResultStore`] adapter over a bounded, TTL-expiring `moka` cache.
///
/// # Example
///
/// ```
/// use call_memo::{MokaStore, ResultStore, StoreConfig};
///
/// let store = MokaStore::<u32, String>::new("find-results");
/// store.put(7, "seven".to_string());
/// assert_eq!(store.get(&7), Some("seven".to_string()));
/// assert!(!store.contains_key(&8));
/// ```
pub struct MokaStore<K, V> {
	name: String,
	inner: Cache<K, V>,
}

impl<K, V> MokaStore<K, V>
where
	K: Hash + Eq + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	/// Create a store with the default configuration.
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_config(name, StoreConfig::default())
	}

	/// Create a store with explicit bounds and expiry.
	///
	/// # Panics
	///
	/// Panics if `name` is the reserved [`REGISTRY_STORE_NAME`].
	pub fn with_config(name: impl Into<String>, config: StoreConfig) -> Self {
		let name = name.into();
		assert!(name != REGISTRY_STORE_NAME, "store name {name:?} is reserved");
		let inner = Cache::builder()
			.name(&name)
			.max_capacity(config.max_elements)
			.time_to_live(config.time_to_live)
			.time_to_idle(config.time_to_idle)
			.build();
		Self { name, inner }
	}

	/// Number of live entries. Approximate until pending maintenance runs.
	pub fn entry_count(&self) -> u64 {
		self.inner.entry_count()
	}

	/// Run the engine's pending maintenance (expiry, eviction bookkeeping).
	pub fn run_pending_tasks(&self) {
		self.inner.run_pending_tasks();
	}

	/// Drop every entry. Subsequent `get`s miss immediately, even before
	/// pending maintenance reclaims the entries.
	pub fn remove_all(&self) {
		self.inner.invalidate_all();
	}
}

impl<K, V> ResultStore<K, V> for MokaStore<K, V>
where
	K: Hash + Eq + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	fn put(&self, key: K, value: V) {
		self.inner.insert(key, value);
	}

	fn get(&self, key: &K) -> Option<V> {
		self.inner.get(key)
	}

	fn contains_key(&self, key: &K) -> bool {
		self.inner.contains_key(key)
	}

	fn name(&self) -> &str {
		&self.name
	}
}
