//! # call-memo
//!
//! A transparent memoization layer: any function or method can have its
//! results cached without threading a cache handle or identity token through
//! its call sites.
//!
//! - **Per-unit stores**: every registered callable unit owns its own
//!   bounded, TTL-expiring key-value store ([`MokaStore`] by default, any
//!   [`ResultStore`] implementation otherwise)
//! - **Explicit identifiers first**: units are named by [`UnitId`] — owner
//!   path, unit name, signature descriptor — captured at the definition site
//!   with [`unit_id!`]
//! - **Caller resolution as sugar**: the `*_caller` operations identify the
//!   calling unit from the live stack via symbolized backtraces, with the
//!   frame-skip depth an explicit, testable knob
//! - **Type-checked results**: storing a value whose key or value type
//!   differs from the types registered for the unit fails before the store
//!   is touched
//!
//! ## Quick Start
//!
//! ```rust
//! use call_memo::{MokaStore, UnitId, UnitRegistry};
//!
//! # fn main() -> call_memo::Result<()> {
//! let registry = UnitRegistry::new();
//!
//! // Name the unit and give it a store.
//! let id = UnitId::new("db::Lookup", "find", "fn(&str) -> usize");
//! registry.register(id.clone(), MokaStore::<String, usize>::new("find-results"))?;
//!
//! // Cache a result under an opaque arguments key.
//! registry.store_result(&id, "alice".to_string(), 5usize)?;
//!
//! assert!(registry.is_result_cached::<String, usize>(&id, &"alice".to_string())?);
//! assert_eq!(
//!     registry.get_result::<String, usize>(&id, &"alice".to_string())?,
//!     Some(5),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Caller resolution
//!
//! The caller-resolved forms let the cached unit stay ignorant of its own
//! identity. Each one captures and symbolizes a backtrace, so they are the
//! convenience path, not the fast path:
//!
//! ```rust,ignore
//! fn find(registry: &UnitRegistry, name: &str) -> usize {
//!     if let Ok(Some(hit)) = registry.get_caller_result::<String, usize>(&name.to_string()) {
//!         return hit;
//!     }
//!     let value = expensive_lookup(name);
//!     let _ = registry.store_caller_result(name.to_string(), value);
//!     value
//! }
//! ```
//!
//! Resolution is depth-sensitive: it targets the immediate caller of the
//! registry operation, and every host-side wrapper layer in between needs
//! one extra frame of skip ([`RegistryBuilder::caller_skip`]). It also needs
//! symbol information in the binary. Prefer the explicit-identifier forms
//! anywhere either assumption is shaky.
//!
//! ## Thread Safety
//!
//! `UnitRegistry` is `Send + Sync`; share it by reference or `Arc`, or use
//! the race-free process-wide [`UnitRegistry::global`]. Registration is
//! atomic with respect to the already-registered check, and store operations
//! rely on the store's own concurrency guarantees rather than a registry
//! lock.

mod builder;
mod erased;
mod error;
mod registry;
mod resolve;
mod store;
mod unit;

pub use builder::RegistryBuilder;
pub use error::{Error, ResolveError, Result};
pub use registry::UnitRegistry;
pub use resolve::CallerResolver;
pub use store::{MokaStore, REGISTRY_STORE_NAME, ResultStore, StoreConfig};
pub use unit::UnitId;
