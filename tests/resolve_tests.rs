//! Caller-resolution scenarios. The probed functions are `#[inline(never)]`
//! so their frames stay on the stack for the resolver to find.

use call_memo::{Error, MokaStore, RegistryBuilder, ResolveError, Result, UnitId, UnitRegistry, unit_id};

#[inline(never)]
fn cached_double(registry: &UnitRegistry, n: u32) -> u64 {
	let id = unit_id!("fn(u32) -> u64");
	if !registry.is_registered(&id) {
		registry
			.register(id, MokaStore::<u32, u64>::new("double-results"))
			.unwrap();
	}
	if let Some(hit) = registry.get_caller_result::<u32, u64>(&n).unwrap() {
		return hit;
	}
	let value = u64::from(n) * 2;
	registry.store_caller_result(n, value).unwrap();
	value
}

#[test]
fn test_explicitly_registered_unit_resolves_from_inside() {
	let registry = UnitRegistry::new();

	assert_eq!(cached_double(&registry, 21), 42);
	// Second call is served from the cache through caller resolution.
	assert_eq!(cached_double(&registry, 21), 42);

	let id = UnitId::new("resolve_tests", "cached_double", "fn(u32) -> u64");
	assert!(registry.is_registered(&id));
	assert!(registry.is_result_cached::<u32, u64>(&id, &21).unwrap());
}

#[inline(never)]
fn unregistered_get(registry: &UnitRegistry) -> Result<Option<u64>> {
	registry.get_caller_result::<u32, u64>(&1)
}

#[inline(never)]
fn unregistered_store(registry: &UnitRegistry) -> Result<()> {
	registry.store_caller_result(1u32, 2u64)
}

#[inline(never)]
fn unregistered_cached(registry: &UnitRegistry) -> Result<bool> {
	registry.is_caller_result_cached::<u32, u64>(&1)
}

#[inline(never)]
fn unregistered_probe(registry: &UnitRegistry) -> Result<bool> {
	registry.is_caller_registered()
}

#[test]
fn test_unregistered_caller_fails_not_registered() {
	let registry = UnitRegistry::new();

	let err = unregistered_get(&registry).unwrap_err();
	assert!(matches!(&err, Error::NotRegistered(id) if id.name() == "unregistered_get"));

	let err = unregistered_store(&registry).unwrap_err();
	assert!(matches!(&err, Error::NotRegistered(id) if id.name() == "unregistered_store"));

	let err = unregistered_cached(&registry).unwrap_err();
	assert!(matches!(&err, Error::NotRegistered(id) if id.name() == "unregistered_cached"));

	// The registered/not-registered question itself stays answerable.
	assert!(!unregistered_probe(&registry).unwrap());
}

#[inline(never)]
fn auto_registered(registry: &UnitRegistry) -> Result<UnitId> {
	registry.register_caller(MokaStore::<u32, String>::new("auto-results"))
}

#[test]
fn test_register_caller_derives_the_calling_unit() {
	let registry = UnitRegistry::new();

	let id = auto_registered(&registry).unwrap();
	assert_eq!(id.name(), "auto_registered");
	assert_eq!(id.owner(), "resolve_tests");
	assert!(!id.descriptor().is_empty());
	assert!(registry.is_registered(&id));

	// Same caller, same identifier: the second registration is a duplicate.
	let second = auto_registered(&registry);
	assert!(matches!(second, Err(Error::AlreadyRegistered(u)) if u == id));
}

#[inline(never)]
fn find<T: 'static>(registry: &UnitRegistry) -> String {
	if !registry.is_caller_registered().unwrap() {
		registry
			.register_caller(MokaStore::<u32, String>::new(std::any::type_name::<T>()))
			.unwrap();
	}
	if let Some(hit) = registry.get_caller_result::<u32, String>(&0).unwrap() {
		return hit;
	}
	let value = std::any::type_name::<T>().to_string();
	registry.store_caller_result(0u32, value.clone()).unwrap();
	value
}

#[test]
fn test_monomorphizations_resolve_to_distinct_units() {
	let registry = UnitRegistry::new();

	let s = find::<String>(&registry);
	let i = find::<i64>(&registry);
	assert_ne!(s, i);
	assert_eq!(registry.len(), 2);

	// Cached round trips stay separated per instantiation.
	assert_eq!(find::<String>(&registry), s);
	assert_eq!(find::<i64>(&registry), i);
}

#[inline(never)]
fn ambiguous_unit(registry: &UnitRegistry) -> Result<Option<u64>> {
	registry.get_caller_result::<u32, u64>(&1)
}

#[test]
fn test_same_named_explicit_units_are_ambiguous_from_the_stack() {
	let registry = UnitRegistry::new();
	registry
		.register(
			UnitId::new("resolve_tests", "ambiguous_unit", "fn(u32) -> u64"),
			MokaStore::<u32, u64>::new("by-int"),
		)
		.unwrap();
	registry
		.register(
			UnitId::new("resolve_tests", "ambiguous_unit", "fn(&str) -> u64"),
			MokaStore::<u32, u64>::new("by-str"),
		)
		.unwrap();

	let err = ambiguous_unit(&registry).unwrap_err();
	assert!(matches!(
		err,
		Error::Resolution(ResolveError::Ambiguous { ref name, .. }) if name == "ambiguous_unit"
	));
}

#[inline(never)]
fn resolving_unit(registry: &UnitRegistry) -> Result<UnitId> {
	registry.resolve_caller()
}

#[test]
fn test_resolve_caller_directly() {
	let registry = UnitRegistry::new();

	let miss = resolving_unit(&registry).unwrap_err();
	assert!(matches!(
		miss,
		Error::Resolution(ResolveError::NoMatch { ref name, .. }) if name == "resolving_unit"
	));

	let id = UnitId::new("resolve_tests", "resolving_unit", "fn() -> UnitId");
	registry
		.register(id.clone(), MokaStore::<u32, u64>::new("resolving"))
		.unwrap();
	assert_eq!(resolving_unit(&registry).unwrap(), id);
}

#[inline(never)]
fn helper_layer(registry: &UnitRegistry) -> Result<UnitId> {
	registry.register_caller(MokaStore::<u32, u64>::new("wrapped"))
}

#[inline(never)]
fn wrapped_unit(registry: &UnitRegistry) -> Result<UnitId> {
	helper_layer(registry)
}

#[test]
fn test_caller_skip_targets_the_wrapping_frame() {
	// One wrapper layer between the unit and the registry call.
	let registry = RegistryBuilder::new().caller_skip(1).build();

	let id = wrapped_unit(&registry).unwrap();
	assert_eq!(id.name(), "wrapped_unit");
}

#[test]
fn test_default_skip_targets_the_immediate_caller() {
	let registry = UnitRegistry::new();

	let id = wrapped_unit(&registry).unwrap();
	assert_eq!(id.name(), "helper_layer");
}
