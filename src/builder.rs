use crate::registry::UnitRegistry;
use crate::resolve::CallerResolver;

/// Builder for configuring a [`UnitRegistry`].
///
/// # Example
///
/// ```
/// use call_memo::RegistryBuilder;
///
/// // One wrapper layer sits between the cached units and the registry
/// // calls, so caller resolution skips one extra frame.
/// let registry = RegistryBuilder::new().caller_skip(1).build();
/// assert!(registry.is_empty());
/// ```
pub struct RegistryBuilder {
	caller_skip: usize,
}

/// Upper bound on the configurable extra skip. Deeper wrapper stacks than
/// this are a sign the explicit-identifier forms should be used instead.
const MAX_CALLER_SKIP: usize = 32;

impl RegistryBuilder {
	/// Builder with default settings: caller resolution targets the
	/// immediate caller of the registry operation.
	pub fn new() -> Self {
		Self { caller_skip: 0 }
	}

	/// Skip `skip` additional stack frames during caller resolution, one
	/// per host-side wrapper layer between the cached unit and the registry
	/// call.
	///
	/// Default: 0
	pub fn caller_skip(mut self, skip: usize) -> Self {
		assert!(skip <= MAX_CALLER_SKIP, "caller_skip must be at most {MAX_CALLER_SKIP}");
		self.caller_skip = skip;
		self
	}

	/// Build the registry with the configured settings.
	pub fn build(self) -> UnitRegistry {
		UnitRegistry::with_resolver(CallerResolver::with_skip(self.caller_skip))
	}
}

impl Default for RegistryBuilder {
	fn default() -> Self {
		Self::new()
	}
}
