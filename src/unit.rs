use std::borrow::Cow;
use std::fmt;

/// Uniquely names a callable unit within the running process.
///
/// A unit is identified by the path of its owning module or type (`owner`),
/// the unit's own name (`name`), and a `descriptor` encoding its signature.
/// The descriptor exists because owner and name alone are not unique: two
/// monomorphizations of one generic function, or same-named methods from
/// different traits, share both.
///
/// Two identifiers are equal iff all three fields match exactly.
///
/// # Example
///
/// ```
/// use call_memo::UnitId;
///
/// let id = UnitId::new("db::Lookup", "find", "fn(&str) -> Option<Record>");
/// assert_eq!(id.owner(), "db::Lookup");
/// assert_eq!(id.name(), "find");
///
/// let same = UnitId::from_path("db::Lookup::find", "fn(&str) -> Option<Record>");
/// assert_eq!(id, same);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitId {
	owner: Cow<'static, str>,
	name: Cow<'static, str>,
	descriptor: Cow<'static, str>,
}

impl UnitId {
	/// Create an identifier from its three parts.
	pub fn new(
		owner: impl Into<Cow<'static, str>>,
		name: impl Into<Cow<'static, str>>,
		descriptor: impl Into<Cow<'static, str>>,
	) -> Self {
		Self {
			owner: owner.into(),
			name: name.into(),
			descriptor: descriptor.into(),
		}
	}

	/// Create an identifier from a `::`-separated path plus a descriptor.
	///
	/// The split is angle-bracket aware, so paths like
	/// `<T as Probe>::find` keep the qualified prefix intact as the owner.
	/// A path with no separator becomes a name with an empty owner.
	pub fn from_path(
		path: impl Into<Cow<'static, str>>,
		descriptor: impl Into<Cow<'static, str>>,
	) -> Self {
		let path = path.into();
		match (split_index(&path), path) {
			(Some(at), Cow::Borrowed(p)) => Self {
				owner: Cow::Borrowed(&p[..at]),
				name: Cow::Borrowed(&p[at + 2..]),
				descriptor: descriptor.into(),
			},
			(Some(at), Cow::Owned(p)) => Self {
				owner: Cow::Owned(p[..at].to_string()),
				name: Cow::Owned(p[at + 2..].to_string()),
				descriptor: descriptor.into(),
			},
			(None, path) => Self {
				owner: Cow::Borrowed(""),
				name: path,
				descriptor: descriptor.into(),
			},
		}
	}

	/// Path of the owning module or type.
	pub fn owner(&self) -> &str {
		&self.owner
	}

	/// Name of the unit itself.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Signature descriptor. Empty when the unit was captured without one.
	pub fn descriptor(&self) -> &str {
		&self.descriptor
	}

	// Backing for the `unit_id!` macro: trims the nested-fn and closure
	// suffixes off a `type_name` capture.
	#[doc(hidden)]
	pub fn __capture(nested: &'static str, descriptor: &'static str) -> Self {
		let mut path = nested.strip_suffix("::__unit").unwrap_or(nested);
		while let Some(enclosing) = path.strip_suffix("::{{closure}}") {
			path = enclosing;
		}
		Self::from_path(path, descriptor)
	}
}

impl fmt::Display for UnitId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.owner.is_empty() {
			write!(f, "{}", self.name)?;
		} else {
			write!(f, "{}::{}", self.owner, self.name)?;
		}
		if !self.descriptor.is_empty() {
			write!(f, " [{}]", self.descriptor)?;
		}
		Ok(())
	}
}

/// Byte index of the last `::` separator at angle-bracket depth zero.
pub(crate) fn split_index(path: &str) -> Option<usize> {
	let bytes = path.as_bytes();
	let mut depth = 0usize;
	let mut found = None;
	let mut i = 0;
	while i < bytes.len() {
		match bytes[i] {
			b'<' => depth += 1,
			b'>' => depth = depth.saturating_sub(1),
			b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
				found = Some(i);
				i += 1;
			}
			_ => {}
		}
		i += 1;
	}
	found
}

/// Capture the enclosing function as a [`UnitId`].
///
/// Must be invoked inside the body of the unit it names. The zero-argument
/// form leaves the descriptor empty; same-named units must use the
/// one-argument form and supply distinct signature strings.
///
/// # Example
///
/// ```
/// use call_memo::{UnitId, unit_id};
///
/// fn find(name: &str) -> usize {
///     let id = unit_id!("fn(&str) -> usize");
///     assert_eq!(id.name(), "find");
///     name.len()
/// }
///
/// find("alice");
/// ```
#[macro_export]
macro_rules! unit_id {
	() => {
		$crate::unit_id!("")
	};
	($descriptor:expr) => {{
		fn __unit() {}
		fn __type_name_of<T>(_: T) -> &'static str {
			::std::any::type_name::<T>()
		}
		$crate::UnitId::__capture(__type_name_of(__unit), $descriptor)
	}};
}
