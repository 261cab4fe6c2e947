use std::path::PathBuf;

use backtrace::Backtrace;
use tracing::trace;

use crate::error::ResolveError;
use crate::unit::{self, UnitId};

/// Frame prefixes walked over before the caller frame is reached: this
/// crate's own modules plus capture and runtime plumbing.
const INTERNAL_PREFIXES: &[&str] = &["call_memo::", "backtrace::", "std::", "core::"];

/// Identifies the code that called into the registry by inspecting the live
/// call stack.
///
/// Every capture symbolizes a fresh backtrace, which reads the executable's
/// debug information. That cost is paid on each invocation, so the
/// explicit-identifier operations are the fast path; the caller-resolved
/// forms are a convenience.
///
/// The resolver structurally skips all frames belonging to this crate, then
/// skips `skip` further frames. The default of zero resolves the immediate
/// caller of the registry operation; each host-side wrapper layer between
/// the cached unit and the registry call needs one more. Resolution is
/// depth-sensitive: frames only exist where the compiler kept them, so
/// wrappers that must stay visible belong behind `#[inline(never)]`.
#[derive(Clone, Debug)]
pub struct CallerResolver {
	skip: usize,
}

/// The caller frame as read off the stack: parsed symbol plus source
/// position, when the debug info carries one.
#[derive(Clone, Debug)]
pub(crate) struct CallerFrame {
	/// Full symbol including its disambiguator suffix. Distinct per
	/// monomorphization, which is what tells same-named units apart.
	pub symbol: String,
	pub owner: String,
	pub name: String,
	pub file: Option<PathBuf>,
	pub line: Option<u32>,
}

impl CallerFrame {
	/// Identifier for a unit first seen on the stack, with the full symbol
	/// standing in as the descriptor.
	pub fn unit_id(&self) -> UnitId {
		UnitId::new(self.owner.clone(), self.name.clone(), self.symbol.clone())
	}
}

impl CallerResolver {
	/// Resolver targeting the immediate caller of the registry operation.
	pub fn new() -> Self {
		Self { skip: 0 }
	}

	/// Resolver skipping `skip` additional frames beyond this crate's own.
	pub fn with_skip(skip: usize) -> Self {
		Self { skip }
	}

	/// The configured extra skip count.
	pub fn skip(&self) -> usize {
		self.skip
	}

	/// Capture the stack and read off the caller frame.
	pub(crate) fn capture(&self) -> Result<CallerFrame, ResolveError> {
		// Symbolized capture: reads debug info on every call.
		let backtrace = Backtrace::new();
		let frames = backtrace.frames();
		if frames.is_empty() {
			return Err(ResolveError::NoFrames);
		}

		let mut inside_own = false;
		let mut remaining = self.skip;
		for frame in frames {
			// Inlined chains surface as several symbols per frame,
			// innermost first.
			for symbol in frame.symbols() {
				let Some(raw) = symbol.name() else {
					if inside_own {
						return Err(ResolveError::MissingSymbol);
					}
					continue;
				};
				let plain = format!("{raw:#}");
				if is_internal(&plain) {
					inside_own = true;
					continue;
				}
				if !inside_own {
					continue;
				}
				if remaining > 0 {
					remaining -= 1;
					continue;
				}

				let (owner, name) = parse_symbol(&plain)
					.ok_or_else(|| ResolveError::MalformedSymbol { symbol: plain.clone() })?;
				trace!(symbol = %plain, owner = %owner, name = %name, "resolved caller frame");
				return Ok(CallerFrame {
					symbol: raw.to_string(),
					owner,
					name,
					file: symbol.filename().map(PathBuf::from),
					line: symbol.lineno(),
				});
			}
		}

		Err(ResolveError::FrameOutOfRange { skip: self.skip })
	}
}

impl Default for CallerResolver {
	fn default() -> Self {
		Self::new()
	}
}

fn is_internal(plain: &str) -> bool {
	INTERNAL_PREFIXES.iter().any(|prefix| plain.starts_with(prefix))
}

/// Split a demangled symbol into owner path and unit name. Closure suffixes
/// collapse onto the enclosing named function.
fn parse_symbol(plain: &str) -> Option<(String, String)> {
	let mut path = plain;
	while let Some(enclosing) = path.strip_suffix("::{{closure}}") {
		path = enclosing;
	}
	if path.is_empty() {
		return None;
	}
	match unit::split_index(path) {
		Some(at) => Some((path[..at].to_string(), path[at + 2..].to_string())),
		None => Some((String::new(), path.to_string())),
	}
}
