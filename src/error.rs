use thiserror::Error;

use crate::unit::UnitId;

/// Failures surfaced by the registry's protocol operations.
///
/// None of these are recovered internally and none are retryable: each one
/// signals either a setup mistake or an environment condition that will not
/// change on a second attempt.
#[derive(Debug, Error)]
pub enum Error {
	/// A registration already exists for this unit.
	#[error("unit {0} is already registered")]
	AlreadyRegistered(UnitId),

	/// The operation requires a prior registration that does not exist.
	#[error("unit {0} is not registered")]
	NotRegistered(UnitId),

	/// The key or value type does not match the types captured when the
	/// unit's store was registered. The store is left untouched.
	#[error("type mismatch for unit {unit}: expected {expected}, got {found}")]
	TypeMismatch {
		unit: UnitId,
		expected: &'static str,
		found: &'static str,
	},

	/// The caller could not be identified from the call stack.
	#[error("caller resolution failed: {0}")]
	Resolution(#[from] ResolveError),
}

/// Failures of stack-based caller identification.
#[derive(Debug, Error)]
pub enum ResolveError {
	/// The backtrace came back empty.
	#[error("no stack frames could be captured")]
	NoFrames,

	/// Walking past this crate's own frames ran out of stack before the
	/// configured skip depth was satisfied.
	#[error("no caller frame at skip depth {skip}")]
	FrameOutOfRange { skip: usize },

	/// The caller frame carries no symbol information, so the compiled
	/// representation of the caller is unavailable (e.g. a stripped binary).
	#[error("caller frame has no symbol information")]
	MissingSymbol,

	/// The caller frame's symbol could not be split into an owner path and a
	/// unit name.
	#[error("caller symbol {symbol:?} could not be parsed")]
	MalformedSymbol { symbol: String },

	/// The caller frame matched no registered unit.
	#[error("no registered unit matches caller {owner}::{name}")]
	NoMatch { owner: String, name: String },

	/// Several registered units share the caller's owner and name, and the
	/// frame carries no descriptor that singles one out. Explicit identifiers
	/// are required in this situation.
	#[error("multiple registered units named {owner}::{name}")]
	Ambiguous { owner: String, name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
