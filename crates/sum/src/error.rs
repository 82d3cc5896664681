use thiserror::Error;

/// Configuration errors raised while declaring a sum or validating a switch.
///
/// These describe programming mistakes. Callers usually declare sums once at
/// startup and treat an error as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	/// A new variant was added after the sum was sealed.
	#[error("cannot add variant {variant} to sealed sum {sum}")]
	Sealed { sum: &'static str, variant: &'static str },
	/// Two different variants resolve to the same wire name.
	#[error("variant name {name:?} of sum {sum} is claimed by both {existing} and {incoming}")]
	DuplicateName {
		sum: &'static str,
		name: String,
		existing: &'static str,
		incoming: &'static str,
	},
	/// A rename targets a type that is not a variant of the sum.
	#[error("cannot rename {variant}: not a variant of sum {sum}")]
	UnknownVariant { sum: &'static str, variant: &'static str },
	/// Tagging parameters that cannot produce a decodable payload.
	#[error("invalid tagging for sum {sum}: {reason}")]
	InvalidTagging { sum: &'static str, reason: &'static str },
	/// The sum has no declaration.
	#[error("sum {sum} is not declared")]
	Undeclared { sum: &'static str },
	/// A switch does not supply one handler per variant plus a fallback.
	#[error("switch over {sum} needs {expected} handlers (variants plus fallback), found {found}")]
	Arity {
		sum: &'static str,
		expected: usize,
		found: usize,
	},
	/// A switch handler does not match the variant at its position.
	#[error("switch over {sum}: handler {position} must take {expected}, found {found}")]
	CaseOrder {
		sum: &'static str,
		position: usize,
		expected: &'static str,
		found: &'static str,
	},
}
