use thiserror::Error;

/// The result type for the `fa_engine` crate.
pub type Result<T> = std::result::Result<T, FaError>;

/// A macro that constructs a new FaErrorKind::NotImplemented error.
macro_rules! not_implemented {
    ($feature:expr) => {
        $crate::errors::FaError::new($crate::errors::FaErrorKind::NotImplemented(
            $feature.to_string(),
        ))
    };
}
pub(crate) use not_implemented;

/// The error type for the `fa_engine` crate.
#[derive(Error, Debug)]
pub struct FaError {
    /// The source of the error.
    pub source: Box<FaErrorKind>,
}

impl FaError {
    /// Create a new `FaError`.
    pub fn new(kind: FaErrorKind) -> Self {
        FaError {
            source: Box::new(kind),
        }
    }

    /// The kind of the error.
    pub fn kind(&self) -> &FaErrorKind {
        &self.source
    }
}

impl std::fmt::Display for FaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum FaErrorKind {
    /// A required operand was not supplied.
    #[error("Missing argument: {0}")]
    NullArgument(String),

    /// An argument has an invalid value, e.g. an empty symbol.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A state with the same label already exists in the automaton.
    #[error("Duplicate state '{0}'")]
    DuplicateState(String),

    /// The transition (source, symbol, destination) already exists.
    #[error("Duplicate transition {source_state} --{symbol}--> {destination}")]
    DuplicateTransition {
        /// Label of the source state.
        source_state: String,
        /// The transition symbol.
        symbol: String,
        /// Label of the destination state.
        destination: String,
    },

    /// The referenced state does not belong to the automaton.
    #[error("State not found: {0}")]
    StateNotFound(String),

    /// The symbol is not part of the automaton's alphabet.
    #[error("Symbol '{0}' is not in the alphabet")]
    InvalidSymbol(String),

    /// A memory reservation failed.
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// A caller provided buffer cannot hold the output.
    #[error("Buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// The construction exceeded the configured state ceiling.
    #[error("State count exceeded the limit of {limit} states")]
    StateCountExceeded {
        /// The configured ceiling.
        limit: usize,
    },

    /// An error occurred during the parsing of the regex syntax.
    #[error(transparent)]
    RegexSyntaxError(#[from] RegexError),

    /// The requested algorithm or operation is not implemented.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The operation requires a deterministic automaton.
    #[error("Automaton is not deterministic: {0}")]
    NotDeterministic(String),

    /// A std::io error occurred.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Serializing an automaton failed.
    #[cfg(feature = "json")]
    #[error(transparent)]
    Serialization(serde_json::Error),
}

impl From<RegexError> for FaError {
    fn from(error: RegexError) -> Self {
        FaError::new(FaErrorKind::RegexSyntaxError(error))
    }
}

impl From<std::io::Error> for FaError {
    fn from(error: std::io::Error) -> Self {
        FaError::new(FaErrorKind::IoError(error))
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for FaError {
    fn from(error: serde_json::Error) -> Self {
        FaError::new(FaErrorKind::Serialization(error))
    }
}

impl From<std::collections::TryReserveError> for FaError {
    fn from(error: std::collections::TryReserveError) -> Self {
        FaError::new(FaErrorKind::OutOfMemory(error.to_string()))
    }
}

/// An error type for the regex compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// The pattern contains no tokens.
    #[error("Empty pattern")]
    EmptyPattern,

    /// A parenthesis has no partner.
    #[error("Unbalanced parenthesis at position {position}")]
    UnbalancedParentheses {
        /// Character position of the offending parenthesis.
        position: usize,
    },

    /// A token appears where it is not allowed.
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The offending token.
        token: String,
        /// Character position of the token.
        position: usize,
    },

    /// The pattern ends with a binary operator.
    #[error("Pattern ends with operator '{operator}'")]
    TrailingOperator {
        /// The dangling operator.
        operator: char,
    },

    /// The postfix form could not be reduced to exactly one automaton.
    #[error("Malformed postfix expression: {0}")]
    MalformedPostfix(String),
}
