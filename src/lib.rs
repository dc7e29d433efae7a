#![forbid(missing_docs)]
//! The `fa_engine` crate provides finite automata over string symbols.
//! Automata are built from single symbols or from regex patterns, combined with the usual
//! algebra, determinized with the subset construction and minimized with partition
//! refinement. Every operation creates a new automaton and leaves its operands untouched.

/// Module that provides the automaton data model.
mod automaton;
pub use automaton::{Automaton, State, Symbol, Transition};

/// Module with the simulation of an automaton on an input word.
mod accept;

/// Module with the insertion ordered set and map types.
mod collections;
pub use collections::{Map, Set};

/// Module with the composition of several operations.
mod compose;
pub use compose::{
    compose, fold, optimize, Associativity, Operation, OperationFlags, OperationResult,
    OperationResults,
};

/// Module with the subset construction.
mod determinize;
pub use determinize::{DeterminizeAlgorithm, DeterminizeOptions, SubsetNaming};

/// Module with conversion to graphviz dot format
#[cfg(feature = "dot")]
mod dot;
#[cfg(feature = "dot")]
pub use dot::{export_dot_file, render_to};

/// Module with error definitions
mod errors;
pub use errors::{FaError, FaErrorKind, RegexError, Result};

/// Module that provides id types that can also be used to index into slices.
mod ids;
pub use ids::{GroupID, StateID};

/// Module with the JSON export.
#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::{export_json, export_json_file};

/// Module with the minimization of deterministic automata.
mod minimize;
pub use minimize::MinimizeAlgorithm;

/// The automaton algebra.
mod operations;
pub use operations::{
    complement, concat, difference, kleene, kleene_plus, kleene_star, optional, product,
    reverse, symmetric_difference, union, KleeneKind,
};

/// The parser module contains the conversion of regex patterns to postfix notation.
mod parser;
pub use parser::{format_postfix, infix_to_postfix, PostfixToken};

/// The module containing the Thompson construction from postfix tokens.
mod thompson;
