//! This module contains the composition entry points that run several operations in one call.

use std::fmt::{Display, Formatter};
use std::ops::{BitOr, BitOrAssign};

use log::debug;

use crate::{
    operations::{
        complement, concat, difference, kleene, optional, product, reverse,
        symmetric_difference, union, KleeneKind,
    },
    Automaton, DeterminizeOptions, FaError, FaErrorKind, MinimizeAlgorithm, Result,
};

/// An operation that [`compose`] and [`fold`] can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`union`](crate::union)
    Union,
    /// [`concat`](crate::concat)
    Concatenation,
    /// [`product`](crate::product)
    Product,
    /// [`difference`](crate::difference)
    Difference,
    /// [`symmetric_difference`](crate::symmetric_difference)
    SymmetricDifference,
    /// The Kleene star
    KleeneStar,
    /// The Kleene plus
    KleenePlus,
    /// [`optional`](crate::optional)
    Optional,
    /// [`complement`](crate::complement)
    Complement,
    /// [`reverse`](crate::reverse)
    Reverse,
    /// Determinization with the default options
    Determinize,
    /// Minimization with the default algorithm, determinizing first if necessary
    Minimize,
}

impl Operation {
    /// All operations in the order in which [`compose`] runs them.
    pub const ALL: [Operation; 12] = [
        Operation::Union,
        Operation::Concatenation,
        Operation::Product,
        Operation::Difference,
        Operation::SymmetricDifference,
        Operation::KleeneStar,
        Operation::KleenePlus,
        Operation::Optional,
        Operation::Complement,
        Operation::Reverse,
        Operation::Determinize,
        Operation::Minimize,
    ];

    /// Returns true if the operation needs two operands.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Operation::Union
                | Operation::Concatenation
                | Operation::Product
                | Operation::Difference
                | Operation::SymmetricDifference
        )
    }

    fn flag(&self) -> OperationFlags {
        match self {
            Operation::Union => OperationFlags::UNION,
            Operation::Concatenation => OperationFlags::CONCATENATION,
            Operation::Product => OperationFlags::PRODUCT,
            Operation::Difference => OperationFlags::DIFFERENCE,
            Operation::SymmetricDifference => OperationFlags::SYMMETRIC_DIFFERENCE,
            Operation::KleeneStar => OperationFlags::KLEENE_STAR,
            Operation::KleenePlus => OperationFlags::KLEENE_PLUS,
            Operation::Optional => OperationFlags::OPTIONAL,
            Operation::Complement => OperationFlags::COMPLEMENT,
            Operation::Reverse => OperationFlags::REVERSE,
            Operation::Determinize => OperationFlags::DETERMINIZE,
            Operation::Minimize => OperationFlags::MINIMIZE,
        }
    }

    /// Apply the operation. `second` is required for binary operations and ignored for
    /// unary ones.
    pub fn apply(&self, first: &Automaton, second: Option<&Automaton>) -> Result<Automaton> {
        let operand = || {
            second.ok_or_else(|| {
                FaError::new(FaErrorKind::NullArgument(format!(
                    "{} requires a second automaton",
                    self
                )))
            })
        };
        match self {
            Operation::Union => union(first, operand()?),
            Operation::Concatenation => concat(first, operand()?),
            Operation::Product => product(first, operand()?),
            Operation::Difference => difference(first, operand()?),
            Operation::SymmetricDifference => symmetric_difference(first, operand()?),
            Operation::KleeneStar => kleene(first, KleeneKind::Star),
            Operation::KleenePlus => kleene(first, KleeneKind::Plus),
            Operation::Optional => optional(first),
            Operation::Complement => complement(first),
            Operation::Reverse => reverse(first),
            Operation::Determinize => first.determinize(&DeterminizeOptions::default()),
            Operation::Minimize => optimize(
                first,
                &DeterminizeOptions::default(),
                MinimizeAlgorithm::default(),
            ),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Union => "union",
            Operation::Concatenation => "concatenation",
            Operation::Product => "product",
            Operation::Difference => "difference",
            Operation::SymmetricDifference => "symmetric difference",
            Operation::KleeneStar => "kleene star",
            Operation::KleenePlus => "kleene plus",
            Operation::Optional => "optional",
            Operation::Complement => "complement",
            Operation::Reverse => "reverse",
            Operation::Determinize => "determinize",
            Operation::Minimize => "minimize",
        };
        write!(f, "{}", name)
    }
}

/// A set of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperationFlags(u32);

impl OperationFlags {
    /// No operation.
    pub const NONE: OperationFlags = OperationFlags(0);
    /// See [`Operation::Union`].
    pub const UNION: OperationFlags = OperationFlags(1 << 0);
    /// See [`Operation::Concatenation`].
    pub const CONCATENATION: OperationFlags = OperationFlags(1 << 1);
    /// See [`Operation::Product`].
    pub const PRODUCT: OperationFlags = OperationFlags(1 << 2);
    /// See [`Operation::Difference`].
    pub const DIFFERENCE: OperationFlags = OperationFlags(1 << 3);
    /// See [`Operation::SymmetricDifference`].
    pub const SYMMETRIC_DIFFERENCE: OperationFlags = OperationFlags(1 << 4);
    /// See [`Operation::KleeneStar`].
    pub const KLEENE_STAR: OperationFlags = OperationFlags(1 << 5);
    /// See [`Operation::KleenePlus`].
    pub const KLEENE_PLUS: OperationFlags = OperationFlags(1 << 6);
    /// See [`Operation::Optional`].
    pub const OPTIONAL: OperationFlags = OperationFlags(1 << 7);
    /// See [`Operation::Complement`].
    pub const COMPLEMENT: OperationFlags = OperationFlags(1 << 8);
    /// See [`Operation::Reverse`].
    pub const REVERSE: OperationFlags = OperationFlags(1 << 9);
    /// See [`Operation::Determinize`].
    pub const DETERMINIZE: OperationFlags = OperationFlags(1 << 10);
    /// See [`Operation::Minimize`].
    pub const MINIMIZE: OperationFlags = OperationFlags(1 << 11);
    /// All operations with two operands.
    pub const ALL_BINARY: OperationFlags = OperationFlags(0b11111);
    /// All operations with one operand.
    pub const ALL_UNARY: OperationFlags = OperationFlags(0b1111111 << 5);
    /// All operations.
    pub const ALL: OperationFlags = OperationFlags(Self::ALL_BINARY.0 | Self::ALL_UNARY.0);

    /// Returns true if all operations of `other` are in `self`.
    pub fn contains(self, other: OperationFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no operation is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The operations of the set in the order of [`Operation::ALL`].
    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL
            .into_iter()
            .filter(move |operation| self.contains(operation.flag()))
    }
}

impl BitOr for OperationFlags {
    type Output = OperationFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        OperationFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for OperationFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<Operation> for OperationFlags {
    fn from(operation: Operation) -> Self {
        operation.flag()
    }
}

/// The outcome of one operation of [`compose`].
#[derive(Debug)]
pub struct OperationResult {
    operation: Operation,
    result: Result<Automaton>,
}

impl OperationResult {
    /// The operation that produced this result.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns true if the operation succeeded.
    pub fn success(&self) -> bool {
        self.result.is_ok()
    }

    /// The resulting automaton, if the operation succeeded.
    pub fn automaton(&self) -> Option<&Automaton> {
        self.result.as_ref().ok()
    }

    /// The error message, if the operation failed.
    pub fn error_message(&self) -> Option<String> {
        self.result.as_ref().err().map(|e| e.to_string())
    }

    /// Take the result.
    pub fn into_result(self) -> Result<Automaton> {
        self.result
    }
}

/// The outcomes of all operations of one [`compose`] call.
#[derive(Debug, Default)]
pub struct OperationResults {
    results: Vec<OperationResult>,
}

impl OperationResults {
    /// Returns true if every requested operation succeeded.
    pub fn success(&self) -> bool {
        self.results.iter().all(OperationResult::success)
    }

    /// The number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no operation was requested.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The result of the given operation, if it was requested.
    pub fn get(&self, operation: Operation) -> Option<&OperationResult> {
        self.results.iter().find(|r| r.operation == operation)
    }

    /// Iterate over the results in the order of [`Operation::ALL`].
    pub fn iter(&self) -> impl Iterator<Item = &OperationResult> {
        self.results.iter()
    }
}

impl IntoIterator for OperationResults {
    type Item = OperationResult;
    type IntoIter = std::vec::IntoIter<OperationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Run every operation of `flags` on the operands.
///
/// The operations are independent of each other: each one works on the unmodified
/// operands and a failing operation does not stop the others. Binary operations fail with
/// `NullArgument` if `second` is `None`.
pub fn compose(
    first: &Automaton,
    second: Option<&Automaton>,
    flags: OperationFlags,
) -> OperationResults {
    let results: Vec<OperationResult> = flags
        .iter()
        .map(|operation| OperationResult {
            operation,
            result: operation.apply(first, second),
        })
        .collect();
    debug!(
        "Composed {} operations, {} succeeded.",
        results.len(),
        results.iter().filter(|r| r.success()).count()
    );
    OperationResults { results }
}

/// The grouping of a chain of binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
    /// `((a op b) op c) op d`
    #[default]
    Left,
    /// `a op (b op (c op d))`
    Right,
}

/// Combine a sequence of automata with a binary operation.
///
/// A single automaton is returned as a copy.
///
/// # Errors
/// * `NullArgument` if `automata` is empty
/// * `InvalidArgument` if the operation is not binary
/// * every error of the operation itself
pub fn fold(
    automata: &[Automaton],
    operation: Operation,
    associativity: Associativity,
) -> Result<Automaton> {
    if !operation.is_binary() {
        return Err(FaError::new(FaErrorKind::InvalidArgument(format!(
            "{} is not a binary operation",
            operation
        ))));
    }
    let no_operand =
        || FaError::new(FaErrorKind::NullArgument("no automaton to fold".to_string()));
    match associativity {
        Associativity::Left => {
            let (first, rest) = automata.split_first().ok_or_else(no_operand)?;
            rest.iter().try_fold(first.clone(), |accumulated, automaton| {
                operation.apply(&accumulated, Some(automaton))
            })
        }
        Associativity::Right => {
            let (last, rest) = automata.split_last().ok_or_else(no_operand)?;
            rest.iter()
                .rev()
                .try_fold(last.clone(), |accumulated, automaton| {
                    operation.apply(automaton, Some(&accumulated))
                })
        }
    }
}

/// Determinize and minimize an automaton with the given algorithms.
pub fn optimize(
    automaton: &Automaton,
    determinize: &DeterminizeOptions,
    minimize: MinimizeAlgorithm,
) -> Result<Automaton> {
    automaton.determinize(determinize)?.minimize(minimize)
}
