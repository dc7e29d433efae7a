//! This module contains the automaton algebra.
//!
//! All operations are pure: they copy every state and transition of their operands into a
//! newly allocated automaton and never modify the operands. States are created by index,
//! the result is relabeled to `q0..q{n-1}` afterwards.

use log::debug;

use crate::{
    errors::not_implemented, Automaton, FaError, FaErrorKind, Result, StateID, Symbol,
};

/// The variant of the Kleene closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KleeneKind {
    /// Zero or more repetitions.
    #[default]
    Star,
    /// One or more repetitions.
    Plus,
}

/// Copy states and transitions of `source` into `target`, starting at index `offset`.
/// The flags of the copies are set by the caller.
fn copy_states(target: &mut Automaton, source: &Automaton, offset: usize) {
    for state in source.states() {
        for transition in state.transitions() {
            target.link(
                transition.source() + offset,
                transition.symbol().clone(),
                transition.target() + offset,
            );
        }
    }
}

/// The union of two automata.
///
/// The result has `|a| + |b| + 2` states: the copies of both operands without their flags,
/// a new start state with epsilon transitions to the former start states and a new accept
/// state that all former accept states reach by an epsilon transition.
pub fn union(a: &Automaton, b: &Automaton) -> Result<Automaton> {
    let offset = a.state_count();
    let start_state = StateID::new(a.state_count() + b.state_count());
    let end_state = start_state + 1;
    let mut automaton = Automaton::with_states(
        a.state_count() + b.state_count() + 2,
        a.alphabet().union(b.alphabet()),
    )?;
    copy_states(&mut automaton, a, 0);
    copy_states(&mut automaton, b, offset);
    automaton.mark(start_state, true, false);
    automaton.mark(end_state, false, true);

    for (operand, offset) in [(a, 0), (b, offset)] {
        for state in operand.start_states() {
            automaton.link(start_state, Symbol::Epsilon, state + offset);
        }
        for state in operand.accept_states() {
            automaton.link(state + offset, Symbol::Epsilon, end_state);
        }
    }

    automaton.rename_states();
    debug!("Union has {} states", automaton.state_count());
    Ok(automaton)
}

/// The concatenation of two automata.
///
/// The start states of `a` and the accept states of `b` keep their role, every accept
/// state of `a` gets an epsilon transition to every start state of `b`.
pub fn concat(a: &Automaton, b: &Automaton) -> Result<Automaton> {
    let offset = a.state_count();
    let mut automaton = Automaton::with_states(
        a.state_count() + b.state_count(),
        a.alphabet().union(b.alphabet()),
    )?;
    copy_states(&mut automaton, a, 0);
    copy_states(&mut automaton, b, offset);
    for state in a.states() {
        automaton.mark(state.id(), state.is_start(), false);
    }
    for state in b.states() {
        automaton.mark(state.id() + offset, false, state.is_accept());
    }

    // Connect the end states of a to the start states of b
    for end_state in a.accept_states() {
        for start_state in b.start_states() {
            automaton.link(end_state, Symbol::Epsilon, start_state + offset);
        }
    }

    automaton.rename_states();
    debug!("Concatenation has {} states", automaton.state_count());
    Ok(automaton)
}

/// The product automaton that accepts the intersection of both languages.
///
/// The state for the pair `(i, j)` has index `i * |b| + j`. It is a start state if both
/// components are, and an accept state if both components are. Literal transitions are
/// taken synchronously, epsilon transitions of one component are taken while the other
/// component stays where it is.
pub fn product(a: &Automaton, b: &Automaton) -> Result<Automaton> {
    let width = b.state_count();
    let pair = |i: StateID, j: StateID| StateID::new(i.as_usize() * width + j.as_usize());
    let mut automaton = Automaton::with_states(
        a.state_count() * b.state_count(),
        a.alphabet().intersection(b.alphabet()),
    )?;

    for state_a in a.states() {
        for state_b in b.states() {
            let source = pair(state_a.id(), state_b.id());
            automaton.mark(
                source,
                state_a.is_start() && state_b.is_start(),
                state_a.is_accept() && state_b.is_accept(),
            );
            for transition_a in state_a.transitions() {
                if transition_a.is_epsilon() {
                    automaton.link(
                        source,
                        Symbol::Epsilon,
                        pair(transition_a.target(), state_b.id()),
                    );
                    continue;
                }
                for transition_b in state_b.transitions() {
                    if transition_a.symbol() == transition_b.symbol() {
                        automaton.link(
                            source,
                            transition_a.symbol().clone(),
                            pair(transition_a.target(), transition_b.target()),
                        );
                    }
                }
            }
            for transition_b in state_b.transitions().iter().filter(|t| t.is_epsilon()) {
                automaton.link(
                    source,
                    Symbol::Epsilon,
                    pair(state_a.id(), transition_b.target()),
                );
            }
        }
    }

    automaton.rename_states();
    debug!("Product has {} states", automaton.state_count());
    Ok(automaton)
}

/// The Kleene closure of an automaton.
///
/// `Star` adds a new start and a new accept state, an epsilon transition between them for
/// the empty word and loops from every former accept state back to every former start
/// state. `Plus` keeps the states and their roles and only adds the loops, so at least one
/// pass through the automaton is required.
pub fn kleene(automaton: &Automaton, kind: KleeneKind) -> Result<Automaton> {
    let count = automaton.state_count();
    let mut result = match kind {
        KleeneKind::Star => Automaton::with_states(count + 2, automaton.alphabet().clone())?,
        KleeneKind::Plus => Automaton::with_states(count, automaton.alphabet().clone())?,
    };
    copy_states(&mut result, automaton, 0);

    for end_state in automaton.accept_states() {
        for start_state in automaton.start_states() {
            result.link(end_state, Symbol::Epsilon, start_state);
        }
    }

    match kind {
        KleeneKind::Star => {
            let start_state = StateID::new(count);
            let end_state = start_state + 1;
            result.mark(start_state, true, false);
            result.mark(end_state, false, true);
            result.link(start_state, Symbol::Epsilon, end_state);
            for state in automaton.start_states() {
                result.link(start_state, Symbol::Epsilon, state);
            }
            for state in automaton.accept_states() {
                result.link(state, Symbol::Epsilon, end_state);
            }
        }
        KleeneKind::Plus => {
            for state in automaton.states() {
                result.mark(state.id(), state.is_start(), state.is_accept());
            }
        }
    }

    result.rename_states();
    debug!("Kleene {:?} has {} states", kind, result.state_count());
    Ok(result)
}

/// Shorthand for `kleene(automaton, KleeneKind::Star)`.
pub fn kleene_star(automaton: &Automaton) -> Result<Automaton> {
    kleene(automaton, KleeneKind::Star)
}

/// Shorthand for `kleene(automaton, KleeneKind::Plus)`.
pub fn kleene_plus(automaton: &Automaton) -> Result<Automaton> {
    kleene(automaton, KleeneKind::Plus)
}

/// The automaton that accepts the empty word and the language of `automaton`.
///
/// A new state that is both start and accept state bypasses the automaton. It reaches
/// the former start states by epsilon transitions and has no incoming transitions, so the
/// bypass never shortcuts a path that loops back into a former start state.
pub fn optional(automaton: &Automaton) -> Result<Automaton> {
    let count = automaton.state_count();
    let mut result = Automaton::with_states(count + 1, automaton.alphabet().clone())?;
    copy_states(&mut result, automaton, 0);
    for state in automaton.states() {
        result.mark(state.id(), false, state.is_accept());
    }
    let start_state = StateID::new(count);
    result.mark(start_state, true, true);
    for state in automaton.start_states() {
        result.link(start_state, Symbol::Epsilon, state);
    }
    result.rename_states();
    Ok(result)
}

/// The complement with respect to the alphabet.
/// Requires a complete, deterministic automaton. Not implemented yet.
pub fn complement(automaton: &Automaton) -> Result<Automaton> {
    if !automaton.is_deterministic() {
        return Err(FaError::new(FaErrorKind::NotDeterministic(
            "complement requires a deterministic automaton".to_string(),
        )));
    }
    Err(not_implemented!("complement"))
}

/// The automaton of the reversed language. Not implemented yet.
pub fn reverse(_automaton: &Automaton) -> Result<Automaton> {
    Err(not_implemented!("reverse"))
}

/// The difference `a - b`, i.e. the product of `a` with the complement of `b`.
/// Not implemented yet.
pub fn difference(_a: &Automaton, _b: &Automaton) -> Result<Automaton> {
    Err(not_implemented!("difference"))
}

/// The symmetric difference, i.e. the union of both one-sided differences.
/// Not implemented yet.
pub fn symmetric_difference(_a: &Automaton, _b: &Automaton) -> Result<Automaton> {
    Err(not_implemented!("symmetric difference"))
}

#[cfg(test)]
mod tests {
    use crate::automaton::tests::{ends_with_ab, even_as, words};

    use super::*;

    // True if the word splits into a nonempty sequence of nonempty words accepted by
    // the automaton.
    fn in_repetition(automaton: &Automaton, word: &str) -> bool {
        let mut reachable = vec![false; word.len() + 1];
        reachable[0] = true;
        for end in 1..=word.len() {
            reachable[end] =
                (0..end).any(|start| reachable[start] && automaton.accepts(&word[start..end]));
        }
        !word.is_empty() && reachable[word.len()]
    }

    fn in_concatenation(a: &Automaton, b: &Automaton, word: &str) -> bool {
        (0..=word.len()).any(|split| a.accepts(&word[..split]) && b.accepts(&word[split..]))
    }

    #[test]
    fn test_union() {
        let a = ends_with_ab();
        let b = even_as();
        let union = union(&a, &b).unwrap();
        assert_eq!(union.state_count(), a.state_count() + b.state_count() + 2);
        assert!(union.accepts("ab"));
        assert!(union.accepts("aa"));
        assert!(!union.accepts("a"));
        assert!(union.accepts(""));
        assert_eq!(union.start_states().count(), 1);
        assert_eq!(union.accept_states().count(), 1);
        assert_eq!(union.states()[union.state_count() - 1].label(), "q6");
    }

    #[test]
    fn test_concat() {
        let a = ends_with_ab();
        let b = even_as();
        let concat = concat(&a, &b).unwrap();
        assert_eq!(concat.state_count(), a.state_count() + b.state_count());
        assert!(concat.accepts("ab"));
        assert!(concat.accepts("abb"));
        assert!(!concat.accepts("aba"));
        assert!(!concat.accepts("a"));
    }

    #[test]
    fn test_union_and_concat_languages() {
        let a = ends_with_ab();
        let b = even_as();
        let union = union(&a, &b).unwrap();
        let concat = concat(&a, &b).unwrap();
        for word in words(&["a", "b"], 6) {
            assert_eq!(
                union.accepts(&word),
                a.accepts(&word) || b.accepts(&word),
                "union on '{}'",
                word
            );
            assert_eq!(
                concat.accepts(&word),
                in_concatenation(&a, &b, &word),
                "concat on '{}'",
                word
            );
        }
    }

    #[test]
    fn test_operands_are_not_modified() {
        let a = ends_with_ab();
        let b = even_as();
        let before = (a.to_string(), b.to_string());
        let _ = union(&a, &b).unwrap();
        let _ = concat(&a, &b).unwrap();
        let _ = product(&a, &b).unwrap();
        let _ = kleene_star(&a).unwrap();
        let _ = kleene_plus(&b).unwrap();
        let _ = optional(&a).unwrap();
        assert_eq!(before, (a.to_string(), b.to_string()));
    }

    #[test]
    fn test_product() {
        let a = ends_with_ab();
        let b = even_as();
        let product = product(&a, &b).unwrap();
        assert_eq!(product.state_count(), 6);
        assert_eq!(product.alphabet().len(), 2);
        assert!(product.is_deterministic());
        for word in words(&["a", "b"], 6) {
            assert_eq!(
                product.accepts(&word),
                a.accepts(&word) && b.accepts(&word),
                "product on '{}'",
                word
            );
        }
    }

    #[test]
    fn test_product_with_epsilon_transitions() {
        let a = union(
            &Automaton::from_symbol("a").unwrap(),
            &Automaton::from_symbol("b").unwrap(),
        )
        .unwrap();
        let b = kleene_star(&Automaton::from_symbol("a").unwrap()).unwrap();
        let product = product(&a, &b).unwrap();
        assert!(product.accepts("a"));
        assert!(!product.accepts("b"));
        assert!(!product.accepts(""));
        assert!(!product.accepts("aa"));
    }

    #[test]
    fn test_product_alphabet_is_intersection() {
        let a = Automaton::from_symbol("a").unwrap();
        let b = Automaton::from_symbol("b").unwrap();
        let product = product(&a, &b).unwrap();
        assert!(product.alphabet().is_empty());
        assert_eq!(product.transition_count(), 0);
        assert!(!product.accepts("a"));
    }

    #[test]
    fn test_kleene_star() {
        let a = ends_with_ab();
        let star = kleene_star(&a).unwrap();
        assert_eq!(star.state_count(), a.state_count() + 2);
        assert!(star.accepts(""));
        for word in words(&["a", "b"], 6).iter().filter(|w| !w.is_empty()) {
            assert_eq!(
                star.accepts(word),
                in_repetition(&a, word),
                "star on '{}'",
                word
            );
        }
    }

    #[test]
    fn test_kleene_plus() {
        let symbol = Automaton::from_symbol("a").unwrap();
        let plus = kleene(&symbol, KleeneKind::Plus).unwrap();
        assert_eq!(plus.state_count(), 2);
        assert!(!plus.accepts(""));
        assert!(plus.accepts("a"));
        assert!(plus.accepts("aaaa"));

        let a = ends_with_ab();
        let plus = kleene_plus(&a).unwrap();
        for word in words(&["a", "b"], 6) {
            assert_eq!(
                plus.accepts(&word),
                in_repetition(&a, &word),
                "plus on '{}'",
                word
            );
        }
    }

    #[test]
    fn test_star_of_star_terminates() {
        let symbol = Automaton::from_symbol("a").unwrap();
        let star = kleene_star(&kleene_star(&symbol).unwrap()).unwrap();
        assert!(star.has_epsilon_cycle());
        assert!(star.accepts(""));
        assert!(star.accepts("aaa"));
        assert!(!star.accepts("b"));
    }

    #[test]
    fn test_optional() {
        // (a+b)? must not accept "a" through the loop of a+
        let a_plus = kleene_plus(&Automaton::from_symbol("a").unwrap()).unwrap();
        let inner = concat(&a_plus, &Automaton::from_symbol("b").unwrap()).unwrap();
        let optional = optional(&inner).unwrap();
        assert!(optional.accepts(""));
        assert!(optional.accepts("ab"));
        assert!(optional.accepts("aaab"));
        assert!(!optional.accepts("a"));
        assert!(!optional.accepts("b"));
    }

    #[test]
    fn test_unimplemented_operations() {
        let a = ends_with_ab();
        let b = even_as();
        for result in [
            complement(&a),
            reverse(&a),
            difference(&a, &b),
            symmetric_difference(&a, &b),
        ] {
            assert!(matches!(
                result,
                Err(ref e) if matches!(e.kind(), FaErrorKind::NotImplemented(_))
            ));
        }
        let nfa = union(&a, &b).unwrap();
        assert!(matches!(
            complement(&nfa),
            Err(ref e) if matches!(e.kind(), FaErrorKind::NotDeterministic(_))
        ));
    }
}
