//! This module contains the conversion of an automaton with epsilon transitions into an
//! equivalent deterministic automaton using the subset construction algorithm.
//!
//! Every state of the result stands for the epsilon closed set of states of the input that
//! is reachable by the same word. The number of such subsets is bounded by `2^n` for an
//! input with `n` states, so callers that need bounded work should set
//! [`DeterminizeOptions::max_states`].

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use itertools::Itertools;
use log::{debug, trace};

use crate::{
    automaton::StateGroup, errors::not_implemented, Automaton, FaError, FaErrorKind, Result,
    StateID, Symbol,
};

/// The algorithm used by [`Automaton::determinize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeterminizeAlgorithm {
    /// Subset construction with a breadth-first work list.
    #[default]
    Subset,
    /// Subset construction with a depth-first work list.
    DepthFirst,
    /// On-demand construction during simulation. Not implemented yet.
    Lazy,
    /// Construction that is updated when the input changes. Not implemented yet.
    Incremental,
}

/// The labels given to the states of a determinized automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubsetNaming {
    /// The indices of the subset, e.g. `{0,2,3}`.
    #[default]
    Bitset,
    /// Sequential labels in order of discovery, e.g. `S0`, `S1`.
    Simple,
    /// The labels of the subset joined with `+`, e.g. `q0+q2+q3`.
    Original,
}

/// The options of [`Automaton::determinize`].
#[derive(Debug, Clone, Default)]
pub struct DeterminizeOptions {
    /// The construction algorithm.
    pub algorithm: DeterminizeAlgorithm,
    /// The labeling policy of the result.
    pub naming: SubsetNaming,
    /// The maximum number of states of the result. `None` means no limit.
    pub max_states: Option<usize>,
}

impl DeterminizeOptions {
    /// Set the construction algorithm.
    pub fn with_algorithm(mut self, algorithm: DeterminizeAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the labeling policy.
    pub fn with_naming(mut self, naming: SubsetNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Set the maximum number of states.
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }
}

// The state of a running subset construction.
struct SubsetConstruction<'a> {
    nfa: &'a Automaton,
    max_states: Option<usize>,
    // The discovered subsets, the index is the id of the state in the result.
    subsets: Vec<StateGroup>,
    known: BTreeMap<StateGroup, StateID>,
    transitions: Vec<(StateID, Symbol, StateID)>,
}

impl<'a> SubsetConstruction<'a> {
    fn new(nfa: &'a Automaton, max_states: Option<usize>) -> Self {
        Self {
            nfa,
            max_states,
            subsets: Vec::new(),
            known: BTreeMap::new(),
            transitions: Vec::new(),
        }
    }

    /// Add a subset if it does not already exist.
    /// Returns the id of the subset and whether it was new.
    fn add_subset_if_new(&mut self, subset: StateGroup) -> Result<(StateID, bool)> {
        if let Some(state_id) = self.known.get(&subset) {
            return Ok((*state_id, false));
        }
        if let Some(limit) = self.max_states {
            if self.subsets.len() >= limit {
                return Err(FaError::new(FaErrorKind::StateCountExceeded { limit }));
            }
        }
        let state_id = StateID::new(self.subsets.len());
        trace!("Add subset {}: {:?}", state_id, subset);
        self.known.insert(subset.clone(), state_id);
        self.subsets.push(subset);
        Ok((state_id, true))
    }

    fn run(&mut self, depth_first: bool) -> Result<()> {
        // The initial subset is the epsilon closure of all start states.
        let start_subset = self.nfa.epsilon_closure(self.nfa.start_states());
        let (initial_state, _) = self.add_subset_if_new(start_subset)?;
        let mut work_list = VecDeque::from([initial_state]);
        let symbols: Vec<Symbol> = self.nfa.alphabet().iter().map(Symbol::literal).collect();

        loop {
            let next = if depth_first {
                work_list.pop_back()
            } else {
                work_list.pop_front()
            };
            let Some(state_id) = next else {
                break;
            };
            let subset = self.subsets[state_id].clone();
            for symbol in &symbols {
                let target_subset = self
                    .nfa
                    .epsilon_closure(self.nfa.move_set(&subset, symbol));
                if target_subset.is_empty() {
                    continue;
                }
                let (target_state, is_new) = self.add_subset_if_new(target_subset)?;
                self.transitions
                    .push((state_id, symbol.clone(), target_state));
                if is_new {
                    work_list.push_back(target_state);
                }
            }
        }
        Ok(())
    }

    fn label(&self, index: usize, naming: SubsetNaming) -> String {
        let subset = &self.subsets[index];
        match naming {
            SubsetNaming::Bitset => format!("{{{}}}", subset.iter().join(",")),
            SubsetNaming::Simple => format!("S{}", index),
            SubsetNaming::Original if subset.is_empty() => "∅".to_string(),
            SubsetNaming::Original => subset
                .iter()
                .map(|state| self.nfa.states()[*state].label())
                .join("+"),
        }
    }

    fn into_automaton(self, naming: SubsetNaming) -> Result<Automaton> {
        let mut dfa = Automaton::with_capacity(self.subsets.len())?;
        dfa.add_symbols(self.nfa.alphabet().iter());
        for (index, subset) in self.subsets.iter().enumerate() {
            let is_accept = subset.iter().any(|s| self.nfa.states()[*s].is_accept());
            let label = dfa.unique_label(&self.label(index, naming));
            dfa.add_state(&label, index == 0, is_accept)?;
        }
        for (source, symbol, target) in self.transitions {
            dfa.link(source, symbol, target);
        }
        Ok(dfa)
    }
}

impl Automaton {
    /// Create an equivalent deterministic automaton.
    ///
    /// The first state of the result is its only start state. Subsets that no word reaches
    /// are not created, so the result may be partial; use [`Automaton::complete`] to add a
    /// sink state.
    ///
    /// # Errors
    /// * `StateCountExceeded` if the result would have more than `options.max_states` states
    /// * `NotImplemented` for the lazy and the incremental algorithm
    pub fn determinize(&self, options: &DeterminizeOptions) -> Result<Automaton> {
        let depth_first = match options.algorithm {
            DeterminizeAlgorithm::Subset => false,
            DeterminizeAlgorithm::DepthFirst => true,
            DeterminizeAlgorithm::Lazy => return Err(not_implemented!("lazy determinization")),
            DeterminizeAlgorithm::Incremental => {
                return Err(not_implemented!("incremental determinization"))
            }
        };
        let now = Instant::now();
        let mut construction = SubsetConstruction::new(self, options.max_states);
        construction.run(depth_first)?;
        let dfa = construction.into_automaton(options.naming)?;
        debug!(
            "Determinized {} states into {} states in {} microseconds.",
            self.state_count(),
            dfa.state_count(),
            now.elapsed().as_micros()
        );
        Ok(dfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automaton::tests::{ends_with_ab, words},
        operations::union,
    };

    // Initialize the logger for the tests
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const PATTERNS: &[&str] = &[
        "(a|b)*abb",
        "a*b*",
        "(ab|ba)+",
        "a?b?(a|b)*",
        "(a**|b)a",
        "b(a|b)(a|b)",
    ];

    #[test]
    fn test_determinize_keeps_language() {
        init();
        for pattern in PATTERNS {
            let nfa = Automaton::from_regex(pattern).unwrap();
            for algorithm in [
                DeterminizeAlgorithm::Subset,
                DeterminizeAlgorithm::DepthFirst,
            ] {
                let options = DeterminizeOptions::default().with_algorithm(algorithm);
                let dfa = nfa.determinize(&options).unwrap();
                assert!(dfa.is_deterministic(), "pattern '{}'", pattern);
                for word in words(&["a", "b"], 7) {
                    assert_eq!(
                        dfa.accepts(&word),
                        nfa.accepts(&word),
                        "pattern '{}' with {:?} on '{}'",
                        pattern,
                        algorithm,
                        word
                    );
                }
            }
        }
    }

    #[test]
    fn test_determinize_dragon() {
        let nfa = Automaton::from_regex("(a|b)*abb").unwrap();
        let dfa = nfa.determinize(&DeterminizeOptions::default()).unwrap();
        assert_eq!(dfa.state_count(), 5);
        assert_eq!(dfa.accept_states().count(), 1);
        assert!(dfa.is_complete());
    }

    #[test]
    fn test_determinize_dfa_keeps_state_count() {
        let a = ends_with_ab();
        let dfa = a.determinize(&DeterminizeOptions::default()).unwrap();
        assert_eq!(dfa.state_count(), 3);
        assert_eq!(dfa.states()[0].label(), "{0}");
    }

    #[test]
    fn test_subset_naming() {
        let nfa = union(
            &Automaton::from_symbol("a").unwrap(),
            &Automaton::from_symbol("b").unwrap(),
        )
        .unwrap();

        let bitset = nfa.determinize(&DeterminizeOptions::default()).unwrap();
        assert_eq!(bitset.states()[0].label(), "{0,2,4}");
        assert_eq!(bitset.states()[1].label(), "{1,5}");

        let simple = nfa
            .determinize(&DeterminizeOptions::default().with_naming(SubsetNaming::Simple))
            .unwrap();
        assert_eq!(
            simple.states().iter().map(|s| s.label()).collect::<Vec<_>>(),
            vec!["S0", "S1", "S2"]
        );

        let original = nfa
            .determinize(&DeterminizeOptions::default().with_naming(SubsetNaming::Original))
            .unwrap();
        assert_eq!(original.states()[0].label(), "q0+q2+q4");
        assert_eq!(original.states()[2].label(), "q3+q5");
    }

    #[test]
    fn test_max_states() {
        let nfa = Automaton::from_regex("(a|b)*abb").unwrap();
        let result = nfa.determinize(&DeterminizeOptions::default().with_max_states(3));
        assert!(matches!(
            result,
            Err(ref e) if matches!(e.kind(), FaErrorKind::StateCountExceeded { limit: 3 })
        ));
        assert!(nfa
            .determinize(&DeterminizeOptions::default().with_max_states(5))
            .is_ok());
    }

    #[test]
    fn test_unimplemented_algorithms() {
        let nfa = Automaton::from_symbol("a").unwrap();
        for algorithm in [
            DeterminizeAlgorithm::Lazy,
            DeterminizeAlgorithm::Incremental,
        ] {
            let result = nfa.determinize(&DeterminizeOptions::default().with_algorithm(algorithm));
            assert!(matches!(
                result,
                Err(ref e) if matches!(e.kind(), FaErrorKind::NotImplemented(_))
            ));
        }
    }

    #[test]
    fn test_determinize_without_start_state() {
        let mut nfa = Automaton::new();
        nfa.add_symbol("a");
        nfa.add_state("q0", false, true).unwrap();
        let dfa = nfa.determinize(&DeterminizeOptions::default()).unwrap();
        assert_eq!(dfa.state_count(), 1);
        assert_eq!(dfa.states()[0].label(), "{}");
        assert!(dfa.states()[0].is_start());
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("a"));
    }

    #[test]
    fn test_determinize_several_start_states() {
        let mut nfa = Automaton::new();
        nfa.add_symbols(["a", "b"]);
        let p = nfa.add_state("p", true, false).unwrap();
        let q = nfa.add_state("q", true, false).unwrap();
        let r = nfa.add_state("r", false, true).unwrap();
        nfa.add_transition(p, "a", r).unwrap();
        nfa.add_transition(q, "a", q).unwrap();
        nfa.add_transition(q, "b", r).unwrap();
        let dfa = nfa.determinize(&DeterminizeOptions::default()).unwrap();
        assert!(dfa.is_deterministic());
        for word in words(&["a", "b"], 5) {
            assert_eq!(dfa.accepts(&word), nfa.accepts(&word), "word '{}'", word);
        }
    }
}
