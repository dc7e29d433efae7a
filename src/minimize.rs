//! This module contains the minimization of deterministic automata.
//!
//! The implemented algorithm is Moore's partition refinement: states start in two groups,
//! accepting and non-accepting, and a group is split as long as two of its states reach
//! different groups on the same symbol.

use std::collections::BTreeMap;
use std::time::Instant;

use itertools::Itertools;
use log::{debug, trace};

use crate::{
    automaton::StateGroup, collections::Map, errors::not_implemented, Automaton, FaError,
    FaErrorKind, GroupID, Result, StateID,
};

// The type definition for the partition refinement.
pub(crate) type Partition = Vec<StateGroup>;

/// The algorithm used by [`Automaton::minimize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinimizeAlgorithm {
    /// Moore's partition refinement.
    #[default]
    Moore,
    /// Hopcroft's algorithm. Not implemented yet.
    Hopcroft,
    /// Brzozowski's double reversal. Not implemented yet.
    Brzozowski,
    /// The table filling algorithm. Not implemented yet.
    Table,
}

// A data type that is calculated from the transitions of a state so that for each symbol
// the target state is mapped to the partition group it belongs to. A missing transition
// is mapped to `None`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct TransitionsToPartitionGroups(Vec<(usize, Option<GroupID>)>);

impl Automaton {
    /// Create the minimal deterministic automaton of the same language.
    ///
    /// States that no start state reaches and states that reach no accept state are removed
    /// first. The result is therefore the unique minimal partial automaton of the language,
    /// and a missing transition stands for a transition into the dead state.
    ///
    /// # Errors
    /// * `NotDeterministic` if the automaton is not deterministic
    /// * `NotImplemented` for all algorithms except `Moore`
    pub fn minimize(&self, algorithm: MinimizeAlgorithm) -> Result<Automaton> {
        match algorithm {
            MinimizeAlgorithm::Moore => {}
            MinimizeAlgorithm::Hopcroft => return Err(not_implemented!("Hopcroft minimization")),
            MinimizeAlgorithm::Brzozowski => {
                return Err(not_implemented!("Brzozowski minimization"))
            }
            MinimizeAlgorithm::Table => {
                return Err(not_implemented!("table filling minimization"))
            }
        }
        if !self.is_deterministic() {
            return Err(FaError::new(FaErrorKind::NotDeterministic(
                "minimization requires a deterministic automaton".to_string(),
            )));
        }

        let now = Instant::now();
        let dfa = self.trim()?.remove_dead_states()?;
        let mut partition = dfa.calculate_initial_partition();
        trace_partition("initial", &partition);
        loop {
            let new_partition = dfa.calculate_new_partition(&partition);
            // Refinement only ever splits groups
            let changed = new_partition.len() != partition.len();
            partition = new_partition;
            if !changed {
                break;
            }
            trace_partition("new", &partition);
        }

        let minimized = dfa.create_from_partition(&partition)?;
        debug!(
            "Minimized {} states into {} states in {} microseconds.",
            self.state_count(),
            minimized.state_count(),
            now.elapsed().as_micros()
        );
        Ok(minimized)
    }

    /// The start partition has at most two groups: the accepting states and the
    /// non-accepting states. Empty groups are omitted.
    fn calculate_initial_partition(&self) -> Partition {
        self.states()
            .iter()
            .sorted_by_key(|state| !state.is_accept())
            .chunk_by(|state| state.is_accept())
            .into_iter()
            .map(|(_, group)| group.map(|state| state.id()).collect::<StateGroup>())
            .collect()
    }

    /// Calculate the new partition based on the old partition.
    /// Every group of the old partition is split into the groups of states that reach the
    /// same groups on every symbol.
    fn calculate_new_partition(&self, partition: &[StateGroup]) -> Partition {
        let mut group_of_state = vec![GroupID::default(); self.state_count()];
        for (index, group) in partition.iter().enumerate() {
            for state_id in group {
                group_of_state[*state_id] = GroupID::new(index);
            }
        }
        partition
            .iter()
            .flat_map(|group| self.split_group(group, &group_of_state))
            .collect()
    }

    fn split_group(&self, group: &StateGroup, group_of_state: &[GroupID]) -> Partition {
        // If the group contains only one state, the group can't be split further.
        if group.len() == 1 {
            return vec![group.clone()];
        }
        let mut transition_map_to_states: BTreeMap<TransitionsToPartitionGroups, StateGroup> =
            BTreeMap::new();
        for state_id in group {
            let transitions_to_partition =
                self.build_transitions_to_partition_group(*state_id, group_of_state);
            transition_map_to_states
                .entry(transitions_to_partition)
                .or_default()
                .insert(*state_id);
        }
        transition_map_to_states.into_values().collect()
    }

    /// Map the transitions of a state to the groups of their targets, in alphabet order.
    fn build_transitions_to_partition_group(
        &self,
        state_id: StateID,
        group_of_state: &[GroupID],
    ) -> TransitionsToPartitionGroups {
        let state = &self.states()[state_id];
        TransitionsToPartitionGroups(
            self.alphabet()
                .iter()
                .enumerate()
                .map(|(index, symbol)| {
                    let group = state
                        .transitions()
                        .iter()
                        .find(|t| t.symbol().as_literal() == Some(symbol.as_str()))
                        .map(|t| group_of_state[t.target().as_usize()]);
                    (index, group)
                })
                .collect(),
        )
    }

    /// Create the minimized automaton with one state per group.
    /// Groups are ordered by their smallest state, the label bookkeeping goes through maps
    /// from state label to group and from group to the label of the new state.
    fn create_from_partition(&self, partition: &[StateGroup]) -> Result<Automaton> {
        let groups: Vec<&StateGroup> = partition
            .iter()
            .filter(|group| !group.is_empty())
            .sorted_by_key(|group| group.first().copied())
            .collect();

        let mut group_of_label: Map<String, GroupID> = Map::with_capacity(self.state_count());
        let mut label_of_group: Map<GroupID, String> = Map::with_capacity(groups.len());
        for (index, group) in groups.iter().enumerate() {
            let group_id = GroupID::new(index);
            label_of_group.insert(group_id, format!("q{}", index));
            for state_id in group.iter() {
                group_of_label.insert(self.states()[*state_id].label().to_string(), group_id);
            }
        }

        let mut dfa = Automaton::with_capacity(groups.len())?;
        dfa.add_symbols(self.alphabet().iter());
        for (index, group) in groups.iter().enumerate() {
            let is_start = group.iter().any(|s| self.states()[*s].is_start());
            let is_accept = group.iter().any(|s| self.states()[*s].is_accept());
            let label = label_of_group.get(&GroupID::new(index)).ok_or_else(|| {
                FaError::new(FaErrorKind::StateNotFound(format!("group {}", index)))
            })?;
            dfa.add_state(label, is_start, is_accept)?;
        }

        for (index, group) in groups.iter().enumerate() {
            for state_id in group.iter() {
                for transition in self.states()[*state_id].transitions() {
                    let target_label = self.states()[transition.target()].label();
                    let target_group = group_of_label.get(target_label).ok_or_else(|| {
                        FaError::new(FaErrorKind::StateNotFound(target_label.to_string()))
                    })?;
                    dfa.link(
                        StateID::new(index),
                        transition.symbol().clone(),
                        StateID::new(target_group.as_usize()),
                    );
                }
            }
        }
        Ok(dfa)
    }
}

fn trace_partition(context: &str, partition: &[StateGroup]) {
    trace!("Partition {}:", context);
    for (i, group) in partition.iter().enumerate() {
        trace!("Group {}: {:?}", i, group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automaton::tests::{ends_with_ab, even_as, words},
        DeterminizeOptions,
    };

    // Initialize the logger for the tests
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // A data type that provides test data for the minimization tests.
    struct TestData {
        pattern: &'static str,
        states: usize,
        min_states: usize,
    }

    const TEST_DATA: &[TestData] = &[
        TestData {
            pattern: "(a|b)*abb",
            states: 5,
            min_states: 4,
        },
        TestData {
            pattern: "a|b",
            states: 3,
            min_states: 2,
        },
        TestData {
            pattern: "(a|b)*",
            states: 3,
            min_states: 1,
        },
        TestData {
            pattern: "a*b*",
            states: 3,
            min_states: 2,
        },
        TestData {
            pattern: "ab|ab",
            states: 3,
            min_states: 3,
        },
    ];

    fn dfa_of(pattern: &str) -> Automaton {
        Automaton::from_regex(pattern)
            .unwrap()
            .determinize(&DeterminizeOptions::default())
            .unwrap()
    }

    #[test]
    fn test_minimize() {
        init();
        for data in TEST_DATA {
            let dfa = dfa_of(data.pattern);
            assert_eq!(dfa.state_count(), data.states, "states of {}", data.pattern);

            let minimized = dfa.minimize(MinimizeAlgorithm::default()).unwrap();
            assert_eq!(
                minimized.state_count(),
                data.min_states,
                "min_states of {}",
                data.pattern
            );
            assert!(minimized.is_deterministic());
            for word in words(&["a", "b"], 7) {
                assert_eq!(
                    minimized.accepts(&word),
                    dfa.accepts(&word),
                    "pattern '{}' on '{}'",
                    data.pattern,
                    word
                );
            }

            let twice = minimized.minimize(MinimizeAlgorithm::Moore).unwrap();
            assert_eq!(twice.state_count(), minimized.state_count());
        }
    }

    #[test]
    fn test_minimal_automata_stay_unchanged() {
        let a = ends_with_ab().minimize(MinimizeAlgorithm::Moore).unwrap();
        assert_eq!(a.state_count(), 3);
        assert!(a.states()[0].is_start());
        let b = even_as().minimize(MinimizeAlgorithm::Moore).unwrap();
        assert_eq!(b.state_count(), 2);
        assert!(b.accepts("abab"));
        assert!(!b.accepts("ab"));
    }

    #[test]
    fn test_canonical_minimality() {
        // A differently labeled DFA for the words ending in "ab" with redundant states
        let mut redundant = Automaton::new();
        redundant.add_symbols(["a", "b"]);
        let s = redundant.add_state("start", true, false).unwrap();
        let x = redundant.add_state("seen_a", false, false).unwrap();
        let y = redundant.add_state("seen_b", false, false).unwrap();
        let z = redundant.add_state("seen_ab", false, true).unwrap();
        redundant.add_transition(s, "a", x).unwrap();
        redundant.add_transition(s, "b", y).unwrap();
        redundant.add_transition(y, "a", x).unwrap();
        redundant.add_transition(y, "b", y).unwrap();
        redundant.add_transition(x, "a", x).unwrap();
        redundant.add_transition(x, "b", z).unwrap();
        redundant.add_transition(z, "a", x).unwrap();
        redundant.add_transition(z, "b", y).unwrap();

        let minimized = redundant.minimize(MinimizeAlgorithm::Moore).unwrap();
        let reference = ends_with_ab().minimize(MinimizeAlgorithm::Moore).unwrap();
        assert_eq!(minimized.state_count(), reference.state_count());
        assert_eq!(minimized.transition_count(), reference.transition_count());
        for word in words(&["a", "b"], 6) {
            assert_eq!(minimized.accepts(&word), reference.accepts(&word));
        }
    }

    #[test]
    fn test_minimize_partial_dfa() {
        let mut dfa = Automaton::new();
        dfa.add_symbols(["a", "b"]);
        let q0 = dfa.add_state("q0", true, false).unwrap();
        let q1 = dfa.add_state("q1", false, true).unwrap();
        let q2 = dfa.add_state("q2", false, true).unwrap();
        let q3 = dfa.add_state("q3", false, true).unwrap();
        dfa.add_transition(q0, "a", q1).unwrap();
        dfa.add_transition(q0, "b", q2).unwrap();
        dfa.add_transition(q2, "a", q3).unwrap();

        let minimized = dfa.minimize(MinimizeAlgorithm::Moore).unwrap();
        // q1 and q3 have no transitions, q2 has one on "a"
        assert_eq!(minimized.state_count(), 3);
        assert!(minimized.accepts("a"));
        assert!(minimized.accepts("ba"));
        assert!(!minimized.accepts("aa"));
        assert!(!minimized.is_complete());
    }

    #[test]
    fn test_minimize_dead_state_and_missing_transition_agree() {
        init();
        // Both accept exactly "b", one with an explicit dead state
        let mut with_dead = Automaton::new();
        with_dead.add_symbols(["a", "b"]);
        let q0 = with_dead.add_state("q0", true, false).unwrap();
        let dead = with_dead.add_state("dead", false, false).unwrap();
        let q1 = with_dead.add_state("q1", false, true).unwrap();
        with_dead.add_transition(q0, "a", dead).unwrap();
        with_dead.add_transition(q0, "b", q1).unwrap();

        let mut plain = Automaton::new();
        plain.add_symbols(["a", "b"]);
        let p0 = plain.add_state("p0", true, false).unwrap();
        let p1 = plain.add_state("p1", false, true).unwrap();
        plain.add_transition(p0, "b", p1).unwrap();

        let with_dead = with_dead.minimize(MinimizeAlgorithm::Moore).unwrap();
        let plain = plain.minimize(MinimizeAlgorithm::Moore).unwrap();
        let completed = plain
            .complete()
            .unwrap()
            .minimize(MinimizeAlgorithm::Moore)
            .unwrap();
        assert_eq!(with_dead.state_count(), 2);
        assert_eq!(plain.state_count(), 2);
        assert_eq!(completed.state_count(), 2);
        for word in words(&["a", "b"], 3) {
            assert_eq!(with_dead.accepts(&word), word == "b", "word '{}'", word);
            assert_eq!(plain.accepts(&word), word == "b", "word '{}'", word);
        }
    }

    #[test]
    fn test_minimize_ignores_completion() {
        let dfa = dfa_of("ab");
        let partial = dfa.minimize(MinimizeAlgorithm::Moore).unwrap();
        let complete = dfa
            .complete()
            .unwrap()
            .minimize(MinimizeAlgorithm::Moore)
            .unwrap();
        assert_eq!(partial.state_count(), 3);
        assert_eq!(complete.state_count(), partial.state_count());
    }

    #[test]
    fn test_minimize_empty_language() {
        let mut dfa = Automaton::new();
        dfa.add_symbols(["a"]);
        let q0 = dfa.add_state("q0", true, false).unwrap();
        let q1 = dfa.add_state("q1", false, false).unwrap();
        dfa.add_transition(q0, "a", q1).unwrap();
        dfa.add_transition(q1, "a", q0).unwrap();
        let minimized = dfa.minimize(MinimizeAlgorithm::Moore).unwrap();
        assert_eq!(minimized.state_count(), 1);
        assert_eq!(minimized.transition_count(), 0);
        assert!(minimized.states()[0].is_start());
        assert!(!minimized.accepts(""));
        assert!(!minimized.accepts("aa"));
    }

    #[test]
    fn test_minimize_drops_unreachable_states() {
        let mut dfa = even_as();
        let dead = dfa.add_state("dead", false, false).unwrap();
        dfa.add_transition(dead, "a", StateID::new(0)).unwrap();
        let minimized = dfa.minimize(MinimizeAlgorithm::Moore).unwrap();
        assert_eq!(minimized.state_count(), 2);
    }

    #[test]
    fn test_minimize_requires_dfa() {
        let nfa = Automaton::from_regex("a|b").unwrap();
        let result = nfa.minimize(MinimizeAlgorithm::Moore);
        assert!(matches!(
            result,
            Err(ref e) if matches!(e.kind(), FaErrorKind::NotDeterministic(_))
        ));
    }

    #[test]
    fn test_unimplemented_algorithms() {
        let dfa = ends_with_ab();
        for algorithm in [
            MinimizeAlgorithm::Hopcroft,
            MinimizeAlgorithm::Brzozowski,
            MinimizeAlgorithm::Table,
        ] {
            assert!(matches!(
                dfa.minimize(algorithm),
                Err(ref e) if matches!(e.kind(), FaErrorKind::NotImplemented(_))
            ));
        }
    }
}
