//! Simulation of an automaton on an input word.
//!
//! The simulation explores configurations made of a state and an input position. Epsilon
//! transitions keep the position, a literal transition advances it by the length of its
//! symbol if the remaining input starts with that symbol. A visited set over the
//! configurations keeps epsilon cycles from looping forever and bounds the work by
//! `states * (word length + 1)`.

use std::collections::HashSet;

use log::trace;

use crate::{Automaton, StateID, Symbol};

impl Automaton {
    /// Returns true if the automaton accepts the word.
    ///
    /// Every start state is tried, so NFAs with several start states are supported. A
    /// transition on a multi character symbol consumes the whole symbol.
    pub fn accepts(&self, word: &str) -> bool {
        let mut visited: HashSet<(StateID, usize)> = HashSet::new();
        let mut stack: Vec<(StateID, usize)> = Vec::new();
        for start_state in self.start_states() {
            if visited.insert((start_state, 0)) {
                stack.push((start_state, 0));
            }
        }

        while let Some((state, position)) = stack.pop() {
            let rest = &word[position..];
            if rest.is_empty() && self.states()[state].is_accept() {
                trace!("'{}' accepted in state {}", word, self.states()[state].label());
                return true;
            }
            for transition in self.states()[state].transitions() {
                let next_position = match transition.symbol() {
                    Symbol::Epsilon => position,
                    Symbol::Literal(symbol) if rest.starts_with(symbol.as_str()) => {
                        position + symbol.len()
                    }
                    Symbol::Literal(_) => continue,
                };
                if visited.insert((transition.target(), next_position)) {
                    stack.push((transition.target(), next_position));
                }
            }
        }
        false
    }

    /// Returns true if the automaton accepts the word given as a sequence of symbols.
    ///
    /// This is the set based simulation: the current set of states is the epsilon closure
    /// of the start states and every symbol moves it to the closure of its successors.
    pub fn accepts_symbols<S: AsRef<str>>(&self, word: &[S]) -> bool {
        let mut current = self.epsilon_closure(self.start_states());
        for symbol in word {
            if current.is_empty() {
                return false;
            }
            let symbol = Symbol::literal(symbol.as_ref());
            current = self.epsilon_closure(self.move_set(&current, &symbol));
        }
        current.iter().any(|s| self.states()[*s].is_accept())
    }
}
