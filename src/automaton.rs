//! This module contains the automaton data model.
//! An automaton owns its states, every state owns its outgoing transitions and transitions
//! refer to their source and destination by index. An automaton therefore never holds a
//! reference into another automaton, which keeps every operation free of aliasing.

use std::collections::BTreeSet;

use log::trace;

use crate::{
    collections::{Map, Set},
    FaError, FaErrorKind, Result, StateID,
};

// The type of a set of states as used by closures and by the subset construction.
pub(crate) type StateGroup = BTreeSet<StateID>;

/// The input symbol of a transition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A transition that consumes no input.
    Epsilon,
    /// A transition that consumes the given symbol.
    Literal(String),
}

impl Symbol {
    /// Create a literal symbol.
    pub fn literal<S: Into<String>>(symbol: S) -> Self {
        Symbol::Literal(symbol.into())
    }

    /// Returns true for the epsilon marker.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    /// The literal text of the symbol, `None` for epsilon.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Literal(s) => Some(s),
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::Literal(s) => write!(f, "{}", s),
        }
    }
}

/// A transition between two states of the same automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    symbol: Symbol,
    // Back reference to the owning state
    source: StateID,
    target: StateID,
}

impl Transition {
    /// The symbol consumed by the transition.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// The state the transition starts from.
    pub fn source(&self) -> StateID {
        self.source
    }

    /// The state the transition leads to.
    pub fn target(&self) -> StateID {
        self.target
    }

    /// Returns true if this is an epsilon transition.
    pub fn is_epsilon(&self) -> bool {
        self.symbol.is_epsilon()
    }
}

/// A state of an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: StateID,
    label: String,
    is_start: bool,
    is_accept: bool,
    transitions: Vec<Transition>,
}

impl State {
    fn new(id: StateID, label: String, is_start: bool, is_accept: bool) -> Self {
        Self {
            id,
            label,
            is_start,
            is_accept,
            transitions: Vec::new(),
        }
    }

    /// The index of the state within its automaton.
    pub fn id(&self) -> StateID {
        self.id
    }

    /// The label of the state, unique within its automaton.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true if the state is a start state.
    pub fn is_start(&self) -> bool {
        self.is_start
    }

    /// Returns true if the state is an accept state.
    pub fn is_accept(&self) -> bool {
        self.is_accept
    }

    /// The outgoing transitions of the state.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    fn has_transition(&self, symbol: &Symbol, target: StateID) -> bool {
        self.transitions
            .iter()
            .any(|t| t.target == target && &t.symbol == symbol)
    }
}

/// A finite automaton over an alphabet of string symbols.
///
/// Any number of states may be marked as start or accept states, so the same type serves
/// for NFAs with epsilon transitions and for DFAs.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    alphabet: Set<String>,
    states: Vec<State>,
    // Label index, kept in sync with the state labels
    labels: Map<String, StateID>,
}

impl Automaton {
    /// Create a new empty automaton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty automaton with room for `capacity` states.
    /// Fails with `OutOfMemory` if the reservation fails.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut states = Vec::new();
        states.try_reserve(capacity)?;
        Ok(Self {
            alphabet: Set::new(),
            states,
            labels: Map::with_capacity(capacity),
        })
    }

    /// Create the two state automaton `q0 --symbol--> q1` with start state `q0` and accept
    /// state `q1`.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        if symbol.is_empty() {
            return Err(FaError::new(FaErrorKind::InvalidArgument(
                "symbol must not be empty".to_string(),
            )));
        }
        let mut automaton = Self::with_capacity(2)?;
        automaton.add_symbol(symbol);
        let start_state = automaton.add_state("q0", true, false)?;
        let end_state = automaton.add_state("q1", false, true)?;
        automaton.add_transition(start_state, symbol, end_state)?;
        Ok(automaton)
    }

    /// Create an automaton with `count` states labeled `q0..q{count-1}` and the given
    /// alphabet. Used by the algebra operations that build their result by index.
    pub(crate) fn with_states(count: usize, alphabet: Set<String>) -> Result<Self> {
        let mut automaton = Self::with_capacity(count)?;
        automaton.alphabet = alphabet;
        for id in StateID::range(count) {
            let label = format!("q{}", id);
            automaton.labels.insert(label.clone(), id);
            automaton.states.push(State::new(id, label, false, false));
        }
        Ok(automaton)
    }

    /// The alphabet of the automaton. It never contains the epsilon marker.
    pub fn alphabet(&self) -> &Set<String> {
        &self.alphabet
    }

    /// The states of the automaton.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Get a state by id.
    pub fn state(&self, id: StateID) -> Option<&State> {
        self.states.get(id.as_usize())
    }

    /// The number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The total number of transitions, epsilon transitions included.
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Returns true if the automaton has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Add a symbol to the alphabet. Empty symbols are skipped.
    /// Returns true if the symbol was added.
    pub fn add_symbol(&mut self, symbol: &str) -> bool {
        if symbol.is_empty() {
            return false;
        }
        self.alphabet.insert(symbol.to_string())
    }

    /// Add several symbols to the alphabet and return how many were new and valid.
    pub fn add_symbols<I, S>(&mut self, symbols: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        symbols
            .into_iter()
            .filter(|s| self.add_symbol(s.as_ref()))
            .count()
    }

    /// Add a new state.
    /// Fails with `DuplicateState` if the label is taken and with `InvalidArgument` if the
    /// label is empty.
    pub fn add_state(&mut self, label: &str, is_start: bool, is_accept: bool) -> Result<StateID> {
        if label.is_empty() {
            return Err(FaError::new(FaErrorKind::InvalidArgument(
                "state label must not be empty".to_string(),
            )));
        }
        if self.labels.contains_key(label) {
            return Err(FaError::new(FaErrorKind::DuplicateState(label.to_string())));
        }
        self.states.try_reserve(1)?;
        let id = StateID::new(self.states.len());
        self.labels.insert(label.to_string(), id);
        self.states
            .push(State::new(id, label.to_string(), is_start, is_accept));
        Ok(id)
    }

    /// Find a state by its label.
    pub fn state_by_label(&self, label: &str) -> Option<&State> {
        self.labels.get(label).map(|id| &self.states[*id])
    }

    /// Find the id of a state by its label.
    pub fn state_id(&self, label: &str) -> Option<StateID> {
        self.labels.get(label).copied()
    }

    /// Mark or unmark a state as start state.
    pub fn set_start(&mut self, state: StateID, is_start: bool) -> Result<()> {
        self.check_state(state)?;
        self.states[state].is_start = is_start;
        Ok(())
    }

    /// Mark or unmark a state as accept state.
    pub fn set_accept(&mut self, state: StateID, is_accept: bool) -> Result<()> {
        self.check_state(state)?;
        self.states[state].is_accept = is_accept;
        Ok(())
    }

    /// Add a transition on a symbol of the alphabet.
    ///
    /// # Errors
    /// * `InvalidArgument` if the symbol is empty
    /// * `InvalidSymbol` if the symbol is not in the alphabet
    /// * `StateNotFound` if a state does not belong to the automaton
    /// * `DuplicateTransition` if the same transition already exists
    pub fn add_transition(&mut self, source: StateID, symbol: &str, target: StateID) -> Result<()> {
        if symbol.is_empty() {
            return Err(FaError::new(FaErrorKind::InvalidArgument(
                "symbol must not be empty".to_string(),
            )));
        }
        if !self.alphabet.contains(&symbol.to_string()) {
            return Err(FaError::new(FaErrorKind::InvalidSymbol(symbol.to_string())));
        }
        self.add_checked(source, Symbol::literal(symbol), target)
    }

    /// Add an epsilon transition.
    /// Fails with `StateNotFound` or `DuplicateTransition` like `add_transition`.
    pub fn add_epsilon_transition(&mut self, source: StateID, target: StateID) -> Result<()> {
        self.add_checked(source, Symbol::Epsilon, target)
    }

    fn add_checked(&mut self, source: StateID, symbol: Symbol, target: StateID) -> Result<()> {
        self.check_state(source)?;
        self.check_state(target)?;
        if self.states[source].has_transition(&symbol, target) {
            return Err(FaError::new(FaErrorKind::DuplicateTransition {
                source_state: self.states[source].label.clone(),
                symbol: symbol.to_string(),
                destination: self.states[target].label.clone(),
            }));
        }
        self.states[source].transitions.push(Transition {
            symbol,
            source,
            target,
        });
        Ok(())
    }

    fn check_state(&self, state: StateID) -> Result<()> {
        if state.as_usize() < self.states.len() {
            Ok(())
        } else {
            Err(FaError::new(FaErrorKind::StateNotFound(format!(
                "state id {}",
                state
            ))))
        }
    }

    /// Link two states without validation. Duplicates are skipped silently.
    /// Only used by the operations of this crate that construct their states by index.
    pub(crate) fn link(&mut self, source: StateID, symbol: Symbol, target: StateID) {
        debug_assert!(source.as_usize() < self.states.len());
        debug_assert!(target.as_usize() < self.states.len());
        debug_assert!(symbol
            .as_literal()
            .map_or(true, |s| self.alphabet.contains(&s.to_string())));
        if !self.states[source].has_transition(&symbol, target) {
            self.states[source].transitions.push(Transition {
                symbol,
                source,
                target,
            });
        }
    }

    // The given label, primed as often as needed to make it unique
    pub(crate) fn unique_label(&self, label: &str) -> String {
        let mut label = label.to_string();
        while self.labels.contains_key(label.as_str()) {
            label.push('\'');
        }
        label
    }

    pub(crate) fn mark(&mut self, state: StateID, is_start: bool, is_accept: bool) {
        self.states[state].is_start = is_start;
        self.states[state].is_accept = is_accept;
    }

    /// Relabel the states to `q0..q{n-1}` in index order.
    /// Transitions refer to states by index, so they stay consistent.
    pub fn rename_states(&mut self) {
        self.labels.clear();
        for (index, state) in self.states.iter_mut().enumerate() {
            state.label = format!("q{}", index);
            self.labels.insert(state.label.clone(), state.id);
        }
    }

    /// The ids of all start states.
    pub fn start_states(&self) -> impl Iterator<Item = StateID> + '_ {
        self.states.iter().filter(|s| s.is_start).map(|s| s.id)
    }

    /// The ids of all accept states.
    pub fn accept_states(&self) -> impl Iterator<Item = StateID> + '_ {
        self.states.iter().filter(|s| s.is_accept).map(|s| s.id)
    }

    /// Returns true if the transition exists.
    pub fn has_transition(&self, source: StateID, symbol: &Symbol, target: StateID) -> bool {
        self.state(source)
            .is_some_and(|s| s.has_transition(symbol, target))
    }

    /// The states reachable from `state` by exactly one transition on `symbol`.
    /// Empty for an unknown state.
    pub fn destinations<'a>(
        &'a self,
        state: StateID,
        symbol: &'a Symbol,
    ) -> impl Iterator<Item = StateID> + 'a {
        self.state(state)
            .into_iter()
            .flat_map(|s| s.transitions.iter())
            .filter(move |t| &t.symbol == symbol)
            .map(|t| t.target)
    }

    /// Returns true if no transition is an epsilon transition.
    pub fn is_epsilon_free(&self) -> bool {
        self.states
            .iter()
            .all(|s| s.transitions.iter().all(|t| !t.is_epsilon()))
    }

    /// Returns true for exactly one start state, no epsilon transitions and at most one
    /// transition per state and symbol.
    pub fn is_deterministic(&self) -> bool {
        if self.start_states().count() != 1 || !self.is_epsilon_free() {
            return false;
        }
        self.states.iter().all(|state| {
            let mut seen = BTreeSet::new();
            state.transitions.iter().all(|t| seen.insert(&t.symbol))
        })
    }

    /// Returns true if every state has a transition for every symbol of the alphabet.
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|state| {
            self.alphabet.iter().all(|symbol| {
                state
                    .transitions
                    .iter()
                    .any(|t| t.symbol.as_literal() == Some(symbol.as_str()))
            })
        })
    }

    /// Returns true if some state can reach itself using only epsilon transitions.
    pub fn has_epsilon_cycle(&self) -> bool {
        self.states.iter().any(|state| {
            let successors = state
                .transitions
                .iter()
                .filter(|t| t.is_epsilon())
                .map(|t| t.target);
            self.epsilon_closure(successors).contains(&state.id)
        })
    }

    /// The set of states reachable from the given states using only epsilon transitions,
    /// the given states included. Unknown states are skipped.
    pub fn epsilon_closure<I>(&self, states: I) -> BTreeSet<StateID>
    where
        I: IntoIterator<Item = StateID>,
    {
        let mut closure = StateGroup::new();
        let mut stack: Vec<StateID> = Vec::new();
        for state in states {
            if self.state(state).is_some() && closure.insert(state) {
                stack.push(state);
            }
        }
        while let Some(state) = stack.pop() {
            for transition in self.states[state].transitions.iter() {
                if transition.is_epsilon() && closure.insert(transition.target) {
                    stack.push(transition.target);
                }
            }
        }
        closure
    }

    /// The set of states reachable from any of the given states by one transition on
    /// `symbol`. Unknown states contribute nothing.
    pub fn move_set(&self, states: &BTreeSet<StateID>, symbol: &Symbol) -> BTreeSet<StateID> {
        states
            .iter()
            .flat_map(|state| self.destinations(*state, symbol))
            .collect()
    }

    /// Returns a complete copy of the automaton.
    /// If some state lacks a transition for some symbol, a non-accepting sink state is
    /// added that receives all missing transitions and loops on every symbol.
    pub fn complete(&self) -> Result<Automaton> {
        let mut automaton = self.clone();
        if self.is_complete() {
            return Ok(automaton);
        }
        let label = automaton.unique_label("sink");
        let sink = automaton.add_state(&label, false, false)?;
        let symbols: Vec<Symbol> = self.alphabet.iter().map(Symbol::literal).collect();
        for state in StateID::range(automaton.states.len()) {
            for symbol in &symbols {
                if automaton.destinations(state, symbol).next().is_none() {
                    automaton.link(state, symbol.clone(), sink);
                }
            }
        }
        trace!("Completed automaton with sink state '{}'", label);
        Ok(automaton)
    }

    /// Returns a copy of the automaton without the states that no start state reaches.
    /// Labels and the relative order of the remaining states are kept.
    pub fn trim(&self) -> Result<Automaton> {
        let mut reachable = StateGroup::new();
        let mut stack: Vec<StateID> = self.start_states().collect();
        reachable.extend(stack.iter().copied());
        while let Some(state) = stack.pop() {
            for transition in self.states[state].transitions.iter() {
                if reachable.insert(transition.target) {
                    stack.push(transition.target);
                }
            }
        }
        self.retain_states(&reachable)
    }

    /// Returns a copy of the automaton without the states from which no accept state can
    /// be reached. Start states are always kept, so the result of an automaton with an
    /// empty language is its start states without transitions.
    pub(crate) fn remove_dead_states(&self) -> Result<Automaton> {
        let mut predecessors: Vec<Vec<StateID>> = vec![Vec::new(); self.states.len()];
        for transition in self.states.iter().flat_map(|s| s.transitions.iter()) {
            predecessors[transition.target].push(transition.source);
        }
        let mut live = StateGroup::new();
        let mut stack: Vec<StateID> = self.accept_states().collect();
        live.extend(stack.iter().copied());
        while let Some(state) = stack.pop() {
            for predecessor in predecessors[state].iter() {
                if live.insert(*predecessor) {
                    stack.push(*predecessor);
                }
            }
        }
        live.extend(self.start_states());
        self.retain_states(&live)
    }

    // Copy the given states and the transitions between them, renumbered in id order.
    fn retain_states(&self, keep: &StateGroup) -> Result<Automaton> {
        let mut new_ids = vec![None; self.states.len()];
        let mut automaton = Automaton::with_capacity(keep.len())?;
        automaton.alphabet = self.alphabet.clone();
        for state in keep.iter() {
            let old = &self.states[*state];
            new_ids[state.as_usize()] =
                Some(automaton.add_state(&old.label, old.is_start, old.is_accept)?);
        }
        for state in keep.iter() {
            for transition in self.states[*state].transitions.iter() {
                if let (Some(source), Some(target)) = (
                    new_ids[transition.source.as_usize()],
                    new_ids[transition.target.as_usize()],
                ) {
                    automaton.link(source, transition.symbol.clone(), target);
                }
            }
        }
        Ok(automaton)
    }

    /// Returns an equivalent copy of the automaton without epsilon transitions.
    /// Every state receives the symbol transitions of its epsilon closure and becomes an
    /// accept state if its closure contains one.
    pub fn remove_epsilon(&self) -> Result<Automaton> {
        let mut automaton = Automaton::with_capacity(self.states.len())?;
        automaton.alphabet = self.alphabet.clone();
        for state in self.states.iter() {
            let closure = self.epsilon_closure([state.id]);
            let is_accept = closure.iter().any(|s| self.states[*s].is_accept);
            automaton.add_state(&state.label, state.is_start, is_accept)?;
        }
        for state in self.states.iter() {
            for member in self.epsilon_closure([state.id]) {
                for transition in self.states[member].transitions.iter() {
                    if !transition.is_epsilon() {
                        automaton.link(state.id, transition.symbol.clone(), transition.target);
                    }
                }
            }
        }
        Ok(automaton)
    }
}

impl std::fmt::Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Automaton")?;
        write!(f, "Alphabet: {{")?;
        for (index, symbol) in self.alphabet.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", symbol)?;
        }
        writeln!(f, "}}")?;
        writeln!(f, "States:")?;
        for state in &self.states {
            write!(f, "{}", state.label)?;
            if state.is_start {
                write!(f, " (start)")?;
            }
            if state.is_accept {
                write!(f, " (accept)")?;
            }
            write!(f, " ->")?;
            for transition in &state.transitions {
                write!(
                    f,
                    " {}:{}",
                    transition.symbol, self.states[transition.target].label
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
