//! Export of an automaton as a JSON document.
//!
//! The document has three sections: `metadata` with the sizes and the alphabet, `states`
//! with every state and its outgoing transitions, and `statistics` with derived counts and
//! properties. Epsilon transitions carry the symbol `ε`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::{Automaton, Result};

#[derive(Serialize)]
struct JsonAutomaton<'a> {
    metadata: JsonMetadata<'a>,
    states: Vec<JsonState<'a>>,
    statistics: JsonStatistics,
}

#[derive(Serialize)]
struct JsonMetadata<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    state_count: usize,
    alphabet_size: usize,
    alphabet: Vec<&'a str>,
}

#[derive(Serialize)]
struct JsonState<'a> {
    id: usize,
    label: &'a str,
    is_start: bool,
    is_accept: bool,
    outgoing_transition_count: usize,
    transitions: Vec<JsonTransition<'a>>,
}

#[derive(Serialize)]
struct JsonTransition<'a> {
    symbol: String,
    destination: JsonDestination<'a>,
}

#[derive(Serialize)]
struct JsonDestination<'a> {
    id: usize,
    label: &'a str,
}

#[derive(Serialize)]
struct JsonStatistics {
    start_state_count: usize,
    accept_state_count: usize,
    total_transitions: usize,
    epsilon_transition_count: usize,
    average_transitions_per_state: f64,
    is_deterministic: bool,
    is_complete: bool,
}

impl<'a> From<&'a Automaton> for JsonAutomaton<'a> {
    fn from(automaton: &'a Automaton) -> Self {
        let states = automaton
            .states()
            .iter()
            .map(|state| JsonState {
                id: state.id().as_usize(),
                label: state.label(),
                is_start: state.is_start(),
                is_accept: state.is_accept(),
                outgoing_transition_count: state.transitions().len(),
                transitions: state
                    .transitions()
                    .iter()
                    .map(|transition| JsonTransition {
                        symbol: transition.symbol().to_string(),
                        destination: JsonDestination {
                            id: transition.target().as_usize(),
                            label: automaton.states()[transition.target()].label(),
                        },
                    })
                    .collect(),
            })
            .collect();

        let total_transitions = automaton.transition_count();
        let average_transitions_per_state = if automaton.is_empty() {
            0.0
        } else {
            total_transitions as f64 / automaton.state_count() as f64
        };
        JsonAutomaton {
            metadata: JsonMetadata {
                kind: "finite_automaton",
                state_count: automaton.state_count(),
                alphabet_size: automaton.alphabet().len(),
                alphabet: automaton.alphabet().iter().map(String::as_str).collect(),
            },
            states,
            statistics: JsonStatistics {
                start_state_count: automaton.start_states().count(),
                accept_state_count: automaton.accept_states().count(),
                total_transitions,
                epsilon_transition_count: automaton
                    .states()
                    .iter()
                    .flat_map(|state| state.transitions())
                    .filter(|transition| transition.is_epsilon())
                    .count(),
                average_transitions_per_state,
                is_deterministic: automaton.is_deterministic(),
                is_complete: automaton.is_complete(),
            },
        }
    }
}

/// Write the automaton as pretty printed JSON.
pub fn export_json<W: Write>(automaton: &Automaton, output: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *output, &JsonAutomaton::from(automaton))?;
    writeln!(output)?;
    Ok(())
}

/// Write the automaton as pretty printed JSON into a file.
pub fn export_json_file<P: AsRef<Path>>(automaton: &Automaton, path: P) -> Result<()> {
    let mut output = BufWriter::new(File::create(path)?);
    export_json(automaton, &mut output)?;
    output.flush()?;
    Ok(())
}
