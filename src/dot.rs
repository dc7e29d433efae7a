//! The `dot` module contains the conversion from an automaton to a graphviz dot format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use dot_writer::{Attributes, DotWriter, RankDirection};
use itertools::Itertools;

use crate::{Automaton, Result};

/// Render the automaton to a graphviz dot format.
///
/// The graph is preceded by a comment with the number of states and the alphabet. Start
/// states are drawn blue, accept states red, edges are labeled with their symbol.
pub fn render_to<W: Write>(automaton: &Automaton, label: &str, output: &mut W) -> Result<()> {
    writeln!(output, "// States: {}", automaton.state_count())?;
    writeln!(
        output,
        "// Alphabet ({} symbols): {}",
        automaton.alphabet().len(),
        automaton.alphabet().iter().join(", ")
    )?;

    let mut writer = DotWriter::from(&mut *output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(&format!(
            "{}\nStates: {}, Alphabet size: {}",
            label,
            automaton.state_count(),
            automaton.alphabet().len()
        ))
        .set_rank_direction(RankDirection::LeftRight);
    for state in automaton.states() {
        let source_id = {
            let mut source_node = digraph.node_auto();
            source_node
                .set_label(state.label())
                .set_shape(dot_writer::Shape::Circle);
            if state.is_start() {
                source_node
                    .set_color(dot_writer::Color::Blue)
                    .set_pen_width(3.0);
            }
            if state.is_accept() {
                source_node
                    .set_color(dot_writer::Color::Red)
                    .set_pen_width(3.0);
            }
            source_node.id()
        };
        for transition in state.transitions() {
            digraph
                .edge(
                    source_id.clone(),
                    &format!("node_{}", transition.target().as_usize()),
                )
                .attributes()
                .set_label(&transition.symbol().to_string());
        }
    }
    Ok(())
}

/// Render the automaton into a dot file. The file stem is used as graph label.
pub fn export_dot_file<P: AsRef<Path>>(automaton: &Automaton, path: P) -> Result<()> {
    let path = path.as_ref();
    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "automaton".to_string());
    let mut output = BufWriter::new(File::create(path)?);
    render_to(automaton, &label, &mut output)?;
    output.flush()?;
    Ok(())
}
