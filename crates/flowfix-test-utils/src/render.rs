use std::fmt::Write;

use flowfix_dataflow::{AnalysisEntity, DataFlowAnalysisResult, EntityRoot};
use flowfix_ir::{BlockKind, Program};

use crate::const_value::ConstValue;
use crate::propagation::ConstData;

/// One line per block with its entry and exit facts, sorted by name so that
/// the output is stable across runs.
pub fn render_blocks<L>(
    program: &Program<L>,
    result: &DataFlowAnalysisResult<ConstValue, ConstData>,
) -> String {
    let mut out = String::new();
    for (ordinal, block) in result.blocks().iter().enumerate() {
        let kind = match block.kind() {
            BlockKind::Entry => "entry",
            BlockKind::Block => "block",
            BlockKind::Exit => "exit",
        };
        let _ = write!(out, "b{ordinal} {kind}");
        match (block.input(), block.output()) {
            (Some(input), Some(output)) => {
                let _ = writeln!(
                    out,
                    ": in {} out {}",
                    render_data(program, input),
                    render_data(program, output)
                );
            }
            _ => {
                let _ = writeln!(out, ": unreachable");
            }
        }
    }
    out
}

fn render_data<L>(program: &Program<L>, data: &ConstData) -> String {
    let mut facts: Vec<String> = data
        .iter()
        .map(|(entity, value)| format!("{}={value}", render_entity(program, entity)))
        .collect();
    facts.sort();
    format!("{{{}}}", facts.join(", "))
}

fn render_entity<L>(program: &Program<L>, entity: &AnalysisEntity) -> String {
    match entity.root() {
        EntityRoot::Symbol(symbol) => program
            .symbol_name(*symbol)
            .map_or_else(|| format!("{symbol:?}"), str::to_owned),
        EntityRoot::Capture(capture) => format!("capture{}", capture.capture().0),
        other => format!("{other:?}"),
    }
}
