//! `kiln graph`: print the persisted dependent graph.

use std::collections::BTreeMap;
use std::path::Path;

use kiln_cache::BuildState;
use kiln_graph::DependentGraph;

use crate::project::{display_relative, resolve_project_root, select_roots, KILN_VERSION};
use crate::{GlobalArgs, GraphArgs, ReportFormat};

/// Runs the `kiln graph` command.
pub fn run(args: &GraphArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = kiln_config::load_config(&project_dir)?;
    let roots = select_roots(&config, &project_dir, args.root.as_deref())?;

    let graphs: BTreeMap<String, DependentGraph> = roots
        .iter()
        .map(|root| {
            let state = BuildState::load_or_create(&root.state_dir, KILN_VERSION);
            (root.name.clone(), state.graph().clone())
        })
        .collect();

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&graphs, &project_dir)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&graphs)?),
    }
    Ok(0)
}

/// One block per root: each unit followed by the units that depend on it.
fn render_text(graphs: &BTreeMap<String, DependentGraph>, project_dir: &Path) -> String {
    let mut out = String::new();
    for (name, graph) in graphs {
        out.push_str(&format!(
            "[{name}] {} unit(s) with dependents, {} edge(s)\n",
            graph.len(),
            graph.edge_count()
        ));
        for (unit, dependents) in graph.iter() {
            out.push_str(&display_relative(unit.as_path(), project_dir));
            out.push('\n');
            for dependent in dependents {
                out.push_str("  <- ");
                out.push_str(&display_relative(dependent.as_path(), project_dir));
                out.push('\n');
            }
        }
    }
    out
}
