//! `kiln clean`: discard persisted build state and compiled artifacts.

use kiln_cache::BuildState;
use kiln_config::ResolvedRoot;

use crate::project::{display_relative, resolve_project_root, select_roots, KILN_VERSION};
use crate::{CleanArgs, GlobalArgs};

/// Runs the `kiln clean` command.
///
/// The next build of a cleaned root starts from an empty graph and compiles
/// every unit.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = kiln_config::load_config(&project_dir)?;
    let roots = select_roots(&config, &project_dir, args.root.as_deref())?;

    for root in &roots {
        clean_root(root)?;
        if !global.quiet {
            eprintln!(
                "   Cleaned {} ({})",
                root.name,
                display_relative(&root.destination, &project_dir)
            );
        }
    }
    Ok(0)
}

/// Removes the root's state directory and destination tree.
fn clean_root(root: &ResolvedRoot) -> Result<(), Box<dyn std::error::Error>> {
    BuildState::load_or_create(&root.state_dir, KILN_VERSION).clear()?;
    if root.destination.exists() {
        std::fs::remove_dir_all(&root.destination)
            .map_err(|e| format!("failed to remove {}: {e}", root.destination.display()))?;
    }
    Ok(())
}
