//! `kiln build`: incremental compilation of one or all build roots.
//!
//! Per root:
//!
//! 1. Load the persisted state (hashes + dependent graph)
//! 2. Discover source units and hash them against the state
//! 3. Form the Build Request (explicit units, `--full`, or the change set)
//! 4. Run the engine: expand, compile, harvest, reconcile
//! 5. On success, commit hashes and the new graph; on failure, leave both
//!
//! Roots are independent and are built in parallel; output is printed in
//! root-name order once all of them have finished.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kiln_cache::{BuildState, ChangeSet};
use kiln_common::UnitKey;
use kiln_config::ResolvedRoot;
use kiln_diagnostics::{DiagnosticRenderer, TerminalRenderer};
use kiln_graph::{BuildError, Naming};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::project::{builder_for, display_relative, resolve_project_root, select_roots, KILN_VERSION};
use crate::{BuildArgs, GlobalArgs};

type RootError = Box<dyn std::error::Error + Send + Sync>;

/// How the Build Request of a root is formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMode {
    /// Units whose content changed since the last successful build.
    Changed,
    /// Every source unit under the root.
    Full,
    /// Exactly these paths.
    Explicit(Vec<PathBuf>),
}

/// What a successful root build did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSummary {
    /// Units in the Build Request.
    pub requested: usize,
    /// Units handed to the compiler after closure expansion.
    pub compiled: usize,
    /// Source units under the root.
    pub total: usize,
    /// Artifacts the compiler wrote.
    pub written: usize,
    /// Dependency edges harvested.
    pub edges: usize,
}

/// Result of building one root.
#[derive(Debug)]
pub enum RootOutcome {
    /// Nothing was requested.
    UpToDate,
    /// The engine ran and its result was committed.
    Built(RootSummary),
    /// The engine failed; persisted state is unchanged.
    Failed(BuildError),
}

/// Runs the `kiln build` command.
///
/// Returns exit code 0 if every selected root built (or was up to date),
/// 1 otherwise.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = kiln_config::load_config(&project_dir)?;
    let roots = select_roots(&config, &project_dir, args.root.as_deref())?;

    let mode = if !args.units.is_empty() {
        if roots.len() != 1 {
            return Err("explicit units require --root when several roots are configured".into());
        }
        let cwd = std::env::current_dir()?;
        RequestMode::Explicit(args.units.iter().map(|u| cwd.join(u)).collect())
    } else if args.full {
        RequestMode::Full
    } else {
        RequestMode::Changed
    };

    if !global.quiet {
        eprintln!(
            "   Building {} ({} root(s))",
            config.project.name,
            roots.len()
        );
    }

    let results: Vec<(&ResolvedRoot, Result<RootOutcome, RootError>)> = roots
        .par_iter()
        .map(|root| (root, build_root(root, &mode)))
        .collect();

    let renderer = TerminalRenderer::new(global.color);
    let mut failed = 0usize;
    for (root, result) in &results {
        match result {
            Ok(RootOutcome::UpToDate) => {
                if !global.quiet {
                    eprintln!("   Fresh {}: nothing to compile", root.name);
                }
            }
            Ok(RootOutcome::Built(summary)) => {
                if !global.quiet {
                    eprintln!(
                        "   Compiled {}: {} of {} unit(s) ({} requested), {} artifact(s), {} edge(s)",
                        root.name,
                        summary.compiled,
                        summary.total,
                        summary.requested,
                        summary.written,
                        summary.edges
                    );
                }
            }
            Ok(RootOutcome::Failed(BuildError::Compile { diagnostics })) => {
                failed += 1;
                eprint!("{}", renderer.render_all(diagnostics));
                eprintln!("error: build root '{}' failed", root.name);
            }
            Ok(RootOutcome::Failed(e)) => {
                failed += 1;
                eprintln!("error: build root '{}': {e}", root.name);
            }
            Err(e) => {
                failed += 1;
                eprintln!(
                    "error: build root '{}' ({}): {e}",
                    root.name,
                    display_relative(&root.source, &project_dir)
                );
            }
        }
    }

    Ok(if failed == 0 { 0 } else { 1 })
}

/// Builds one root and commits its state on success.
pub fn build_root(root: &ResolvedRoot, mode: &RequestMode) -> Result<RootOutcome, RootError> {
    if !root.source.is_dir() {
        return Err(format!("source directory {} does not exist", root.source.display()).into());
    }

    let mut state = BuildState::load_or_create(&root.state_dir, KILN_VERSION);
    let mut builder = builder_for(root);
    let sources = builder.discover_sources()?;
    let units: Vec<UnitKey> = sources.iter().cloned().collect();
    let changes = state.detect_changes(&units);
    debug!(
        root = %root.name,
        new = changes.new_units.len(),
        modified = changes.modified_units.len(),
        deleted = changes.deleted_units.len(),
        "change detection"
    );

    let request = match mode {
        RequestMode::Changed => changes.request(state.graph()),
        RequestMode::Full => sources.clone(),
        RequestMode::Explicit(paths) => explicit_request(paths, builder.naming())?,
    };

    remove_stale_artifacts(&changes, builder.naming());

    if request.is_empty() {
        if !changes.deleted_units.is_empty() {
            let graph = state.graph().clone();
            state.record_success(&changes, &BTreeSet::new(), graph);
            state.save()?;
        }
        return Ok(RootOutcome::UpToDate);
    }

    let requested = request.len();
    let mut graph = state.graph().clone();
    let report = match builder.build_with_report(request, &mut graph) {
        Ok(report) => report,
        Err(e) => return Ok(RootOutcome::Failed(e)),
    };

    state.record_success(&changes, &report.working_set, graph);
    state.save()?;

    Ok(RootOutcome::Built(RootSummary {
        requested,
        compiled: report.working_set.len(),
        total: sources.len(),
        written: report.written.len(),
        edges: report.edges,
    }))
}

/// Turns explicit paths into unit keys, rejecting anything outside the root.
fn explicit_request(paths: &[PathBuf], naming: &Naming) -> Result<BTreeSet<UnitKey>, RootError> {
    let mut request = BTreeSet::new();
    for path in paths {
        let unit = UnitKey::from_path(path);
        naming.to_artifact(&unit)?;
        if !path.is_file() {
            return Err(format!("source unit {} does not exist", path.display()).into());
        }
        request.insert(unit);
    }
    Ok(request)
}

/// Deletes the artifacts of deleted units so the compiler cannot resolve
/// against them.
fn remove_stale_artifacts(changes: &ChangeSet, naming: &Naming) {
    for unit in &changes.deleted_units {
        let Ok(artifact) = naming.to_artifact(unit) else {
            continue;
        };
        let path: &Path = artifact.as_path();
        match std::fs::remove_file(path) {
            Ok(()) => debug!(artifact = %artifact, "removed stale artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(artifact = %artifact, error = %e, "could not remove stale artifact"),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use kiln_config::ToolConfig;

    // Writes one empty artifact per unit; any unit containing BROKEN fails.
    const COMPILER: &str = r#"d=$1; shift
for f in "$@"; do
  if grep -q BROKEN "$f"; then echo "$f:1: error: broken unit" >&2; exit 1; fi
done
for f in "$@"; do
  b=$(basename "$f" .java); touch "$d/$b.class"; echo "[wrote $d/$b.class]"
done"#;

    // Reports the edges listed in <src>/<Name>.deps, one dependency per line.
    const ANALYZER: &str = r#"for a in "$@"; do
  b=$(basename "$a" .class)
  if [ -f "{src}/$b.deps" ]; then
    while read dep; do echo "$a -> {dest}/$dep.class"; done < "{src}/$b.deps"
  fi
done"#;

    // javac -verbose shape: one package directory, file-object write records.
    const JAVAC_LIKE: &str = r#"d=$1; shift
for f in "$@"; do
  p=$(basename "$(dirname "$f")"); b=$(basename "$f" .java)
  mkdir -p "$d/$p"; touch "$d/$p/$b.class"
  echo "[wrote RegularFileObject[$d/$p/$b.class]]" >&2
done"#;

    // jdeps -v shape: archive summaries keyed by bare file name, then class
    // lines. Dependencies come from <src>/testcase/<Name>.deps.
    const JDEPS_LIKE: &str = r#"for a in "$@"; do
  b=$(basename "$a" .class)
  echo "$b.class -> java.base"
  if [ -f "{src}/testcase/$b.deps" ]; then
    while read dep; do
      echo "$b.class -> {dest}/testcase/$dep.class"
      echo "   testcase.$b                 -> testcase.$dep                 $dep.class"
    done < "{src}/testcase/$b.deps"
  fi
  echo "   testcase.$b                 -> java.lang.Object               java.base"
done"#;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: ResolvedRoot,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_tools(COMPILER, ANALYZER)
        }

        fn with_tools(compiler: &str, analyzer: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let base = dir.path().to_path_buf();
            std::fs::create_dir_all(base.join("src")).unwrap();
            let script = |body: &str, extra: &[&str]| {
                let mut args = vec!["-c".to_string(), body.to_string(), "sh".to_string()];
                args.extend(extra.iter().map(|s| s.to_string()));
                ToolConfig {
                    program: "sh".to_string(),
                    args,
                }
            };
            let root = ResolvedRoot {
                name: "main".to_string(),
                source: base.join("src"),
                destination: base.join("build"),
                source_ext: "java".to_string(),
                artifact_ext: "class".to_string(),
                compiler: script(compiler, &["{dest}"]),
                analyzer: script(analyzer, &[]),
                state_dir: base.join(".kiln").join("main"),
            };
            Self { _dir: dir, root }
        }

        fn write(&self, name: &str, body: &str) -> UnitKey {
            let path = self.root.source.join(name);
            std::fs::write(&path, body).unwrap();
            UnitKey::from_path(&path)
        }

        fn depends(&self, unit: &str, deps: &[&str]) {
            let body: String = deps.iter().map(|d| format!("{d}\n")).collect();
            std::fs::write(self.root.source.join(format!("{unit}.deps")), body).unwrap();
        }

        fn build(&self, mode: &RequestMode) -> RootOutcome {
            build_root(&self.root, mode).unwrap()
        }

        fn state(&self) -> BuildState {
            BuildState::load_or_create(&self.root.state_dir, KILN_VERSION)
        }
    }

    fn built(outcome: RootOutcome) -> RootSummary {
        match outcome {
            RootOutcome::Built(summary) => summary,
            other => panic!("expected a build, got {other:?}"),
        }
    }

    #[test]
    fn first_build_compiles_everything_and_learns_edges() {
        let fx = Fixture::new();
        let one = fx.write("One.java", "class One {}");
        let two = fx.write("Two.java", "class Two { One o; }");
        fx.depends("Two", &["One"]);

        let summary = built(fx.build(&RequestMode::Changed));
        assert_eq!((summary.compiled, summary.written, summary.edges), (2, 2, 1));
        assert!(fx.root.destination.join("One.class").exists());

        let state = fx.state();
        let deps: Vec<&UnitKey> = state.graph().dependents_of(&one).unwrap().iter().collect();
        assert_eq!(deps, vec![&two]);
    }

    #[test]
    fn unchanged_tree_is_up_to_date() {
        let fx = Fixture::new();
        fx.write("One.java", "class One {}");
        built(fx.build(&RequestMode::Changed));
        assert!(matches!(fx.build(&RequestMode::Changed), RootOutcome::UpToDate));
    }

    #[test]
    fn change_pulls_in_dependents() {
        let fx = Fixture::new();
        fx.write("One.java", "class One {}");
        fx.write("Two.java", "class Two { One o; }");
        fx.write("Other.java", "class Other {}");
        fx.depends("Two", &["One"]);
        built(fx.build(&RequestMode::Changed));

        fx.write("One.java", "class One { int x; }");
        let summary = built(fx.build(&RequestMode::Changed));
        assert_eq!(summary.requested, 1);
        assert_eq!(summary.compiled, 2);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn failed_build_keeps_state_then_recovers() {
        let fx = Fixture::new();
        fx.write("One.java", "class One {}");
        fx.write("Two.java", "class Two { One o; }");
        fx.depends("Two", &["One"]);
        built(fx.build(&RequestMode::Changed));
        let before = fx.state().manifest().clone();

        fx.write("One.java", "class One { BROKEN }");
        match fx.build(&RequestMode::Changed) {
            RootOutcome::Failed(BuildError::Compile { diagnostics }) => {
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(diagnostics[0].message, "broken unit");
            }
            other => panic!("expected compile failure, got {other:?}"),
        }
        assert_eq!(fx.state().manifest(), &before);

        fx.write("One.java", "class One { int fixed; }");
        let summary = built(fx.build(&RequestMode::Changed));
        assert_eq!(summary.compiled, 2);
        assert_eq!(fx.state().graph(), &before.dependents);
    }

    #[test]
    fn deleting_a_dependency_rebuilds_its_dependents() {
        let fx = Fixture::new();
        let one = fx.write("One.java", "class One {}");
        fx.write("Two.java", "class Two {}");
        fx.depends("Two", &["One"]);
        built(fx.build(&RequestMode::Changed));

        std::fs::remove_file(one.as_path()).unwrap();
        std::fs::remove_file(fx.root.source.join("Two.deps")).unwrap();
        let summary = built(fx.build(&RequestMode::Changed));
        assert_eq!(summary.compiled, 1);
        assert!(!fx.root.destination.join("One.class").exists());

        let state = fx.state();
        assert!(!state.manifest().files.contains_key(&one));
        assert!(state.graph().is_empty());
    }

    #[test]
    fn full_mode_requests_every_unit() {
        let fx = Fixture::new();
        fx.write("One.java", "class One {}");
        fx.write("Two.java", "class Two {}");
        built(fx.build(&RequestMode::Changed));
        let summary = built(fx.build(&RequestMode::Full));
        assert_eq!(summary.requested, 2);
    }

    #[test]
    fn explicit_units_outside_root_are_rejected() {
        let fx = Fixture::new();
        fx.write("One.java", "class One {}");
        let outside = fx.root.source.parent().unwrap().join("Stray.java");
        assert!(build_root(&fx.root, &RequestMode::Explicit(vec![outside])).is_err());

        let inside = fx.root.source.join("One.java");
        let summary = built(fx.build(&RequestMode::Explicit(vec![inside])));
        assert_eq!(summary.requested, 1);
    }

    #[test]
    fn missing_source_dir_is_an_error() {
        let fx = Fixture::new();
        std::fs::remove_dir_all(&fx.root.source).unwrap();
        let err = build_root(&fx.root, &RequestMode::Changed).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn jdeps_shaped_analyzer_output_learns_the_edge() {
        let fx = Fixture::with_tools(JAVAC_LIKE, JDEPS_LIKE);
        std::fs::create_dir_all(fx.root.source.join("testcase")).unwrap();
        let one = fx.write("testcase/ClassOne.java", "class ClassOne {}");
        let two = fx.write("testcase/ClassTwo.java", "class ClassTwo { ClassOne o; }");
        std::fs::write(fx.root.source.join("testcase").join("ClassTwo.deps"), "ClassOne\n").unwrap();

        let summary = built(fx.build(&RequestMode::Changed));
        assert_eq!((summary.compiled, summary.written, summary.edges), (2, 2, 1));
        let state = fx.state();
        let deps: Vec<&UnitKey> = state.graph().dependents_of(&one).unwrap().iter().collect();
        assert_eq!(deps, vec![&two]);
        assert_eq!(state.graph().len(), 1);

        // Only ClassTwo changes; ClassOne comes from the destination tree.
        fx.write("testcase/ClassTwo.java", "class ClassTwo { ClassOne o; int x; }");
        let summary = built(fx.build(&RequestMode::Changed));
        assert_eq!((summary.compiled, summary.edges), (1, 1));
        let state = fx.state();
        let deps: Vec<&UnitKey> = state.graph().dependents_of(&one).unwrap().iter().collect();
        assert_eq!(deps, vec![&two]);
    }
}
