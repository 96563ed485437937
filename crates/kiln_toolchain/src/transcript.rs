//! Scraping compiler and analyzer transcripts.
//!
//! Recognized compiler lines:
//!
//! ```text
//! [wrote build/pkg/A.class]
//! [wrote RegularFileObject[build/pkg/A.class]]
//! src/pkg/B.java:7: error: cannot find symbol
//! src/pkg/B.java:7:9: warning: [deprecation] f() has been deprecated
//! error: invalid flag: -Xfoo
//! Note: Some input files use unchecked or unsafe operations.
//! ```
//!
//! Indented lines right after a diagnostic become its notes; caret-only
//! lines are dropped. Analyzer transcripts are read in the `jdeps -v` shape;
//! see [`parse_dependency_edges`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kiln_common::ArtifactId;
use kiln_diagnostics::{Diagnostic, Location, Severity};
use kiln_graph::DependencyEdge;

/// Collects every artifact the compiler reports having written.
pub fn parse_written_artifacts(transcript: &str) -> BTreeSet<ArtifactId> {
    transcript.lines().filter_map(written_record).collect()
}

fn written_record(line: &str) -> Option<ArtifactId> {
    let inner = line.trim().strip_prefix("[wrote ")?.strip_suffix(']')?;
    // javac 8 wraps the path in a file-object description.
    let path = match (inner.find('['), inner.ends_with(']')) {
        (Some(open), true) => &inner[open + 1..inner.len() - 1],
        _ => inner,
    };
    (!path.is_empty()).then(|| ArtifactId::new(path))
}

/// Collects every diagnostic the compiler printed, in transcript order.
pub fn parse_diagnostics(transcript: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut in_diagnostic = false;
    for line in transcript.lines() {
        if let Some(diag) = diagnostic_header(line) {
            diagnostics.push(diag);
            in_diagnostic = true;
            continue;
        }
        let indented = line.starts_with(' ') || line.starts_with('\t');
        if !(in_diagnostic && indented) {
            in_diagnostic = false;
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c == '^') {
            continue;
        }
        if let Some(last) = diagnostics.last_mut() {
            last.notes.push(trimmed.to_string());
        }
    }
    diagnostics
}

fn diagnostic_header(line: &str) -> Option<Diagnostic> {
    if let Some((word, message)) = line.split_once(": ") {
        if let Some(severity) = severity_word(word) {
            return Some(Diagnostic::new(severity, message.trim()));
        }
    }
    // `<file>:<line>[:<col>]: <severity>: <message>`
    let mut search = 0;
    while let Some(offset) = line[search..].find(": ") {
        let idx = search + offset;
        let rest = &line[idx + 2..];
        if let Some((word, message)) = rest.split_once(": ") {
            if let (Some(severity), Some(location)) =
                (severity_word(word), parse_location(&line[..idx]))
            {
                return Some(Diagnostic::new(severity, message.trim()).at(location));
            }
        }
        search = idx + 2;
    }
    None
}

/// javac capitalizes the summary notes it prints without a location.
fn severity_word(word: &str) -> Option<Severity> {
    match word {
        "Note" => Some(Severity::Note),
        _ => Severity::from_keyword(word),
    }
}

/// Parses `file:line` or `file:line:col`.
fn parse_location(prefix: &str) -> Option<Location> {
    let (head, last) = prefix.rsplit_once(':')?;
    let last: u32 = last.parse().ok()?;
    if let Some((file, line)) = head.rsplit_once(':') {
        if let Ok(line) = line.parse::<u32>() {
            return Some(Location {
                file: file.to_string(),
                line,
                column: Some(last),
            });
        }
    }
    Some(Location {
        file: head.to_string(),
        line: last,
        column: None,
    })
}

/// Collects dependency edges from an analyzer transcript.
///
/// Two line shapes are understood, both anchored at `artifact_root`:
///
/// ```text
/// build/pkg/Two.class -> build/pkg/One.class
///    pkg.Two                 -> pkg.One                 One.class
/// ```
///
/// A path line counts only when both sides lie inside `artifact_root`;
/// jdeps prints its per-archive summaries with a bare file name on the left,
/// so those are skipped in favour of the class lines that follow. A class
/// line is rebuilt into `<artifact_root>/pkg/Two.<artifact_ext>` on both
/// sides and kept when `is_artifact` confirms both files, which drops
/// platform classes and anything the analyzer could not locate.
///
/// `artifact_ext` is the artifact suffix without the dot. Duplicate edges
/// are reported once, in first-seen order.
pub fn parse_dependency_edges(
    transcript: &str,
    artifact_root: &Path,
    artifact_ext: &str,
    is_artifact: impl Fn(&Path) -> bool,
) -> Vec<DependencyEdge> {
    let suffix = format!(".{artifact_ext}");
    let mut seen = BTreeSet::new();
    let mut edges = Vec::new();
    for line in transcript.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let edge = match tokens.as_slice() {
            [from, "->", to] if from.ends_with(&suffix) && to.ends_with(&suffix) => {
                let inside = |t: &str| Path::new(t).starts_with(artifact_root);
                (inside(*from) && inside(*to)).then(|| DependencyEdge::new(*from, *to))
            }
            [from, "->", to, _archive, ..] => {
                let dependent = class_artifact(from, artifact_root, artifact_ext);
                let dependency = class_artifact(to, artifact_root, artifact_ext);
                match (dependent, dependency) {
                    (Some(a), Some(b)) if is_artifact(&a) && is_artifact(&b) => Some(
                        DependencyEdge::new(ArtifactId::from_path(&a), ArtifactId::from_path(&b)),
                    ),
                    _ => None,
                }
            }
            _ => None,
        };
        if let Some(edge) = edge {
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        }
    }
    edges
}

/// `pkg.sub.Name` -> `<artifact_root>/pkg/sub/Name.<ext>`.
fn class_artifact(class_name: &str, artifact_root: &Path, artifact_ext: &str) -> Option<PathBuf> {
    let valid = |segment: &str| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    };
    if !class_name.split('.').all(valid) {
        return None;
    }
    let mut path = artifact_root.to_path_buf();
    path.extend(class_name.split('.'));
    let mut file = path.into_os_string();
    file.push(".");
    file.push(artifact_ext);
    Some(PathBuf::from(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_records_both_forms() {
        let transcript = "\
[parsing started SimpleFileObject[src/A.java]]
[wrote RegularFileObject[build/A.class]]
[wrote build/pkg/B.class]
[total 412ms]
";
        let written = parse_written_artifacts(transcript);
        let names: Vec<&str> = written.iter().map(ArtifactId::as_str).collect();
        assert_eq!(names, vec!["build/A.class", "build/pkg/B.class"]);
    }

    #[test]
    fn written_records_ignore_other_brackets() {
        assert!(parse_written_artifacts("[wrote ]\n[checking A]\nwrote x.class").is_empty());
    }

    #[test]
    fn located_error_with_notes() {
        let transcript = "\
src/testcase/ClassTwo.java:5: error: cannot find symbol
\tnew ClassOne().placeholderMethod();
\t              ^
  symbol:   method placeholderMethod()
  location: class ClassOne
1 error
";
        let diags = parse_diagnostics(transcript);
        assert_eq!(diags.len(), 1);
        let diag = &diags[0];
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "cannot find symbol");
        let loc = diag.location.as_ref().unwrap();
        assert_eq!(loc.file, "src/testcase/ClassTwo.java");
        assert_eq!(loc.line, 5);
        assert_eq!(loc.column, None);
        assert_eq!(
            diag.notes,
            vec![
                "new ClassOne().placeholderMethod();",
                "symbol:   method placeholderMethod()",
                "location: class ClassOne",
            ]
        );
    }

    #[test]
    fn location_with_column() {
        let diags = parse_diagnostics("A.java:3:14: warning: unchecked call");
        let loc = diags[0].location.as_ref().unwrap();
        assert_eq!((loc.line, loc.column), (3, Some(14)));
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn unlocated_diagnostics() {
        let transcript = "\
error: invalid flag: -Xnope
Note: Some input files use unchecked or unsafe operations.
";
        let diags = parse_diagnostics(transcript);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].message, "invalid flag: -Xnope");
        assert!(diags[0].location.is_none());
        assert_eq!(diags[1].severity, Severity::Note);
    }

    #[test]
    fn verbose_chatter_is_not_a_diagnostic() {
        let transcript = "\
[search path for source files: src]
[loading ZipFileIndexFileObject[rt.jar(java/lang/Object.class)]]
[wrote build/A.class]
";
        assert!(parse_diagnostics(transcript).is_empty());
    }

    // `jdeps -v build/testcase/ClassTwo.class build/testcase/ClassOne.class`
    // on JDK 17, ClassTwo calling into ClassOne.
    const JDEPS_TWO_USES_ONE: &str = "\
ClassOne.class -> java.base
   testcase.ClassOne                                  -> java.io.PrintStream                                java.base
   testcase.ClassOne                                  -> java.lang.Object                                   java.base
   testcase.ClassOne                                  -> java.lang.String                                   java.base
   testcase.ClassOne                                  -> java.lang.System                                   java.base
ClassTwo.class -> /home/dev/demo/build/testcase/ClassOne.class
ClassTwo.class -> java.base
   testcase.ClassTwo                                  -> java.lang.Object                                   java.base
   testcase.ClassTwo                                  -> testcase.ClassOne                                  ClassOne.class
";

    fn on_disk(paths: &[&str]) -> impl Fn(&Path) -> bool {
        let known: BTreeSet<PathBuf> = paths.iter().map(PathBuf::from).collect();
        move |p: &Path| known.contains(p)
    }

    #[test]
    fn jdeps_class_lines_become_edges() {
        let edges = parse_dependency_edges(
            JDEPS_TWO_USES_ONE,
            Path::new("/home/dev/demo/build"),
            "class",
            on_disk(&[
                "/home/dev/demo/build/testcase/ClassOne.class",
                "/home/dev/demo/build/testcase/ClassTwo.class",
            ]),
        );
        assert_eq!(
            edges,
            vec![DependencyEdge::new(
                "/home/dev/demo/build/testcase/ClassTwo.class",
                "/home/dev/demo/build/testcase/ClassOne.class",
            )]
        );
    }

    #[test]
    fn jdeps_summary_with_bare_dependent_is_skipped() {
        let edges = parse_dependency_edges(
            "ClassTwo.class -> /home/dev/demo/build/testcase/ClassOne.class\n",
            Path::new("/home/dev/demo/build"),
            "class",
            |_: &Path| true,
        );
        assert!(edges.is_empty());
    }

    #[test]
    fn class_missing_from_destination_is_not_an_edge() {
        let transcript = "\
   testcase.ClassTwo -> testcase.Gone not found
   testcase.ClassTwo -> org.lib.Helper lib.jar
";
        let edges = parse_dependency_edges(
            transcript,
            Path::new("build"),
            "class",
            on_disk(&["build/testcase/ClassTwo.class"]),
        );
        assert!(edges.is_empty());
    }

    #[test]
    fn nested_class_lines_keep_their_artifact_name() {
        let edges = parse_dependency_edges(
            "   pkg.Outer$Inner -> pkg.Base Base.class\n",
            Path::new("build"),
            "class",
            on_disk(&["build/pkg/Outer$Inner.class", "build/pkg/Base.class"]),
        );
        assert_eq!(
            edges,
            vec![DependencyEdge::new("build/pkg/Outer$Inner.class", "build/pkg/Base.class")]
        );
    }

    #[test]
    fn path_lines_inside_the_destination() {
        let transcript = "\
build/Two.class -> build/One.class
   build/Three.class   ->   build/One.class
build/Two.class -> java.base
build/Two.class -> other/One.class
build/Two.class -> build/One.class extra
build/Two.class -> build/One.class
summary: 2 classes
";
        let edges = parse_dependency_edges(transcript, Path::new("build"), "class", |_: &Path| true);
        assert_eq!(
            edges,
            vec![
                DependencyEdge::new("build/Two.class", "build/One.class"),
                DependencyEdge::new("build/Three.class", "build/One.class"),
            ]
        );
    }

    #[test]
    fn lowercase_note_and_help_headers() {
        let diags = parse_diagnostics("A.java:2: note: see here\nhelp: try this\n");
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, Severity::Note);
        assert_eq!(diags[1].severity, Severity::Help);
    }
}
