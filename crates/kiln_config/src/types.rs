//! Configuration types deserialized from `kiln.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `kiln.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Defaults shared by every build root.
    #[serde(default)]
    pub build: BuildDefaults,
    /// The compiler invoked for each build round.
    pub compiler: ToolConfig,
    /// The dependency analyzer run over freshly written artifacts.
    pub analyzer: ToolConfig,
    /// Named build roots (e.g., "main", "test").
    #[serde(default)]
    pub roots: BTreeMap<String, RootConfig>,
}

/// Core project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
}

/// Project-wide build defaults, overridable per root.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BuildDefaults {
    /// Suffix of source units, without the dot.
    #[serde(default = "default_source_ext")]
    pub source_ext: String,
    /// Suffix of compiled artifacts, without the dot.
    #[serde(default = "default_artifact_ext")]
    pub artifact_ext: String,
    /// Directory, relative to the project root, holding persisted build state.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for BuildDefaults {
    fn default() -> Self {
        Self {
            source_ext: default_source_ext(),
            artifact_ext: default_artifact_ext(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_source_ext() -> String {
    "java".to_string()
}

fn default_artifact_ext() -> String {
    "class".to_string()
}

fn default_cache_dir() -> String {
    ".kiln".to_string()
}

/// An external program and its argument template.
///
/// `{src}` and `{dest}` inside `args` are replaced with the root's source and
/// destination directories when the program is run.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    /// Program name or path.
    pub program: String,
    /// Arguments placed before the per-call operands.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub args: Vec<String>,
}

/// One independent build root: a source tree compiled into a destination tree.
#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    /// Source directory, relative to the project root.
    pub source: String,
    /// Destination directory for artifacts, relative to the project root.
    pub destination: String,
    /// Overrides `build.source_ext` for this root.
    #[serde(default)]
    pub source_ext: Option<String>,
    /// Overrides `build.artifact_ext` for this root.
    #[serde(default)]
    pub artifact_ext: Option<String>,
    /// Replaces the project compiler for this root.
    #[serde(default)]
    pub compiler: Option<ToolConfig>,
    /// Replaces the project analyzer for this root.
    #[serde(default)]
    pub analyzer: Option<ToolConfig>,
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `args = "-verbose"` as shorthand for `args = ["-verbose"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
