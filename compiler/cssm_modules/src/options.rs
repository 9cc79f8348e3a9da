//! Processor configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::names::{ContentHash, FilenameHash, PathScoped, ScopedNameGenerator, Template};

/// How names without an explicit `:local`/`:global` are treated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ScopeMode {
    /// Local unless marked `:global`.
    #[default]
    Local,
    /// Global unless marked `:local`.
    Global,
    /// Local, and every rule must name at least one local class or id.
    Pure,
}

impl ScopeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeMode::Local => "local",
            ScopeMode::Global => "global",
            ScopeMode::Pure => "pure",
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope mode `{0}` (expected local, global, or pure)")]
pub struct UnknownScopeMode(pub String);

impl FromStr for ScopeMode {
    type Err = UnknownScopeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ScopeMode::Local),
            "global" => Ok(ScopeMode::Global),
            "pure" => Ok(ScopeMode::Pure),
            _ => Err(UnknownScopeMode(s.to_owned())),
        }
    }
}

/// Which scoped name generator a processor uses.
#[derive(Clone, Debug, Default)]
pub enum Naming {
    /// `_<path>__<local>`
    #[default]
    PathScoped,
    /// An interpolated pattern, see [`Template`].
    Template(String),
    /// `_<local>_<source hash>_<line>`
    ContentHash,
    /// `<local>__<path hash>`
    FilenameHash,
    /// A caller-supplied generator, such as a shared
    /// [`NameCache`](crate::names::NameCache).
    Custom(Arc<dyn ScopedNameGenerator>),
}

/// Options for [`Processor`](crate::Processor).
#[derive(Clone, Debug, Default)]
pub struct ProcessorOptions {
    pub mode: ScopeMode,
    pub generator: Naming,
    /// Export global classes and ids under their own names.
    pub export_globals: bool,
    /// Fail on composition imports that cannot be ordered consistently
    /// instead of dropping the conflicting edge.
    pub strict_import_order: bool,
    /// Mixed into template hashes.
    pub hash_prefix: String,
    /// Directory template paths are made relative to.
    pub context: Option<String>,
}

impl ProcessorOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: ScopeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: Naming) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn with_export_globals(mut self, export_globals: bool) -> Self {
        self.export_globals = export_globals;
        self
    }

    #[must_use]
    pub fn with_strict_import_order(mut self, strict: bool) -> Self {
        self.strict_import_order = strict;
        self
    }

    #[must_use]
    pub fn with_hash_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.hash_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Build the configured generator.
    pub fn build_generator(&self) -> Arc<dyn ScopedNameGenerator> {
        match &self.generator {
            Naming::PathScoped => Arc::new(PathScoped),
            Naming::Template(pattern) => {
                let mut template =
                    Template::new(pattern.as_str()).with_hash_prefix(self.hash_prefix.as_str());
                if let Some(context) = &self.context {
                    template = template.with_context(context.as_str());
                }
                Arc::new(template)
            }
            Naming::ContentHash => Arc::new(ContentHash),
            Naming::FilenameHash => Arc::new(FilenameHash),
            Naming::Custom(generator) => Arc::clone(generator),
        }
    }
}

#[cfg(test)]
mod tests;
