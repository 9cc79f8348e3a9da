//! Linking processed sheets against the sheets they import.
//!
//! Every `:import("path")` rule is fetched through a [`Loader`], its aliases
//! are replaced by the values the imported sheet exports, and the ICSS
//! rules are removed. [`MemoryLoader`] is a loader over an in-memory set of
//! sources that processes each dependency once and concatenates the
//! results dependencies-first.

use std::cmp::Ordering;

use cssm_diagnostic::{Diagnostic, ErrorCode};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::export::ExportTable;
use crate::graph::TraceKey;
use crate::icss::{import_path, is_export, replace_symbols};
use crate::processor::Processor;
use crate::sheet::{CssNode, Stylesheet};

/// Supplies the export table of an imported sheet.
pub trait Loader {
    /// Fetch the exports of `path`, imported from the sheet at
    /// `relative_to`. `trace` is the import's position in the import tree.
    fn fetch(
        &mut self,
        path: &str,
        relative_to: &str,
        trace: &TraceKey,
    ) -> Result<ExportTable, Diagnostic>;
}

fn import_failed(message: String) -> Diagnostic {
    Diagnostic::new(ErrorCode::E3002, message, 0)
}

/// Resolve the imports of `sheet` and extract its exports.
///
/// `from` is the path of `sheet`. Import rules are fetched in order, the
/// `n`-th with `trace.child(n)`. On return the sheet holds no ICSS rules.
#[tracing::instrument(level = "debug", skip(sheet, trace, loader), fields(trace = %trace))]
pub fn link<L: Loader + ?Sized>(
    sheet: &mut Stylesheet,
    from: &str,
    trace: &TraceKey,
    loader: &mut L,
) -> Result<ExportTable, Diagnostic> {
    let mut translations: FxHashMap<String, String> = FxHashMap::default();
    let mut depth = 0;
    for rule in sheet.nodes.iter().filter_map(CssNode::as_rule) {
        let Some(path) = import_path(&rule.selector) else {
            continue;
        };
        let exports = loader.fetch(path, from, &trace.child(depth))?;
        depth += 1;
        for decl in rule.decls() {
            let Some(value) = exports.get(&decl.value) else {
                return Err(import_failed(format!(
                    "\"{}\" is not exported by \"{path}\"",
                    decl.value
                ))
                .with_file(from));
            };
            translations.insert(decl.prop.clone(), value.to_owned());
        }
    }

    sheet
        .nodes
        .retain(|node| node.as_rule().map_or(true, |r| import_path(&r.selector).is_none()));
    replace_symbols(&mut sheet.nodes, &translations);

    let mut exports = ExportTable::new();
    for rule in sheet.nodes.iter().filter_map(CssNode::as_rule) {
        if is_export(&rule.selector) {
            for decl in rule.decls() {
                exports.insert(decl.prop.as_str(), decl.value.as_str());
            }
        }
    }
    sheet
        .nodes
        .retain(|node| node.as_rule().map_or(true, |r| !is_export(&r.selector)));
    tracing::debug!(imports = depth, exports = exports.len(), "linked");
    Ok(exports)
}

/// A loader over fixed export tables, keyed by import path as written.
#[derive(Clone, Debug, Default)]
pub struct StaticLoader {
    tables: FxHashMap<String, ExportTable>,
}

impl StaticLoader {
    /// A loader with no tables; every fetch fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticLoader::insert`].
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, exports: ExportTable) -> Self {
        self.insert(path, exports);
        self
    }

    /// Serve `exports` for imports of `path`.
    pub fn insert(&mut self, path: impl Into<String>, exports: ExportTable) {
        self.tables.insert(path.into(), exports);
    }
}

impl Loader for StaticLoader {
    fn fetch(
        &mut self,
        path: &str,
        relative_to: &str,
        _trace: &TraceKey,
    ) -> Result<ExportTable, Diagnostic> {
        self.tables.get(path).cloned().ok_or_else(|| {
            import_failed(format!("cannot find module \"{path}\"")).with_file(relative_to)
        })
    }
}

/// Resolve `path` against the directory of `relative_to`.
///
/// Results are absolute, `/`-separated, and free of `.` and `..` segments.
/// Paths not starting with `.` or `/` resolve from the root.
pub fn resolve_path(path: &str, relative_to: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if path.starts_with('.') {
        let dir = relative_to.rsplit_once('/').map_or("", |(dir, _)| dir);
        segments.extend(dir.split('/').filter(|s| !s.is_empty()));
    }
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

#[derive(Clone, Debug)]
struct Loaded {
    css: String,
    exports: ExportTable,
}

/// A loader over in-memory sources.
///
/// Each resolved path is processed at most once. Every load records the
/// trace key it happened under, and [`MemoryLoader::final_source`] emits
/// the loaded CSS with imported sheets before the sheets importing them.
#[derive(Debug)]
pub struct MemoryLoader {
    processor: Processor,
    files: FxHashMap<String, String>,
    loaded: FxHashMap<String, Loaded>,
    traces: Vec<(TraceKey, String)>,
    loading: FxHashSet<String>,
    next_entry: u32,
}

impl MemoryLoader {
    /// A loader with no files that runs `processor` on each sheet it loads.
    pub fn new(processor: Processor) -> Self {
        MemoryLoader {
            processor,
            files: FxHashMap::default(),
            loaded: FxHashMap::default(),
            traces: Vec::new(),
            loading: FxHashSet::default(),
            next_entry: 0,
        }
    }

    /// Builder form of [`MemoryLoader::insert`].
    #[must_use]
    pub fn with_file(mut self, path: &str, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    /// Add or replace the source at `path`, dropping cached results.
    pub fn insert(&mut self, path: &str, source: impl Into<String>) {
        self.files.insert(resolve_path(path, "/"), source.into());
        self.loaded.clear();
        self.traces.clear();
    }

    /// Load `path` as a new entry point.
    pub fn load(&mut self, path: &str) -> Result<ExportTable, Diagnostic> {
        let trace = TraceKey::root(self.next_entry);
        self.next_entry += 1;
        self.fetch(path, "/", &trace)
    }

    /// Exports of an already loaded sheet.
    pub fn exports(&self, path: &str) -> Option<&ExportTable> {
        self.loaded.get(&resolve_path(path, "/")).map(|l| &l.exports)
    }

    /// CSS of every loaded sheet, each once, dependencies first.
    pub fn final_source(&self) -> String {
        let mut traces: Vec<&(TraceKey, String)> = self.traces.iter().collect();
        traces.sort_by(|a, b| match a.0.dependency_order(&b.0) {
            Ordering::Equal => a.1.cmp(&b.1),
            ord => ord,
        });
        let mut written: FxHashSet<&str> = FxHashSet::default();
        let mut out = String::new();
        for (_, path) in traces {
            if !written.insert(path.as_str()) {
                continue;
            }
            if let Some(loaded) = self.loaded.get(path) {
                out.push_str(&loaded.css);
            }
        }
        out
    }
}

impl Loader for MemoryLoader {
    fn fetch(
        &mut self,
        path: &str,
        relative_to: &str,
        trace: &TraceKey,
    ) -> Result<ExportTable, Diagnostic> {
        let path = path.trim_matches(['"', '\'']);
        let resolved = resolve_path(path, relative_to);
        if let Some(loaded) = self.loaded.get(&resolved) {
            return Ok(loaded.exports.clone());
        }
        if self.loading.contains(&resolved) {
            return Err(
                import_failed(format!("circular import of \"{resolved}\"")).with_file(relative_to)
            );
        }
        let Some(source) = self.files.get(&resolved).cloned() else {
            return Err(
                import_failed(format!("cannot find module \"{path}\"")).with_file(relative_to)
            );
        };

        tracing::debug!(path = %resolved, trace = %trace, "loading");
        self.loading.insert(resolved.clone());
        let processor = self.processor.clone();
        let result = processor.load(&source, &resolved, trace, self);
        self.loading.remove(&resolved);
        let output = result?;

        self.traces.push((trace.clone(), resolved.clone()));
        self.loaded.insert(
            resolved,
            Loaded {
                css: output.css,
                exports: output.exports.clone(),
            },
        );
        Ok(output.exports)
    }
}

#[cfg(test)]
mod tests;
