//! End-to-end processing of one stylesheet.

use std::sync::Arc;

use cssm_diagnostic::Diagnostic;

use crate::export::ExportTable;
use crate::extract_imports::extract_imports;
use crate::graph::TraceKey;
use crate::icss::{extract_icss, is_export};
use crate::linker::{link, Loader};
use crate::local_by_default::local_by_default;
use crate::names::ScopedNameGenerator;
use crate::options::ProcessorOptions;
use crate::scope::{scope, ScopeContext};
use crate::sheet::{parse_stylesheet, CssNode, Stylesheet};

/// A processed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Output {
    pub css: String,
    pub exports: ExportTable,
}

/// Runs local-by-default, extract-imports, and scope over stylesheets.
///
/// One processor can be shared across sheets and threads; the generator is
/// built once from the options.
#[derive(Clone, Debug)]
pub struct Processor {
    options: ProcessorOptions,
    generator: Arc<dyn ScopedNameGenerator>,
}

impl Default for Processor {
    fn default() -> Self {
        Processor::new(ProcessorOptions::default())
    }
}

impl Processor {
    pub fn new(options: ProcessorOptions) -> Self {
        let generator = options.build_generator();
        Processor { options, generator }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Run the passes over `source`, leaving `:import` and `:export` rules
    /// in the result.
    #[tracing::instrument(level = "debug", skip(self, source), fields(len = source.len()))]
    pub fn transform(&self, source: &str, path: &str) -> Result<Stylesheet, Diagnostic> {
        let with_file = |err: Diagnostic| err.with_file(path);
        let mut sheet = parse_stylesheet(source).map_err(with_file)?;
        local_by_default(&mut sheet, self.options.mode).map_err(with_file)?;
        extract_imports(&mut sheet, self.options.strict_import_order).map_err(with_file)?;
        let cx = ScopeContext {
            generator: self.generator.as_ref(),
            path,
            source,
            export_globals: self.options.export_globals,
        };
        scope(&mut sheet, &cx).map_err(with_file)?;
        Ok(sheet)
    }

    /// Transform `source` and split off its exports.
    ///
    /// Imported names stay unresolved: the CSS keeps its `:import` rules and
    /// exported values may still name their aliases.
    pub fn process(&self, source: &str, path: &str) -> Result<Output, Diagnostic> {
        let mut sheet = self.transform(source, path)?;
        let exports = extract_icss(&mut sheet, false).exports;
        sheet
            .nodes
            .retain(|node| !matches!(node, CssNode::Rule(rule) if is_export(&rule.selector)));
        Ok(Output {
            css: sheet.to_css(),
            exports,
        })
    }

    /// Transform `source` and link it against its imports, fetched through
    /// `loader`.
    ///
    /// `trace` locates the sheet in the import tree; its imports are
    /// fetched with child keys in declaration order.
    pub fn load<L: Loader + ?Sized>(
        &self,
        source: &str,
        path: &str,
        trace: &TraceKey,
        loader: &mut L,
    ) -> Result<Output, Diagnostic> {
        let mut sheet = self.transform(source, path)?;
        let exports = link(&mut sheet, path, trace, loader)?;
        Ok(Output {
            css: sheet.to_css(),
            exports,
        })
    }
}
