//! CSS Modules for cssm.
//!
//! Turns a stylesheet whose class names, ids, and keyframes are global by
//! nature into one where they are local by default, then links it against
//! the sheets it composes from. A sheet goes through three passes:
//!
//! 1. [`local_by_default`] marks everything local with `:local(...)`,
//! 2. [`extract_imports`] moves `composes: x from "./y.css"` into ordered
//!    `:import` rules,
//! 3. [`scope`] replaces every `:local(...)` with a generated name and
//!    appends an `:export` rule.
//!
//! [`Processor`] runs the passes; [`link`] and the [`Loader`]
//! implementations resolve the imports afterwards.

mod export;
mod extract_imports;
mod graph;
mod icss;
mod linker;
mod local_by_default;
mod names;
mod options;
mod processor;
mod scope;
mod sheet;

pub use export::{ExportTable, ScopedNames};
pub use extract_imports::extract_imports;
pub use graph::{ImportGraph, OrderConflict, TraceKey};
pub use icss::{
    collect_icss, create_icss_rules, extract_icss, import_path, is_export, replace_symbols,
    replace_value_symbols, Icss, IcssImport,
};
pub use linker::{link, resolve_path, Loader, MemoryLoader, StaticLoader};
pub use local_by_default::local_by_default;
pub use names::{
    sanitize_path, string_hash, ContentHash, FilenameHash, NameCache, PathScoped,
    ScopedNameGenerator, Template,
};
pub use options::{Naming, ProcessorOptions, ScopeMode, UnknownScopeMode};
pub use processor::{Output, Processor};
pub use scope::{scope, ScopeContext};
pub use sheet::{
    parse_stylesheet, AtRule, AtRuleRaws, BlockRaws, Comment, CssNode, Decl, DeclRaws, Rule,
    Stylesheet,
};
