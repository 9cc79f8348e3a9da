//! The `scope` command: run CSS Modules over stylesheets.

use std::sync::Arc;

use cssm_diagnostic::Diagnostic;
use cssm_modules::{
    MemoryLoader, NameCache, Naming, Output, Processor, ProcessorOptions, ScopeMode,
};
use rayon::prelude::*;

use super::{fail, read_file};

/// Parsed `scope` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeArgs {
    pub files: Vec<String>,
    pub mode: ScopeMode,
    pub pattern: Option<String>,
    pub hash_prefix: Option<String>,
    pub strict_order: bool,
    pub export_globals: bool,
    pub link: bool,
    pub json: bool,
}

impl ScopeArgs {
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut parsed = ScopeArgs::default();
        for arg in args {
            if let Some(mode) = arg.strip_prefix("--mode=") {
                parsed.mode = mode.parse().map_err(|e| format!("{e}"))?;
            } else if let Some(pattern) = arg.strip_prefix("--pattern=") {
                parsed.pattern = Some(pattern.to_owned());
            } else if let Some(prefix) = arg.strip_prefix("--hash-prefix=") {
                parsed.hash_prefix = Some(prefix.to_owned());
            } else if arg == "--strict-order" {
                parsed.strict_order = true;
            } else if arg == "--export-globals" {
                parsed.export_globals = true;
            } else if arg == "--link" {
                parsed.link = true;
            } else if arg == "--json" {
                parsed.json = true;
            } else if arg.starts_with("--") {
                return Err(format!("unknown option '{arg}'"));
            } else {
                parsed.files.push(arg.clone());
            }
        }
        Ok(parsed)
    }

    /// Processor options, with generated names memoised across files.
    pub fn processor_options(&self) -> ProcessorOptions {
        let mut options = ProcessorOptions::default()
            .with_mode(self.mode)
            .with_strict_import_order(self.strict_order)
            .with_export_globals(self.export_globals);
        if let Some(pattern) = &self.pattern {
            options = options.with_generator(Naming::Template(pattern.clone()));
        }
        if let Some(prefix) = &self.hash_prefix {
            options = options.with_hash_prefix(prefix.as_str());
        }
        let cache = NameCache::new(options.build_generator());
        options.with_generator(Naming::Custom(Arc::new(cache)))
    }
}

/// Scope every file and print the results.
pub fn scope_files(args: &ScopeArgs) {
    let processor = Processor::new(args.processor_options());
    if args.link {
        link_files(&processor, args);
        return;
    }

    let results: Vec<(String, String, Result<Output, Diagnostic>)> = args
        .files
        .par_iter()
        .map(|path| {
            let source = read_file(path);
            let output = processor.process(&source, path);
            (path.clone(), source, output)
        })
        .collect();

    let mut outputs = Vec::with_capacity(results.len());
    for (path, source, output) in results {
        match output {
            Ok(output) => outputs.push((path, output)),
            Err(err) => fail(&err, &source),
        }
    }

    if args.json {
        let map: serde_json::Map<String, serde_json::Value> = outputs
            .into_iter()
            .map(|(path, output)| {
                let value = serde_json::to_value(&output).unwrap_or(serde_json::Value::Null);
                (path, value)
            })
            .collect();
        print_json(&serde_json::Value::Object(map));
    } else {
        for (path, output) in outputs {
            println!("/* {path} */");
            println!("{}", output.css);
            for (name, value) in output.exports.iter() {
                println!("/* {name} -> {value} */");
            }
        }
    }
}

/// Load each file as an entry point and print the linked sheet.
fn link_files(processor: &Processor, args: &ScopeArgs) {
    let mut loader = MemoryLoader::new(processor.clone());
    let sources: Vec<(String, String)> = args
        .files
        .iter()
        .map(|path| (path.clone(), read_file(path)))
        .collect();
    for (path, source) in &sources {
        loader.insert(path, source.as_str());
    }

    let mut exports = serde_json::Map::new();
    for (path, source) in &sources {
        match loader.load(path) {
            Ok(table) => {
                let value = serde_json::to_value(&table).unwrap_or(serde_json::Value::Null);
                exports.insert(path.clone(), value);
            }
            Err(err) => {
                let source = err
                    .file
                    .as_deref()
                    .and_then(|file| {
                        sources
                            .iter()
                            .find(|(p, _)| cssm_modules::resolve_path(p, "/") == file)
                    })
                    .map_or(source.as_str(), |(_, s)| s.as_str());
                fail(&err, source);
            }
        }
    }

    if args.json {
        let mut out = serde_json::Map::new();
        out.insert("css".to_owned(), serde_json::Value::String(loader.final_source()));
        out.insert("exports".to_owned(), serde_json::Value::Object(exports));
        print_json(&serde_json::Value::Object(out));
    } else {
        println!("{}", loader.final_source());
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: cannot serialize output: {e}");
            std::process::exit(1);
        }
    }
}
