//! cssm CLI
//!
//! Inspects selectors and values, and scopes stylesheets as CSS Modules.

mod commands;
mod tracing_setup;

use commands::{parse_selector, scope_files, show_unit, tokenize_selector, value_tree, ScopeArgs};

fn main() {
    tracing_setup::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let rest = &args[2..];
    let flag = |name: &str| rest.iter().any(|a| a == name);
    let input = rest.iter().find(|a| !a.starts_with("--"));

    match command.as_str() {
        "tokens" => {
            let Some(input) = input else {
                eprintln!("Usage: cssmc tokens <selector> [--safe]");
                std::process::exit(1);
            };
            tokenize_selector(input, flag("--safe"));
        }
        "parse" => {
            let Some(input) = input else {
                eprintln!("Usage: cssmc parse <selector> [--safe] [--lossy]");
                std::process::exit(1);
            };
            parse_selector(input, flag("--safe"), flag("--lossy"));
        }
        "value" => {
            let Some(input) = input else {
                eprintln!("Usage: cssmc value <value>");
                std::process::exit(1);
            };
            value_tree(input);
        }
        "unit" => {
            let Some(input) = input else {
                eprintln!("Usage: cssmc unit <value>");
                std::process::exit(1);
            };
            show_unit(input);
        }
        "scope" => {
            let options = match ScopeArgs::parse(rest) {
                Ok(options) if !options.files.is_empty() => options,
                Ok(_) => {
                    print_scope_usage();
                    std::process::exit(1);
                }
                Err(message) => {
                    eprintln!("error: {message}");
                    eprintln!();
                    print_scope_usage();
                    std::process::exit(1);
                }
            };
            scope_files(&options);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("cssmc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_scope_usage() {
    eprintln!("Usage: cssmc scope <file.css>... [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --mode=<mode>          local (default), global, or pure");
    eprintln!("  --pattern=<template>   Scoped name template, e.g. [name]__[local]___[hash:base64:5]");
    eprintln!("  --hash-prefix=<text>   Mixed into template hashes");
    eprintln!("  --strict-order         Fail on composition imports with no consistent order");
    eprintln!("  --export-globals       Export global classes and ids too");
    eprintln!("  --link                 Link the files against each other and print one sheet");
    eprintln!("  --json                 Print CSS and exports as JSON");
}

fn print_usage() {
    println!("cssm: CSS selector tools and CSS Modules");
    println!();
    println!("Usage: cssmc <command> [options]");
    println!();
    println!("Commands:");
    println!("  tokens <selector>    Tokenize a selector");
    println!("  parse <selector>     Parse a selector and display its tree");
    println!("  value <value>        Parse a declaration value and display its nodes");
    println!("  unit <value>         Split a dimension into number and unit");
    println!("  scope <files...>     Scope stylesheets as CSS Modules");
    println!("  help                 Show this help message");
    println!("  version              Show the version");
    println!();
    println!("Set CSSM_LOG (or RUST_LOG) to enable tracing, e.g. CSSM_LOG=cssm_modules=debug.");
    println!("Set CSSM_LOG_TREE=1 for hierarchical output.");
}
