//! gqlr CLI
//!
//! Builds GraphQL-like schemas from node-type definitions.

use gqlr::commands::{render_schema, render_stats, Invocation};
use gqlr_schema::{NodeTypes, SchemaError};

fn main() {
    gqlr::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "schema" | "stats" => {
            let invocation = match Invocation::parse(&args[2..]) {
                Ok(invocation) => invocation,
                Err(message) => {
                    eprintln!("error: {message}");
                    eprintln!("Usage: gqlr {command} <nodes.json> [--root <NodeType>] [--dump-identities]");
                    std::process::exit(1);
                }
            };
            let rendered = NodeTypes::from_path(&invocation.nodes).and_then(|nodes| {
                if command == "schema" {
                    render_schema(&nodes, &invocation)
                } else {
                    render_stats(&nodes, &invocation)
                }
            });
            match rendered {
                Ok(output) => print!("{output}"),
                Err(err) => {
                    report(&err);
                    std::process::exit(1);
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("gqlr {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Print an error and its source chain.
fn report(err: &SchemaError) {
    eprintln!("error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

fn print_usage() {
    println!("gqlr - schema builder for node-type definitions");
    println!();
    println!("Usage: gqlr <command> [options]");
    println!();
    println!("Commands:");
    println!("  schema <nodes.json>  Print the schema as SDL");
    println!("  stats <nodes.json>   Print type registry statistics");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --root <NodeType>    Use a node type as the query root instead of Query");
    println!("  --dump-identities    Trace the canonical identity of every resolve");
    println!();
    println!("Logging is controlled by GQLR_LOG (falls back to RUST_LOG), e.g. GQLR_LOG=gqlr_registry=debug");
}
