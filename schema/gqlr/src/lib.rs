//! gqlr command-line support.
//!
//! The binary is a thin argument parser over [`commands`]; everything it
//! prints is rendered here so it can be tested without spawning a process.

use std::sync::Once;

pub mod commands;

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Reads the filter from `GQLR_LOG`, falling back to `RUST_LOG`. Without
/// either variable nothing is installed. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let directives = std::env::var("GQLR_LOG").or_else(|_| std::env::var("RUST_LOG"));
        if let Ok(directives) = directives {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(EnvFilter::new(directives))
                .init();
        }
    });
}
