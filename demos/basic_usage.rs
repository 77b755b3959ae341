//! Basic hierarchy usage
//!
//! Demonstrates level inheritance and additive appenders across a small tree.
//!
//! Run with: cargo run --example basic_usage

use rust_log_hierarchy::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Log Hierarchy - Basic Usage Example ===\n");

    let hierarchy = Hierarchy::new(Level::INFO);
    hierarchy
        .root_logger()
        .add_appender(Arc::new(ConsoleAppender::new()));

    // Children are created before their parent on purpose.
    let repo = hierarchy.get_logger("app.db.repo");
    let db = hierarchy.get_logger("app.db");

    println!("1. Inherited level (root is INFO):");
    repo.debug("Debug message (hidden)");
    repo.info("Info message (visible)");

    println!("\n2. Lowering app.db to TRACE also affects app.db.repo:");
    db.set_level(Some(Level::TRACE));
    repo.trace("Trace message (visible)");

    println!("\n3. A second appender on app.db, additivity on:");
    db.add_appender(Arc::new(ConsoleAppender::with_layout(
        Arc::new(SimpleLayout),
        ConsoleTarget::Stderr,
    )));
    repo.warn("Written to stdout and stderr");

    println!("\n4. Additivity off on app.db:");
    db.set_additivity(false);
    repo.error("Written to stderr only");

    println!("\n5. Repository threshold at ERROR:");
    hierarchy.set_threshold(Level::ERROR);
    repo.warn("Warning (hidden)");
    repo.fatal("Fatal (visible)");

    hierarchy.shutdown();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
