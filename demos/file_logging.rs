//! File logging example
//!
//! Configures a hierarchy from JSON and writes JSON lines to a file.
//!
//! Run with: cargo run --example file_logging

use rust_log_hierarchy::prelude::*;
use std::sync::Arc;

const CONFIG: &str = r#"{
    "threshold": "DEBUG",
    "root_level": "INFO",
    "loggers": {
        "app.db": { "level": "DEBUG" },
        "app.audit": { "level": "WARN", "additivity": false }
    }
}"#;

fn main() -> Result<()> {
    println!("=== Rust Log Hierarchy - File Logging Example ===\n");

    let hierarchy = Hierarchy::default();
    HierarchyConfig::from_json(CONFIG)?.apply(&hierarchy);

    let file = FileAppender::open(
        "file",
        Arc::new(JsonLayout::new()),
        "application.log",
        false,
    )?;
    hierarchy.root_logger().add_appender(Arc::new(file));
    hierarchy
        .root_logger()
        .add_appender(Arc::new(ConsoleAppender::new()));

    let app = hierarchy.get_logger("app");
    let db = hierarchy.get_logger("app.db");

    app.info("Application started");
    app.debug("Hidden: app inherits INFO from root");
    db.debug("Connecting to database...");
    db.info("Database connection established");

    for i in 1..=5 {
        app.info(format!("Processing item {}/5", i));
        if i == 3 {
            app.warn("Item 3 took longer than expected");
        }
    }

    hierarchy.shutdown();
    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for file output");

    Ok(())
}
