//! Async logging example
//!
//! Demonstrates an asynchronous appender shared by many threads and drained
//! on shutdown.
//!
//! Run with: cargo run --example async_logging

use rust_log_hierarchy::prelude::*;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Log Hierarchy - Async Logging Example ===\n");

    let hierarchy = Hierarchy::new(Level::INFO);
    let async_appender = AsyncAppender::with_buffer_size("async", 1000);
    async_appender.add_appender(Arc::new(ConsoleAppender::new()));
    async_appender.add_appender(Arc::new(FileAppender::open(
        "async",
        Arc::new(TextLayout::new()),
        "async_test.log",
        false,
    )?));
    hierarchy.root_logger().add_appender(Arc::new(async_appender));

    println!("1. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let hierarchy = hierarchy.clone();
            thread::spawn(move || {
                let logger = hierarchy.get_logger(&format!("worker.{}", thread_id));
                for i in 0..20 {
                    logger.info(format!("Thread {} - Message {}", thread_id, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Drains the queue before closing the nested appenders.
    hierarchy.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'async_test.log' for file output");

    Ok(())
}
