//! This example demonstrates the Emitter with the `tokio` feature, where the drain loop runs as a Tokio task.
//!
//! Run with `cargo run --example sender_async --features tokio` and `cargo run --example listener` side by side.

#[cfg(not(feature = "tokio"))]
fn main() {
    eprintln!("This example is not available when the Tokio feature is disabled.");
}

#[cfg(feature = "tokio")]
#[tokio::main]
async fn main() {
    use std::time::Duration;

    pretty_env_logger::init();

    let emitter = match graphite_emitter::Emitter::new(
        "127.0.0.1:2003",
        Duration::from_secs(2),
        "demo.async",
        256,
    ) {
        Ok(emitter) => emitter,
        Err(e) => {
            eprintln!("Failed to set up graphite emitter: {}", e);
            return;
        }
    };

    println!("Sending metrics. Press Ctrl+C to exit.");

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    let mut count: i64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                count += 1;
                emitter.push_i64("count", count);
                emitter.push_f64("ratio", 1.0 / count as f64);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("Shutting down with {} samples queued.", emitter.pending());
}
