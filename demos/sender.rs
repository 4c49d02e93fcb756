//! This example demonstrates how to set up an Emitter for sending metrics to a Graphite plaintext listener.
//!
//! The Emitter queues samples in memory and a background thread flushes them every couple of seconds. Metrics are pushed both directly and through the `metrics` macros after installing the GraphiteRecorder.
//! Run `cargo run --example listener` in another terminal to watch the lines arrive on `127.0.0.1:2003`.

#[cfg(feature = "tokio")]
fn main() {
    eprintln!("This example is not available when the Tokio feature is enabled, see sender_async.");
}

#[cfg(not(feature = "tokio"))]
fn main() {
    use graphite_emitter::EmitterBuilder;
    use metrics::{counter, gauge, histogram};
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread,
        time::Duration,
    };

    pretty_env_logger::init();

    let emitter = match EmitterBuilder::default()
        .flush_interval(Duration::from_secs(2))
        .prefix("demo.sender")
        .build()
    {
        Ok(emitter) => emitter,
        Err(e) => {
            eprintln!("Failed to set up graphite emitter: {}", e);
            return;
        }
    };

    if let Err(e) = emitter.install_recorder() {
        eprintln!("Failed to set up graphite recorder: {}", e);
        return;
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Handle Ctrl+C to exit gracefully.
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    println!("Sending metrics to {}. Press Ctrl+C to exit.", emitter.addr());

    let mut tick: u64 = 0;
    while running.load(Ordering::SeqCst) {
        tick += 1;
        emitter.push_u64("ticks", tick);
        emitter.push("status", "ok");
        counter!("loops").increment(1);
        gauge!("phase").set(std::f64::consts::PI * (tick % 4) as f64);
        histogram!("sleep_ms").record(250.0);
        thread::sleep(Duration::from_millis(250));
    }

    println!("Stopped, {} samples were still queued.", emitter.pending());
}
