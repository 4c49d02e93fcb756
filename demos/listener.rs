//! A stand-in for a Carbon plaintext listener that prints every line it receives.
//!
//! Listens on `127.0.0.1:2003`; each flush from an Emitter shows up as one connection.

use std::{
    io::{BufRead, BufReader},
    net::TcpListener,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

fn main() {
    let listener = TcpListener::bind("127.0.0.1:2003").expect("Failed to bind 127.0.0.1:2003");

    thread::spawn(move || {
        for stream in listener.incoming().filter_map(Result::ok) {
            let peer = stream
                .peer_addr()
                .map_or_else(|_| "unknown".to_string(), |addr| addr.to_string());
            println!("-- flush from {peer}");
            for line in BufReader::new(stream).lines().map_while(Result::ok) {
                println!("{line}");
            }
        }
    });

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Handle Ctrl+C to exit gracefully.
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    println!("Graphite listener is running. Press Ctrl+C to exit.");

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_secs(1));
    }

    println!("Shutting down graphite listener.");
}
