//! End-to-end flushes against a local plaintext listener.
//!
//! The same tests run against the thread-based drain loop and, with the `tokio` feature,
//! against the task-based one.

use graphite_emitter::{Clock, Emitter, EmitterBuilder, EmitterError};
use std::{
    io::{ErrorKind, Read},
    net::{SocketAddr, TcpListener},
    thread,
    time::{Duration, Instant},
};

const TIMESTAMP: u64 = 1_700_000_000;
const INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug)]
struct FixedClock;

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> u64 {
        TIMESTAMP
    }
}

struct Fixture {
    emitter: Emitter,
    #[cfg(feature = "tokio")]
    _runtime: tokio::runtime::Runtime,
}

fn start(addr: SocketAddr, queue_capacity: usize) -> Fixture {
    let builder = EmitterBuilder::default()
        .address(&addr.to_string())
        .flush_interval(INTERVAL)
        .prefix("app")
        .queue_capacity(queue_capacity)
        .clock(FixedClock);

    #[cfg(not(feature = "tokio"))]
    let emitter = builder.build().unwrap();

    #[cfg(feature = "tokio")]
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    #[cfg(feature = "tokio")]
    let emitter = {
        let _guard = runtime.enter();
        builder.build().unwrap()
    };

    Fixture {
        emitter,
        #[cfg(feature = "tokio")]
        _runtime: runtime,
    }
}

fn listen() -> TcpListener {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    listener
}

/// Accepts connections until `expected` lines have arrived or `timeout` passes.
fn collect(listener: &TcpListener, expected: usize, timeout: Duration) -> Vec<String> {
    let deadline = Instant::now() + timeout;
    let mut lines = Vec::new();
    while lines.len() < expected && Instant::now() < deadline {
        match listener.accept() {
            Ok((mut stream, _)) => {
                stream.set_nonblocking(false).unwrap();
                stream
                    .set_read_timeout(Some(Duration::from_secs(5)))
                    .unwrap();
                let mut received = String::new();
                stream.read_to_string(&mut received).unwrap();
                lines.extend(received.lines().map(str::to_string));
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("accept failed: {e}"),
        }
    }
    lines
}

fn line(metric: &str, value: &str) -> String {
    format!("app.{metric} {value} {TIMESTAMP}")
}

#[test]
fn flushes_samples_in_push_order() {
    let listener = listen();
    let fixture = start(listener.local_addr().unwrap(), 16);

    fixture.emitter.push_u64("x", 42);
    fixture.emitter.push_i64("delta", -3);
    fixture.emitter.push_f64("y", 3.14159);
    fixture.emitter.push("z", "custom");

    assert_eq!(
        collect(&listener, 4, Duration::from_secs(5)),
        [
            line("x", "42"),
            line("delta", "-3"),
            line("y", "3.1416"),
            line("z", "custom")
        ]
    );
    assert_eq!(fixture.emitter.pending(), 0);
}

#[test]
fn overflow_is_never_sent() {
    let listener = listen();
    let fixture = start(listener.local_addr().unwrap(), 2);

    fixture.emitter.push_u64("kept", 1);
    fixture.emitter.push_u64("kept", 2);
    fixture.emitter.push_u64("dropped", 3);
    assert_eq!(fixture.emitter.pending(), 2);

    assert_eq!(
        collect(&listener, 3, INTERVAL * 4),
        [line("kept", "1"), line("kept", "2")]
    );
}

#[test]
fn idle_ticks_do_not_connect() {
    let listener = listen();
    let _fixture = start(listener.local_addr().unwrap(), 16);

    thread::sleep(INTERVAL * 3);
    assert_eq!(
        listener.accept().map_err(|e| e.kind()).err(),
        Some(ErrorKind::WouldBlock)
    );
}

#[test]
fn samples_survive_an_unreachable_collector() {
    // Reserve a port, then close it so connects are refused
    let addr = listen().local_addr().unwrap();
    let fixture = start(addr, 16);

    fixture.emitter.push_u64("a", 1);
    fixture.emitter.push_u64("b", 2);
    thread::sleep(INTERVAL * 2 + INTERVAL / 2);
    assert_eq!(fixture.emitter.pending(), 2);

    let listener = TcpListener::bind(addr).unwrap();
    listener.set_nonblocking(true).unwrap();
    assert_eq!(
        collect(&listener, 2, Duration::from_secs(5)),
        [line("a", "1"), line("b", "2")]
    );
}

#[test]
fn flushed_samples_are_not_sent_again() {
    let listener = listen();
    let fixture = start(listener.local_addr().unwrap(), 16);

    fixture.emitter.push_u64("first", 1);
    assert_eq!(
        collect(&listener, 1, Duration::from_secs(5)),
        [line("first", "1")]
    );

    fixture.emitter.push_u64("second", 2);
    assert_eq!(
        collect(&listener, 2, Duration::from_secs(2)),
        [line("second", "2")]
    );
}

#[test]
fn construction_errors() {
    assert!(matches!(
        Emitter::new("no port here", INTERVAL, "app", 16),
        Err(EmitterError::Resolve { .. })
    ));
    assert!(matches!(
        Emitter::new("127.0.0.1:2003", Duration::ZERO, "app", 16),
        Err(EmitterError::InvalidInterval)
    ));
}

#[cfg(feature = "tokio")]
#[test]
fn building_outside_a_runtime_fails() {
    assert!(matches!(
        Emitter::new("127.0.0.1:2003", INTERVAL, "app", 16),
        Err(EmitterError::Runtime(_))
    ));
}
