//! A `log` sink for tests that keeps records per thread, so tests running in parallel only see
//! what they logged themselves.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::{
    sync::{Mutex, Once, PoisonError},
    thread::{self, ThreadId},
};

static RECORDS: Mutex<Vec<(ThreadId, Level, String)>> = Mutex::new(Vec::new());
static LOGGER: Capture = Capture;
static INSTALL: Once = Once::new();

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((thread::current().id(), record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

/// Records logged on the thread that created it.
pub struct Captured {
    thread: ThreadId,
}

pub fn capture() -> Captured {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    Captured {
        thread: thread::current().id(),
    }
}

impl Captured {
    pub fn at(&self, level: Level) -> Vec<String> {
        RECORDS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(thread, logged, _)| *thread == self.thread && *logged == level)
            .map(|(_, _, message)| message.clone())
            .collect()
    }
}
