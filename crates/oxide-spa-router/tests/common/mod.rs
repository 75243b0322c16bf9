#![allow(dead_code)]

use std::sync::Arc;

use oxide_spa_router::{sync_unit, unit, Handler, Request};
use parking_lot::Mutex;

/// Records which units ran, in order.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit that records `name` and continues.
    pub fn unit(&self, name: &'static str) -> Handler {
        let log = self.clone();
        sync_unit(move |_, _| {
            log.push(name);
            true
        })
    }

    /// Unit that records `name` and halts the chain.
    pub fn halting(&self, name: &'static str) -> Handler {
        let log = self.clone();
        sync_unit(move |_, _| {
            log.push(name);
            false
        })
    }

    pub fn push(&self, name: &str) {
        self.0.lock().push(name.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Slot filled with the request seen by a capturing unit.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<Request>>>);

impl Captured {
    pub fn new() -> Self {
        Self::default()
    }

    /// Async unit that stores a copy of the request and continues.
    pub fn unit(&self) -> Handler {
        let slot = self.clone();
        unit(move |_, req| {
            let slot = slot.clone();
            async move {
                slot.0.lock().push(req.clone());
                req.proceed()
            }
        })
    }

    pub fn last(&self) -> Request {
        self.0
            .lock()
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("no request was captured"))
    }

    pub fn all(&self) -> Vec<Request> {
        self.0.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().len()
    }
}
