//! Shared helpers for the integration suites

#![allow(dead_code)]

use gamehall::games::{RandomSource, RngProvider};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct Script {
    percents: VecDeque<f64>,
    integers: VecDeque<u32>,
    fallback: StdRng,
}

/// Randomness provider that replays queued draws, then falls back to a seeded `StdRng`.
///
/// Clones share one script, so the copy handed to `SessionManager` can be fed
/// from the test body.
#[derive(Clone)]
pub struct ScriptedRandom {
    script: Arc<Mutex<Script>>,
}

impl ScriptedRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                percents: VecDeque::new(),
                integers: VecDeque::new(),
                fallback: StdRng::seed_from_u64(seed),
            })),
        }
    }

    pub fn push_percent(&self, value: f64) -> &Self {
        self.script.lock().unwrap().percents.push_back(value);
        self
    }

    pub fn push_integers(&self, values: &[u32]) -> &Self {
        self.script
            .lock()
            .unwrap()
            .integers
            .extend(values.iter().copied());
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn percent(&mut self) -> f64 {
        let mut script = self.script.lock().unwrap();
        match script.percents.pop_front() {
            Some(value) => value,
            None => script.fallback.gen_range(0.0..100.0),
        }
    }

    fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        let mut script = self.script.lock().unwrap();
        match script.integers.pop_front() {
            Some(value) if (lo..=hi).contains(&value) => value,
            Some(value) => lo + value % (hi - lo + 1),
            None => script.fallback.gen_range(lo..=hi),
        }
    }
}

impl RngProvider for ScriptedRandom {
    fn source(&self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}
