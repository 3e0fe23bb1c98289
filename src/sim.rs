//! In-memory datagram network with fault injection.
//!
//! [`pair`] returns two connected [`SimLink`] endpoints. Each direction independently drops,
//! duplicates and reorders datagrams according to a [`SimConfig`], driven by a seeded RNG so that
//! a failing run can be reproduced.

use std::io;
use std::sync::mpsc;
use std::time;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::host::Link;

/// Fault model for one direction of a simulated link. Probabilities are in `[0.0, 1.0]`.
#[derive(Clone, Debug, Default)]
pub struct SimConfig {
    /// Probability that a datagram is silently dropped.
    pub loss_rate: f64,
    /// Probability that a delivered datagram is delivered twice.
    pub duplicate_rate: f64,
    /// Probability that a datagram is held back and delivered after the next one.
    pub reorder_rate: f64,
}

impl SimConfig {
    fn validate(&self) {
        for (name, p) in [
            ("loss_rate", self.loss_rate),
            ("duplicate_rate", self.duplicate_rate),
            ("reorder_rate", self.reorder_rate),
        ] {
            assert!(
                (0.0..=1.0).contains(&p),
                "invalid simulator configuration: {} not in [0, 1]",
                name
            );
        }
    }
}

/// Counts of what the simulator did to outbound datagrams.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SimStats {
    pub sent: u64,
    pub dropped: u64,
    pub duplicated: u64,
    pub reordered: u64,
}

pub struct SimLink {
    config: SimConfig,
    rng: StdRng,
    tx: mpsc::Sender<Box<[u8]>>,
    rx: mpsc::Receiver<Box<[u8]>>,
    // Datagram waiting to be overtaken
    held: Option<Box<[u8]>>,
    // Most recently received datagram, lent out by receive_within
    current: Option<Box<[u8]>>,
    stats: SimStats,
}

/// Creates two connected links. `a_to_b` governs datagrams sent by the first link, `b_to_a`
/// those sent by the second.
pub fn pair(a_to_b: SimConfig, b_to_a: SimConfig, seed: u64) -> (SimLink, SimLink) {
    a_to_b.validate();
    b_to_a.validate();

    let (tx_ab, rx_ab) = mpsc::channel();
    let (tx_ba, rx_ba) = mpsc::channel();

    let a = SimLink::new(a_to_b, StdRng::seed_from_u64(seed), tx_ab, rx_ba);
    let b = SimLink::new(b_to_a, StdRng::seed_from_u64(seed ^ 0x5EED), tx_ba, rx_ab);

    (a, b)
}

impl SimLink {
    fn new(
        config: SimConfig,
        rng: StdRng,
        tx: mpsc::Sender<Box<[u8]>>,
        rx: mpsc::Receiver<Box<[u8]>>,
    ) -> Self {
        Self {
            config,
            rng,
            tx,
            rx,
            held: None,
            current: None,
            stats: Default::default(),
        }
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    fn deliver(&mut self, datagram: Box<[u8]>) {
        // The peer may already be gone, which looks like loss from here
        let _ = self.tx.send(datagram);
    }
}

impl Link for SimLink {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        self.stats.sent += 1;

        if self.rng.gen_bool(self.config.loss_rate) {
            self.stats.dropped += 1;
            return Ok(());
        }

        let datagram: Box<[u8]> = datagram.into();

        if self.held.is_none() && self.rng.gen_bool(self.config.reorder_rate) {
            self.stats.reordered += 1;
            self.held = Some(datagram);
            return Ok(());
        }

        if self.rng.gen_bool(self.config.duplicate_rate) {
            self.stats.duplicated += 1;
            self.deliver(datagram.clone());
        }

        self.deliver(datagram);

        if let Some(held) = self.held.take() {
            self.deliver(held);
        }

        Ok(())
    }

    fn receive_within(&mut self, timeout: time::Duration) -> io::Result<Option<&[u8]>> {
        let received = if timeout.is_zero() {
            self.rx.try_recv().ok()
        } else {
            self.rx.recv_timeout(timeout).ok()
        };

        self.current = received;

        Ok(self.current.as_deref())
    }
}
