use std::time;

use super::error::{Error, Result};
use super::frame::Packet;
use super::host::{Link, Sink};

mod sequencer;

pub use sequencer::{AckDecision, Sequencer};

const POLL_DEFAULT_MS: u64 = 1_000;
const POLL_MIN_MS: u64 = 1;

const GRACE_DEFAULT_MS: u64 = 10;

/// Configuration for a [`Receiver`] session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Longest single wait for an inbound packet before the loop comes around again, in
    /// milliseconds.
    ///
    /// Minimum value: 1 \
    /// Default value: 1,000
    pub poll_ms: u64,

    /// How long to keep answering retransmissions after the final packet has been accepted, in
    /// milliseconds. The session ends once a wait of this length sees no packet.
    ///
    /// Default value: 10
    pub grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_ms: POLL_DEFAULT_MS,
            grace_ms: GRACE_DEFAULT_MS,
        }
    }
}

impl Config {
    fn validate(&self) {
        assert!(
            self.poll_ms >= POLL_MIN_MS,
            "invalid receiver configuration: poll_ms < {}",
            POLL_MIN_MS
        );
    }
}

/// Counters describing a finished (or ongoing) receive session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReceiveStats {
    pub packets_accepted: u64,
    pub packets_rejected: u64,
    pub packets_malformed: u64,
    pub bytes_written: u64,
}

/// Outcome of a single [`Receiver::step`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// The session is still waiting for data.
    Receiving,
    /// The final packet was accepted and the grace period passed quietly.
    Complete,
}

/// The receiving side of a transfer: accepts data packets strictly in order, appends their
/// payloads to a [`Sink`], and answers every packet with a cumulative acknowledgment.
pub struct Receiver<K, L> {
    config: Config,
    sink: K,
    link: L,
    sequencer: Sequencer,
    stats: ReceiveStats,
}

impl<K, L> Receiver<K, L>
where
    K: Sink,
    L: Link,
{
    pub fn new(sink: K, link: L) -> Self {
        Self::new_with_config(sink, link, Default::default())
    }

    pub fn new_with_config(sink: K, link: L, config: Config) -> Self {
        config.validate();

        Self {
            config,
            sink,
            link,
            sequencer: Sequencer::new(),
            stats: Default::default(),
        }
    }

    pub fn stats(&self) -> ReceiveStats {
        self.stats
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Waits (bounded) for one packet and handles it.
    pub fn step(&mut self) -> Result<Status> {
        let finished = self.sequencer.is_finished();

        let wait_ms = if finished {
            self.config.grace_ms
        } else {
            self.config.poll_ms
        };

        let packet = match self
            .link
            .receive_within(time::Duration::from_millis(wait_ms))
        {
            Ok(Some(bytes)) => Packet::decode(bytes),
            Ok(None) => {
                if finished {
                    return Ok(Status::Complete);
                }
                return Ok(Status::Receiving);
            }
            Err(err) => {
                log::warn!("receive failed: {}", err);
                return Ok(Status::Receiving);
            }
        };

        match packet {
            Ok(packet) => self.handle_packet(&packet)?,
            Err(err) => {
                self.stats.packets_malformed += 1;
                log::debug!("dropping malformed datagram: {}", err);
            }
        }

        Ok(Status::Receiving)
    }

    fn handle_packet(&mut self, packet: &Packet) -> Result<()> {
        if packet.ack {
            log::debug!("ignoring control packet");
            return Ok(());
        }

        let decision = self.sequencer.on_data_packet(packet);

        if decision.accepted {
            self.sink.append(packet.payload()).map_err(Error::Sink)?;

            self.stats.packets_accepted += 1;
            self.stats.bytes_written += packet.length() as u64;

            log::trace!("accepted #{} ({} bytes)", packet.seqnum, packet.length());

            if decision.ack.last {
                self.sink.finish().map_err(Error::Sink)?;
            }
        } else {
            self.stats.packets_rejected += 1;

            log::trace!(
                "rejected #{}, expecting #{}",
                packet.seqnum,
                self.sequencer.expected_seqnum()
            );
        }

        if let Err(err) = self.link.send(&decision.ack.encode()) {
            log::warn!("failed to send ack {}: {}", decision.ack.acknum, err);
        }

        Ok(())
    }

    /// Runs the session to completion and returns the sink along with final statistics.
    pub fn run(mut self) -> Result<(K, ReceiveStats)> {
        while self.step()? == Status::Receiving {}

        log::info!(
            "received {} bytes in {} packets ({} rejected)",
            self.stats.bytes_written,
            self.stats.packets_accepted,
            self.stats.packets_rejected
        );

        Ok((self.sink, self.stats))
    }
}
