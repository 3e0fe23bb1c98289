use std::thread;
use std::time;

use super::error::{Error, Result};
use super::frame::{Packet, PAYLOAD_SIZE};
use super::host::{Link, Source};
use super::timer::RetransmitTimer;

pub mod cc;
mod window;

pub use cc::Mode;
pub use window::{AckOutcome, SendWindow};

const RTO_DEFAULT_MS: u64 = 108;
const RTO_MIN_MS: u64 = 1;

const ACK_WAIT_DEFAULT_MS: u64 = 45;

const TICK_INTERVAL_DEFAULT_US: u64 = 14_600;

const INITIAL_SSTHRESH_DEFAULT: u64 = 1_000_000;

/// Configuration for a [`Sender`] session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Time without acknowledgment after which the whole window is resent, in milliseconds.
    ///
    /// Minimum value: 1 \
    /// Default value: 108
    pub rto_ms: u64,

    /// Longest wait for the first acknowledgment of each tick, in milliseconds. Further
    /// acknowledgments are only drained if they have already arrived.
    ///
    /// Default value: 45
    pub ack_wait_ms: u64,

    /// Idle time at the end of each tick, in microseconds.
    ///
    /// Default value: 14,600
    pub tick_interval_us: u64,

    /// Slow start threshold at the beginning of a transfer, in packets.
    ///
    /// Default value: 1,000,000
    pub initial_ssthresh: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rto_ms: RTO_DEFAULT_MS,
            ack_wait_ms: ACK_WAIT_DEFAULT_MS,
            tick_interval_us: TICK_INTERVAL_DEFAULT_US,
            initial_ssthresh: INITIAL_SSTHRESH_DEFAULT,
        }
    }
}

impl Config {
    fn validate(&self) {
        assert!(
            self.rto_ms >= RTO_MIN_MS,
            "invalid sender configuration: rto_ms < {}",
            RTO_MIN_MS
        );
    }
}

/// Counters describing a finished (or ongoing) send session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TransferStats {
    pub packets_sent: u64,
    pub retransmissions: u64,
    pub fast_retransmits: u64,
    pub timeouts: u64,
    pub acks_received: u64,
    pub duplicate_acks: u64,
}

/// Outcome of a single [`Sender::step`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Sending,
    /// The receiver acknowledged the final packet.
    Complete,
}

/// Number of packets needed to carry `len` bytes. An empty file still takes one (empty) packet,
/// so the receiver learns that the transfer is over.
pub fn packet_count(len: u64) -> u64 {
    let size = PAYLOAD_SIZE as u64;
    ((len + size - 1) / size).max(1)
}

/// The sending side of a transfer: reads a [`Source`] in packet-sized chunks and pushes them
/// through a [`Link`] under Reno congestion control until the final acknowledgment arrives.
pub struct Sender<S, L> {
    config: Config,
    source: S,
    link: L,
    // Timestamps are computed relative to this instant
    time_ref: time::Instant,
    window: SendWindow,
    rto_timer: RetransmitTimer,
    // One past the highest index ever sent
    sent_high: u64,
    stats: TransferStats,
    complete: bool,
}

impl<S, L> Sender<S, L>
where
    S: Source,
    L: Link,
{
    pub fn new(source: S, link: L) -> Self {
        Self::new_with_config(source, link, Default::default())
    }

    pub fn new_with_config(source: S, link: L, config: Config) -> Self {
        config.validate();

        let total = packet_count(source.len());

        log::debug!("sending {} bytes in {} packets", source.len(), total);

        Self {
            window: SendWindow::new(total, config.initial_ssthresh),
            rto_timer: RetransmitTimer::new(config.rto_ms, 0),
            config,
            source,
            link,
            time_ref: time::Instant::now(),
            sent_high: 0,
            stats: Default::default(),
            complete: false,
        }
    }

    /// Returns the number of whole milliseconds elapsed since the session was created.
    fn time_now_ms(&self) -> u64 {
        self.time_ref.elapsed().as_millis() as u64
    }

    pub fn window(&self) -> &SendWindow {
        &self.window
    }

    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    fn read_packet(&mut self, index: u64) -> Result<Packet> {
        let len = self.source.len();
        let offset = index * PAYLOAD_SIZE as u64;
        let chunk_len = (len - offset).min(PAYLOAD_SIZE as u64) as usize;
        let last = index + 1 == self.window.total();

        let mut buf = [0; PAYLOAD_SIZE];
        self.source
            .read_at(offset, &mut buf[..chunk_len])
            .map_err(Error::Source)?;

        Ok(Packet::data(index as i64, last, &buf[..chunk_len]))
    }

    fn send_eligible(&mut self) -> Result<()> {
        let count = self.window.eligible_send_count();

        for _ in 0..count {
            let index = self.window.next();
            let packet = self.read_packet(index)?;

            if let Err(err) = self.link.send(&packet.encode()) {
                // Loss is loss; the window will get it there eventually
                log::warn!("failed to send #{}: {}", index, err);
            }

            if self.window.on_transmit(index) {
                let now_ms = self.time_now_ms();
                self.rto_timer.rearm(now_ms);
            }

            self.stats.packets_sent += 1;
            if index < self.sent_high {
                self.stats.retransmissions += 1;
            } else {
                self.sent_high = index + 1;
            }

            log::trace!("sent #{}{}", index, if packet.last { " (last)" } else { "" });
        }

        Ok(())
    }

    fn handle_ack(&mut self, acknum: i64) {
        self.stats.acks_received += 1;

        match self.window.on_ack(acknum) {
            AckOutcome::Advanced(n) => {
                log::trace!(
                    "ack {} advanced {} ({:?}, cwnd {:.2})",
                    acknum,
                    n,
                    self.window.mode(),
                    self.window.cwnd()
                );
            }
            AckOutcome::Duplicate => {
                self.stats.duplicate_acks += 1;
            }
            AckOutcome::FastRetransmit => {
                self.stats.duplicate_acks += 1;
                self.stats.fast_retransmits += 1;

                log::debug!(
                    "fast retransmit from #{} (cwnd {:.2}, ssthresh {})",
                    self.window.base(),
                    self.window.cwnd(),
                    self.window.ssthresh()
                );
            }
            AckOutcome::Stale => {}
        }

        let now_ms = self.time_now_ms();
        self.rto_timer.rearm(now_ms);
    }

    /// Drains acknowledgments, waiting a bounded time for the first one. Returns true if the
    /// final acknowledgment was seen.
    fn drain_acks(&mut self) -> bool {
        let now_ms = self.time_now_ms();
        let first_wait_ms = self
            .config
            .ack_wait_ms
            .min(self.rto_timer.remaining_ms(now_ms));

        let mut wait = time::Duration::from_millis(first_wait_ms);

        loop {
            let packet = match self.link.receive_within(wait) {
                Ok(Some(bytes)) => Packet::decode(bytes),
                Ok(None) => return false,
                Err(err) => {
                    log::warn!("receive failed: {}", err);
                    return false;
                }
            };

            wait = time::Duration::ZERO;

            match packet {
                Ok(packet) if packet.ack => {
                    if packet.last {
                        return true;
                    }

                    self.handle_ack(packet.acknum);
                }
                Ok(_) => {
                    log::debug!("ignoring data packet");
                }
                Err(err) => {
                    log::debug!("dropping malformed datagram: {}", err);
                }
            }
        }
    }

    /// Runs one iteration of the send loop: transmit what the window allows, drain
    /// acknowledgments, check the retransmission timer, then idle briefly.
    pub fn step(&mut self) -> Result<Status> {
        if self.complete {
            return Ok(Status::Complete);
        }

        self.send_eligible()?;

        if self.drain_acks() {
            self.complete = true;
            return Ok(Status::Complete);
        }

        let now_ms = self.time_now_ms();

        if self.rto_timer.check_timeout(now_ms) {
            self.stats.timeouts += 1;

            log::debug!(
                "timeout at #{} (cwnd {:.2} -> 1)",
                self.window.base(),
                self.window.cwnd()
            );

            self.window.on_timeout();
            self.rto_timer.rearm(now_ms);
        }

        thread::sleep(time::Duration::from_micros(self.config.tick_interval_us));

        Ok(Status::Sending)
    }

    /// Runs the session until the receiver acknowledges the final packet.
    pub fn run(mut self) -> Result<TransferStats> {
        while self.step()? == Status::Sending {}

        log::info!(
            "sent {} packets in {} transmissions ({} fast retransmits, {} timeouts)",
            self.window.total(),
            self.stats.packets_sent,
            self.stats.fast_retransmits,
            self.stats.timeouts
        );

        Ok(self.stats)
    }
}
