//            base    next    base+cwnd
//            v       v       v
// -----------########________--------> packet indices
//
// #: in transit
// _: sendable

use super::cc::{self, AimdReno, Mode};

/// What an acknowledgment did to the window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AckOutcome {
    /// The window advanced by this many packets.
    Advanced(u64),
    /// A duplicate of the previous acknowledgment, below the retransmit threshold.
    Duplicate,
    /// The duplicate threshold was reached and the window was rewound to its base.
    FastRetransmit,
    /// An old or out-of-order acknowledgment, remembered for duplicate detection.
    Stale,
}

pub struct SendWindow {
    base: u64,
    next: u64,
    total: u64,

    dup_count: u32,
    last_dup_ack: i64,

    cc: AimdReno,
}

impl SendWindow {
    pub fn new(total: u64, initial_ssthresh: u64) -> Self {
        Self {
            base: 0,
            next: 0,
            total,

            dup_count: 0,
            last_dup_ack: crate::frame::NO_ACK,

            cc: AimdReno::new(initial_ssthresh),
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn next(&self) -> u64 {
        self.next
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn in_flight(&self) -> u64 {
        self.next - self.base
    }

    pub fn cwnd(&self) -> f64 {
        self.cc.cwnd()
    }

    pub fn ssthresh(&self) -> u64 {
        self.cc.ssthresh()
    }

    pub fn mode(&self) -> Mode {
        self.cc.mode()
    }

    pub fn dup_count(&self) -> u32 {
        self.dup_count
    }

    /// Returns the number of packets which may be transmitted right now. The congestion window
    /// is first clamped so that it cannot reach past the final packet.
    pub fn eligible_send_count(&mut self) -> u64 {
        self.cc.clamp(self.total - self.base);

        let window = (self.cc.cwnd() as u64).min(self.total);

        window.saturating_sub(self.in_flight())
    }

    /// Marks packet `index` as sent. Returns true if it was the window base, in which case the
    /// retransmission timer should be rearmed.
    pub fn on_transmit(&mut self, index: u64) -> bool {
        debug_assert_eq!(index, self.next);
        debug_assert!(self.next < self.total);

        self.next = index + 1;

        index == self.base
    }

    pub fn on_ack(&mut self, acknum: i64) -> AckOutcome {
        let outcome = if acknum > self.base as i64 && acknum as u64 <= self.total {
            let delta = acknum as u64 - self.base;

            self.base = acknum as u64;
            self.dup_count = 0;
            // The fresh ACK is the one whose repeats would signal the next drop
            self.last_dup_ack = acknum;

            self.cc.handle_ack();

            AckOutcome::Advanced(delta)
        } else if acknum == self.last_dup_ack {
            self.cc.handle_dup_ack();

            self.dup_count += 1;

            if self.dup_count == cc::DUP_ACK_THRESHOLD {
                self.next = self.base;
                self.dup_count = 0;

                self.cc.handle_drop();

                AckOutcome::FastRetransmit
            } else {
                AckOutcome::Duplicate
            }
        } else {
            self.last_dup_ack = acknum;

            AckOutcome::Stale
        };

        if self.next < self.base {
            self.next = self.base;
        }

        // Leaving fast recovery shrinks cwnd below what was sent under the inflated window;
        // anything past the new edge goes out again once the window reopens
        let edge = self.base + self.cc.cwnd() as u64;
        if self.next > edge {
            self.next = edge;
        }

        outcome
    }

    /// Collapses the window and rewinds to the oldest unacknowledged packet.
    pub fn on_timeout(&mut self) {
        self.next = self.base;
        self.dup_count = 0;

        self.cc.handle_timeout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SSTHRESH: u64 = 1_000_000;

    fn send_all(window: &mut SendWindow) -> Vec<u64> {
        let mut sent = Vec::new();
        for _ in 0..window.eligible_send_count() {
            let index = window.next();
            window.on_transmit(index);
            sent.push(index);
        }
        sent
    }

    #[test]
    fn slow_start_growth() {
        let mut window = SendWindow::new(100, SSTHRESH);

        assert_eq!(send_all(&mut window), vec![0]);
        assert_eq!(window.eligible_send_count(), 0);

        assert_eq!(window.on_ack(1), AckOutcome::Advanced(1));
        assert_eq!(window.cwnd(), 2.0);
        assert_eq!(send_all(&mut window), vec![1, 2]);

        assert_eq!(window.on_ack(2), AckOutcome::Advanced(1));
        assert_eq!(window.on_ack(3), AckOutcome::Advanced(1));
        assert_eq!(window.cwnd(), 4.0);
        assert_eq!(send_all(&mut window), vec![3, 4, 5, 6]);
        assert_eq!(window.in_flight(), 4);
    }

    #[test]
    fn window_bound_holds() {
        let mut window = SendWindow::new(37, SSTHRESH);

        while window.base() < window.total() {
            send_all(&mut window);
            assert!(window.in_flight() as f64 <= window.cwnd());
            assert!(window.next() <= window.total());

            let acknum = (window.base() + 1) as i64;
            window.on_ack(acknum);
            assert!(window.base() <= window.next());
            assert!(window.cwnd() >= 1.0);
        }
    }

    #[test]
    fn clamped_to_file_size() {
        let mut window = SendWindow::new(3, SSTHRESH);

        for acknum in 1..=2 {
            send_all(&mut window);
            window.on_ack(acknum);
        }

        // cwnd would be 3, but only the final packet remains unacknowledged
        assert_eq!(window.eligible_send_count(), 0);
        assert_eq!(window.cwnd(), 1.0);
        assert_eq!(window.next(), 3);
    }

    #[test]
    fn fast_retransmit_in_congestion_avoidance() {
        let mut window = SendWindow::new(1000, 4);

        let mut acknum = 0;
        while window.mode() == Mode::SlowStart {
            send_all(&mut window);
            acknum += 1;
            window.on_ack(acknum);
        }

        // Grow to a round number of packets for the test
        window.cc = {
            let mut cc = AimdReno::new(0);
            cc.handle_ack();
            while cc.cwnd() < 10.0 {
                cc.handle_ack();
            }
            cc
        };
        let w = window.cwnd();
        send_all(&mut window);
        let next_before = window.next();

        assert_eq!(window.on_ack(acknum), AckOutcome::Duplicate);
        assert_eq!(window.on_ack(acknum), AckOutcome::Duplicate);
        assert_eq!(window.cwnd(), w);
        assert_eq!(window.next(), next_before);

        assert_eq!(window.on_ack(acknum), AckOutcome::FastRetransmit);
        assert_eq!(window.ssthresh(), (w / 2.0) as u64);
        assert_eq!(window.cwnd(), (w / 2.0) as u64 as f64 + 3.0);
        assert_eq!(window.mode(), Mode::FastRecovery);
        assert_eq!(window.next(), window.base());
        assert_eq!(window.dup_count(), 0);

        // Further duplicates inflate the window
        let inflated = window.cwnd();
        assert_eq!(window.on_ack(acknum), AckOutcome::Duplicate);
        assert_eq!(window.cwnd(), inflated + 1.0);

        // New data deflates it
        assert!(matches!(window.on_ack(acknum + 2), AckOutcome::Advanced(2)));
        assert_eq!(window.mode(), Mode::CongestionAvoidance);
        assert_eq!(window.cwnd(), window.ssthresh() as f64);
    }

    #[test]
    fn leaving_fast_recovery_keeps_window_bound() {
        let mut window = SendWindow::new(1000, 4);

        let mut acknum = 0;
        while window.mode() == Mode::SlowStart {
            send_all(&mut window);
            acknum += 1;
            window.on_ack(acknum);
        }
        send_all(&mut window);

        for _ in 0..3 {
            window.on_ack(acknum);
        }
        assert_eq!(window.mode(), Mode::FastRecovery);

        // Keep transmitting as duplicates inflate the window
        for _ in 0..10 {
            window.on_ack(acknum);
            send_all(&mut window);
            assert!(window.in_flight() as f64 <= window.cwnd());
        }
        let sent_up_to = window.next();
        assert!(window.in_flight() > window.ssthresh() + 1);

        assert_eq!(window.on_ack(acknum + 1), AckOutcome::Advanced(1));
        assert_eq!(window.mode(), Mode::CongestionAvoidance);
        assert_eq!(window.cwnd(), window.ssthresh() as f64);
        assert!(window.in_flight() as f64 <= window.cwnd());
        assert_eq!(window.next(), window.base() + window.ssthresh());
        assert_eq!(window.eligible_send_count(), 0);

        // An ACK covering the packets sent before deflation still advances past them
        assert!(matches!(window.on_ack(sent_up_to as i64), AckOutcome::Advanced(_)));
        assert_eq!(window.base(), sent_up_to);
        assert_eq!(window.next(), sent_up_to);
    }

    #[test]
    fn lost_packet_three() {
        let mut window = SendWindow::new(10, SSTHRESH);

        // Packets 0, 1, 2 are acknowledged in order
        for acknum in 1..=3 {
            send_all(&mut window);
            window.on_ack(acknum);
        }
        send_all(&mut window);
        assert_eq!(window.base(), 3);
        assert!(window.next() >= 7);

        // Packet 3 was lost; 4, 5, 6 each produce ACK(3)
        assert_eq!(window.on_ack(3), AckOutcome::Duplicate);
        assert_eq!(window.on_ack(3), AckOutcome::Duplicate);
        assert_eq!(window.on_ack(3), AckOutcome::FastRetransmit);
        assert_eq!(window.mode(), Mode::FastRecovery);

        // Packet 3 is next in line
        assert_eq!(window.next(), 3);
        assert!(window.eligible_send_count() > 0);
        assert_eq!(send_all(&mut window)[0], 3);
    }

    #[test]
    fn stale_acks_are_remembered() {
        let mut window = SendWindow::new(10, SSTHRESH);
        for acknum in 1..=4 {
            send_all(&mut window);
            window.on_ack(acknum);
        }

        assert_eq!(window.on_ack(2), AckOutcome::Stale);
        assert_eq!(window.on_ack(2), AckOutcome::Duplicate);
        assert_eq!(window.on_ack(1), AckOutcome::Stale);
        assert_eq!(window.base(), 4);
    }

    #[test]
    fn acks_past_the_end_are_ignored() {
        let mut window = SendWindow::new(4, SSTHRESH);
        send_all(&mut window);

        assert_eq!(window.on_ack(5), AckOutcome::Stale);
        assert_eq!(window.base(), 0);
    }

    #[test]
    fn timeout_rewinds_window() {
        let mut window = SendWindow::new(100, SSTHRESH);
        for acknum in 1..=5 {
            send_all(&mut window);
            window.on_ack(acknum);
        }
        send_all(&mut window);
        assert!(window.in_flight() > 1);

        let cwnd = window.cwnd();
        window.on_timeout();

        assert_eq!(window.next(), 5);
        assert_eq!(window.base(), 5);
        assert_eq!(window.cwnd(), 1.0);
        assert_eq!(window.ssthresh(), (cwnd / 2.0) as u64);
        assert_eq!(window.mode(), Mode::SlowStart);
        assert_eq!(send_all(&mut window), vec![5]);
    }

    #[test]
    fn late_ack_after_rewind() {
        let mut window = SendWindow::new(100, SSTHRESH);
        for acknum in 1..=3 {
            send_all(&mut window);
            window.on_ack(acknum);
        }
        send_all(&mut window);
        let sent_up_to = window.next();

        window.on_timeout();
        assert_eq!(window.next(), 3);

        // An ACK for data sent before the timeout still arrives
        window.on_ack(sent_up_to as i64);
        assert_eq!(window.base(), sent_up_to);
        assert_eq!(window.next(), sent_up_to);
    }
}
