// This implementation of TCP-Reno-like congestion control has been informed by:
// https://intronetworks.cs.luc.edu/current/html/reno.html
//
// The window is measured in packets rather than bytes, since every data packet carries a
// bounded, mostly-full payload.

pub const INITIAL_CWND: f64 = 1.0;

/// Number of duplicate acknowledgments which signal a lost packet.
pub const DUP_ACK_THRESHOLD: u32 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    SlowStart,
    CongestionAvoidance,
    FastRecovery,
}

#[derive(Debug)]
pub struct AimdReno {
    mode: Mode,
    cwnd: f64,
    ssthresh: u64,
}

impl AimdReno {
    pub fn new(initial_ssthresh: u64) -> Self {
        Self {
            mode: Mode::SlowStart,
            cwnd: INITIAL_CWND,
            ssthresh: initial_ssthresh,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cwnd(&self) -> f64 {
        self.cwnd
    }

    pub fn ssthresh(&self) -> u64 {
        self.ssthresh
    }

    /// Limits cwnd to `limit` packets, but never below one packet.
    pub fn clamp(&mut self, limit: u64) {
        let limit = (limit as f64).max(INITIAL_CWND);

        if self.cwnd > limit {
            self.cwnd = limit;
        }
    }

    fn halve_ssthresh(&mut self) {
        self.ssthresh = (self.cwnd / 2.0) as u64;
    }

    /// Called when an acknowledgment advances the window.
    pub fn handle_ack(&mut self) {
        match self.mode {
            Mode::SlowStart => {
                // Double cwnd each RTT, leaving slow start once ssthresh would be passed [19.2.2]
                if self.cwnd + 1.0 > self.ssthresh as f64 {
                    self.mode = Mode::CongestionAvoidance;
                }
                self.cwnd += 1.0;
            }
            Mode::CongestionAvoidance => {
                // One packet per RTT [19.2.1]
                self.cwnd += 1.0 / self.cwnd;
            }
            Mode::FastRecovery => {
                // Deflate the window now that the retransmission has been acknowledged [19.4]
                self.mode = Mode::CongestionAvoidance;
                self.cwnd = (self.ssthresh as f64).max(INITIAL_CWND);
            }
        }
    }

    /// Called for every duplicate acknowledgment, before the duplicate threshold is checked.
    pub fn handle_dup_ack(&mut self) {
        if self.mode == Mode::FastRecovery {
            // Each duplicate means another packet has left the network
            self.cwnd += 1.0;
        }
    }

    /// Called when the duplicate acknowledgment threshold has been reached.
    pub fn handle_drop(&mut self) {
        match self.mode {
            Mode::SlowStart => {
                self.mode = Mode::FastRecovery;
            }
            Mode::CongestionAvoidance => {
                // Halve, then inflate for the packets known to have left the network
                self.halve_ssthresh();
                self.cwnd = self.ssthresh as f64 + DUP_ACK_THRESHOLD as f64;
                self.mode = Mode::FastRecovery;
            }
            Mode::FastRecovery => {}
        }
    }

    /// Called when the retransmission timer expires. The pipe has drained, so start over.
    pub fn handle_timeout(&mut self) {
        self.halve_ssthresh();
        self.cwnd = INITIAL_CWND;
        self.mode = Mode::SlowStart;
    }
}
