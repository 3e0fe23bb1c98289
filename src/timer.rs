/// Polled retransmission timer. Times are whole milliseconds relative to the owning session's
/// reference instant.
#[derive(Debug)]
pub struct RetransmitTimer {
    timeout_ms: u64,
    armed_at_ms: u64,
}

impl RetransmitTimer {
    pub fn new(timeout_ms: u64, now_ms: u64) -> Self {
        Self {
            timeout_ms,
            armed_at_ms: now_ms,
        }
    }

    pub fn rearm(&mut self, now_ms: u64) {
        self.armed_at_ms = now_ms;
    }

    /// Returns true once strictly more than the timeout has elapsed since the last rearm.
    pub fn check_timeout(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.armed_at_ms) > self.timeout_ms
    }

    /// Time remaining until the timer would fire.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.armed_at_ms + self.timeout_ms).saturating_sub(now_ms)
    }
}
