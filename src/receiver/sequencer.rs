use crate::frame::Packet;

/// Result of offering one data packet to the sequencer.
#[derive(Debug)]
pub struct AckDecision {
    /// True if the packet was the one expected next, and its payload should be persisted.
    pub accepted: bool,
    /// Acknowledgment to return to the sender.
    pub ack: Packet,
}

/// Accepts data packets strictly in sequence and produces cumulative acknowledgments.
pub struct Sequencer {
    expected_seqnum: i64,
    finished: bool,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            expected_seqnum: 0,
            finished: false,
        }
    }

    pub fn expected_seqnum(&self) -> i64 {
        self.expected_seqnum
    }

    /// True once the packet marked `last` has been accepted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn on_data_packet(&mut self, packet: &Packet) -> AckDecision {
        if packet.seqnum == self.expected_seqnum {
            self.expected_seqnum += 1;
            self.finished = packet.last;

            AckDecision {
                accepted: true,
                ack: Packet::ack_for(self.expected_seqnum, packet.last),
            }
        } else {
            // Reflect the current position. Once finished, this keeps answering retransmissions
            // of the final packet with a final ACK, in case the first one was lost.
            AckDecision {
                accepted: false,
                ack: Packet::ack_for(self.expected_seqnum, self.finished),
            }
        }
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn chunk(seqnum: i64, total: i64) -> Packet {
        let data = format!("chunk-{}", seqnum);
        Packet::data(seqnum, seqnum == total - 1, data.as_bytes())
    }

    #[test]
    fn in_order() {
        let mut seq = Sequencer::new();

        for i in 0..10 {
            let decision = seq.on_data_packet(&chunk(i, 10));
            assert!(decision.accepted);
            assert_eq!(decision.ack.acknum, i + 1);
            assert!(decision.ack.ack);
            assert_eq!(decision.ack.last, i == 9);
        }

        assert!(seq.is_finished());
        assert_eq!(seq.expected_seqnum(), 10);
    }

    #[test]
    fn rejects_gaps_and_duplicates() {
        let mut seq = Sequencer::new();

        assert!(seq.on_data_packet(&chunk(0, 10)).accepted);

        // Future packet
        let decision = seq.on_data_packet(&chunk(2, 10));
        assert!(!decision.accepted);
        assert_eq!(decision.ack.acknum, 1);
        assert!(!decision.ack.last);

        // Duplicate
        let decision = seq.on_data_packet(&chunk(0, 10));
        assert!(!decision.accepted);
        assert_eq!(decision.ack.acknum, 1);

        assert_eq!(seq.expected_seqnum(), 1);
    }

    #[test]
    fn final_ack_repeated_after_finish() {
        let mut seq = Sequencer::new();
        seq.on_data_packet(&chunk(0, 2));
        seq.on_data_packet(&chunk(1, 2));
        assert!(seq.is_finished());

        // Sender never saw the final ACK and resends the last packet
        let decision = seq.on_data_packet(&chunk(1, 2));
        assert!(!decision.accepted);
        assert_eq!(decision.ack.acknum, 2);
        assert!(decision.ack.last);
    }

    #[test]
    fn random_interleavings_deliver_in_order() {
        const TOTAL: i64 = 40;

        let mut rng = StdRng::seed_from_u64(0xACE);

        for _ in 0..50 {
            let mut seq = Sequencer::new();
            let mut delivered = Vec::new();

            // Keep offering shuffled, duplicated, partially dropped batches from the current
            // position until everything gets through
            while !seq.is_finished() {
                let base = seq.expected_seqnum();
                let mut batch: Vec<i64> = (base..TOTAL.min(base + 8))
                    .filter(|_| rng.gen_bool(0.7))
                    .collect();
                let dups: Vec<i64> = batch.iter().copied().filter(|_| rng.gen_bool(0.3)).collect();
                batch.extend(dups);
                batch.push(rng.gen_range(0..TOTAL));
                batch.shuffle(&mut rng);

                for seqnum in batch {
                    let packet = chunk(seqnum, TOTAL);
                    if seq.on_data_packet(&packet).accepted {
                        delivered.push(packet.seqnum);
                    }
                }
            }

            assert_eq!(delivered, (0..TOTAL).collect::<Vec<_>>());
        }
    }
}
