/*

https://intronetworks.cs.luc.edu/current/html/reno.html

Reliable, ordered transfer of a single file over UDP. The sender (client) pushes the file to the
receiver (server) as a sequence of fixed-size packets. Datagrams may be dropped, duplicated or
reordered by the network; the receiver writes the file strictly in order regardless.

# Packets

Every datagram is exactly PACKET_SIZE bytes: a 22 byte header followed by a payload region of
PAYLOAD_SIZE bytes.

  seqnum   i64   index of the data chunk
  acknum   i64   next expected seqnum, or -1 on data packets
  last     u8    final data chunk / final acknowledgment
  ack      u8    control packet
  length   u32   valid payload bytes

The file is split into ceil(size / PAYLOAD_SIZE) chunks, at least one. Only the final chunk may be
short, and its length is how the receiver learns the exact file size.

# Receiver

The receiver accepts a data packet only if its seqnum is exactly the one expected next. Anything
else is discarded. Every data packet, accepted or not, is answered with a cumulative ACK naming the
next expected seqnum:

  expected = 3

  recv 3 -> accept, ack 4
  recv 5 -> reject, ack 4
  recv 4 -> accept, ack 5
  recv 4 -> reject, ack 5

Once the packet marked `last` has been accepted, every ACK carries `last`. The receiver then waits
out a short grace period, answering retransmissions, and terminates once the grace period passes
with no packet.

# Sender window

            base    next    base+cwnd
            v       v       v
 -----------########________--------> packet indices

The sender keeps at most floor(cwnd) packets in flight. cwnd is clamped so that base+cwnd never
reaches past the final packet. When cwnd shrinks on leaving fast recovery, next is pulled back
to base+floor(cwnd) and the packets beyond it are sent again.

An ACK beyond base advances base and grows the window:

  slow start:            cwnd <- cwnd + 1       (leaves slow start once cwnd + 1 > ssthresh)
  congestion avoidance:  cwnd <- cwnd + 1/cwnd
  fast recovery:         cwnd <- ssthresh       (back to congestion avoidance)

An ACK equal to the previous one is a duplicate. In fast recovery each duplicate inflates cwnd by
one. The third duplicate triggers fast retransmit: next is rewound to base, and

  slow start:            enter fast recovery
  congestion avoidance:  ssthresh <- cwnd/2, cwnd <- ssthresh + 3, enter fast recovery
  fast recovery:         nothing further

Any other ACK is remembered as the value future duplicates are compared against.

# Retransmission timeout

A single timer is rearmed whenever the base packet is (re)sent and whenever an ACK arrives. If it
goes longer than the RTO without being rearmed, the whole window is resent from base:

  ssthresh <- cwnd/2, cwnd <- 1, enter slow start

The timer is also the only thing that recovers a lost final ACK: the sender resends the last
packet, and the finished receiver answers it with another final ACK.

# Event loop

Both peers run a single-threaded polling loop. Each sender tick transmits what the window allows,
waits (bounded) for one ACK, drains whatever else has already arrived, checks the timer, and idles
briefly. The receiver blocks (bounded) for one packet at a time.

*/

pub mod error;
pub mod file;
pub mod frame;
pub mod host;
pub mod receiver;
pub mod sender;
pub mod sim;
pub mod socket;
mod timer;

pub use error::{Error, Result};

pub type Sender<S, L> = sender::Sender<S, L>;
pub type Receiver<K, L> = receiver::Receiver<K, L>;
