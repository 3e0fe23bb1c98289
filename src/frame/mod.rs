pub mod serial;

/// Size of the fixed packet header: seqnum (8) + acknum (8) + last (1) + ack (1) + length (4).
pub const HEADER_SIZE: usize = 8 + 8 + 1 + 1 + 4;

/// Capacity of the payload region carried by every packet.
pub const PAYLOAD_SIZE: usize = 1024;

/// Every datagram on the wire is exactly this many bytes.
pub const PACKET_SIZE: usize = HEADER_SIZE + PAYLOAD_SIZE;

/// Acknowledgment number carried by packets which do not acknowledge anything.
pub const NO_ACK: i64 = -1;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("datagram is {actual} bytes, expected {expected}")]
    Size { expected: usize, actual: usize },
    #[error("length field {length} exceeds payload capacity {capacity}")]
    Length { length: u32, capacity: usize },
}

/// The only unit exchanged between sender and receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub seqnum: i64,
    pub acknum: i64,
    pub last: bool,
    pub ack: bool,
    length: u32,
    payload: Box<[u8]>,
}

impl Packet {
    /// Panics if `data` does not fit within [`PAYLOAD_SIZE`].
    pub fn new(seqnum: i64, acknum: i64, last: bool, ack: bool, data: &[u8]) -> Self {
        assert!(data.len() <= PAYLOAD_SIZE, "payload exceeds packet capacity");

        let mut payload = vec![0; PAYLOAD_SIZE].into_boxed_slice();
        payload[..data.len()].copy_from_slice(data);

        Self {
            seqnum,
            acknum,
            last,
            ack,
            length: data.len() as u32,
            payload,
        }
    }

    /// A data packet carrying chunk `seqnum` of the file.
    pub fn data(seqnum: i64, last: bool, data: &[u8]) -> Self {
        Self::new(seqnum, NO_ACK, last, false, data)
    }

    /// A cumulative acknowledgment naming the next expected sequence number.
    pub fn ack_for(acknum: i64, last: bool) -> Self {
        Self::new(0, acknum, last, true, &[])
    }

    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// The valid portion of the payload buffer.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.length as usize]
    }
}
