use super::*;

pub struct Reader<'a> {
    buffer: &'a [u8],
    bytes_read: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut bytes = [0; N];
        bytes.copy_from_slice(&self.buffer[self.bytes_read..self.bytes_read + N]);
        self.bytes_read += N;
        bytes
    }

    pub fn read_u8(&mut self) -> u8 {
        let [value] = self.take::<1>();
        value
    }

    pub fn read_u32(&mut self) -> u32 {
        u32::from_be_bytes(self.take())
    }

    pub fn read_i64(&mut self) -> i64 {
        i64::from_be_bytes(self.take())
    }

    pub fn read_slice(&mut self, len: usize) -> &'a [u8] {
        let slice = &self.buffer[self.bytes_read..self.bytes_read + len];
        self.bytes_read += len;
        slice
    }
}

pub struct Writer<'a> {
    buffer: &'a mut [u8],
    bytes_written: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buffer[self.bytes_written..self.bytes_written + bytes.len()].copy_from_slice(bytes);
        self.bytes_written += bytes.len();
    }

    pub fn write_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.put(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.put(&value.to_be_bytes());
    }

    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.put(bytes);
    }
}

impl Packet {
    /// Writes this packet into `buffer`, which must be exactly [`PACKET_SIZE`] bytes long. The
    /// unused tail of the payload region is zeroed.
    pub fn write(&self, buffer: &mut [u8]) {
        assert_eq!(buffer.len(), PACKET_SIZE, "packet buffer has the wrong size");

        let wr = &mut Writer::new(buffer);

        wr.write_i64(self.seqnum);
        wr.write_i64(self.acknum);
        wr.write_u8(self.last as u8);
        wr.write_u8(self.ack as u8);
        wr.write_u32(self.length);

        debug_assert_eq!(wr.bytes_written(), HEADER_SIZE);

        wr.write_slice(self.payload());
        wr.write_slice(&ZERO_PAYLOAD[self.length as usize..]);

        debug_assert_eq!(wr.bytes_written(), PACKET_SIZE);
    }

    /// Encodes this packet into a newly allocated fixed-size datagram.
    pub fn encode(&self) -> Box<[u8]> {
        let mut buffer = vec![0; PACKET_SIZE].into_boxed_slice();
        self.write(&mut buffer);
        buffer
    }

    /// Decodes a datagram. Only sizes are validated: the datagram must be exactly
    /// [`PACKET_SIZE`] bytes and the length field may not exceed [`PAYLOAD_SIZE`]. Bytes past
    /// `HEADER_SIZE + length` are never read.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != PACKET_SIZE {
            return Err(DecodeError::Size {
                expected: PACKET_SIZE,
                actual: bytes.len(),
            });
        }

        let rd = &mut Reader::new(bytes);

        let seqnum = rd.read_i64();
        let acknum = rd.read_i64();
        let last = rd.read_u8() != 0;
        let ack = rd.read_u8() != 0;
        let length = rd.read_u32();

        debug_assert_eq!(rd.bytes_read(), HEADER_SIZE);

        if length as usize > PAYLOAD_SIZE {
            return Err(DecodeError::Length {
                length,
                capacity: PAYLOAD_SIZE,
            });
        }

        let data = rd.read_slice(length as usize);

        Ok(Packet::new(seqnum, acknum, last, ack, data))
    }
}

static ZERO_PAYLOAD: [u8; PAYLOAD_SIZE] = [0; PAYLOAD_SIZE];
