//! Collaborators supplied by the host application: where file bytes come from, where they go,
//! and how datagrams move between the peers.

use std::io;
use std::time;

/// Random-access view of the file being sent.
pub trait Source {
    /// Total size of the file in bytes.
    fn len(&self) -> u64;

    /// Fills `buf` with the bytes starting at `offset`. Fails if the range extends past the end
    /// of the file.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

/// Sequential destination for received file bytes.
pub trait Sink {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Called once after the final byte has been appended.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A datagram path to a single peer.
pub trait Link {
    /// Sends one datagram to the peer. Failures are reported, never retried.
    fn send(&mut self, datagram: &[u8]) -> io::Result<()>;

    /// Blocks for up to `timeout` for an incoming datagram and returns it. Returns `Ok(None)` if
    /// nothing arrived in time. A zero timeout only returns datagrams that are already waiting.
    fn receive_within(&mut self, timeout: time::Duration) -> io::Result<Option<&[u8]>>;
}

impl Source for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = usize::try_from(offset).map_err(|_| io::ErrorKind::UnexpectedEof)?;
        let end = start + buf.len();

        if end > self.as_slice().len() {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        buf.copy_from_slice(&self[start..end]);

        Ok(())
    }
}

impl Sink for Vec<u8> {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}
