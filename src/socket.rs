use std::io;
use std::net;
use std::time;

use super::error::{Error, Result};
use super::frame::PACKET_SIZE;
use super::host::Link;

const SOCKET_POLLING_KEY: usize = 0;

/// A non-blocking UDP socket bound to a local address and paired with a single peer.
pub struct Socket {
    socket: net::UdpSocket,
    // Cached from socket initialization
    local_addr: net::SocketAddr,
    peer_addr: net::SocketAddr,
    // Polling objects
    poller: polling::Poller,
    poller_events: polling::Events,
    // Always-allocated receive buffer, one byte longer than a packet so that oversized
    // datagrams arrive with a detectably wrong length instead of being truncated to fit
    recv_buffer: Box<[u8]>,
}

impl Socket {
    /// Binds to `bind_address` and sends all datagrams to `peer_address`. Datagrams from any
    /// source are accepted.
    pub fn bind<A, B>(bind_address: A, peer_address: B) -> Result<Self>
    where
        A: net::ToSocketAddrs + std::fmt::Debug,
        B: net::ToSocketAddrs + std::fmt::Debug,
    {
        let bind_err = |source| Error::Bind {
            addr: format!("{:?}", bind_address),
            source,
        };

        let peer_addr = peer_address
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| Error::Resolve(format!("{:?}", peer_address)))?;

        let socket = net::UdpSocket::bind(&bind_address).map_err(bind_err)?;
        socket.set_nonblocking(true).map_err(bind_err)?;

        let local_addr = socket.local_addr().map_err(bind_err)?;

        let poller = polling::Poller::new().map_err(bind_err)?;

        unsafe {
            poller
                .add(&socket, polling::Event::readable(SOCKET_POLLING_KEY))
                .map_err(bind_err)?;
        }

        log::debug!("bound {} -> {}", local_addr, peer_addr);

        Ok(Self {
            socket,
            local_addr,
            peer_addr,
            poller,
            poller_events: polling::Events::new(),
            recv_buffer: vec![0; PACKET_SIZE + 1].into_boxed_slice(),
        })
    }

    pub fn local_addr(&self) -> net::SocketAddr {
        self.local_addr
    }

    pub fn peer_addr(&self) -> net::SocketAddr {
        self.peer_addr
    }

    /// If a datagram can be read from the socket, returns it. Returns Ok(None) otherwise.
    fn try_read_datagram(&mut self) -> io::Result<Option<&[u8]>> {
        match self.socket.recv_from(&mut self.recv_buffer) {
            Ok((len, _sender_addr)) => Ok(Some(&self.recv_buffer[..len])),
            Err(err) => match err.kind() {
                // The only acceptable error is WouldBlock, indicating no datagram
                io::ErrorKind::WouldBlock => Ok(None),
                _ => Err(err),
            },
        }
    }
}

impl Link for Socket {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        self.socket.send_to(datagram, self.peer_addr).map(|_| ())
    }

    /// Returns Ok(None) if no datagram could be read in the alloted time, or if polling awoke
    /// spuriously.
    fn receive_within(&mut self, timeout: time::Duration) -> io::Result<Option<&[u8]>> {
        // Wait for a readable event (must be done prior to each wait() call)
        self.poller
            .modify(&self.socket, polling::Event::readable(SOCKET_POLLING_KEY))?;

        self.poller_events.clear();

        let n = self.poller.wait(&mut self.poller_events, Some(timeout))?;

        if n > 0 {
            // The socket is readable - read in confidence
            self.try_read_datagram()
        } else {
            Ok(None)
        }
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        let _ = self.poller.delete(&self.socket);
    }
}
