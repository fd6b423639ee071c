//! Live capture: one bound UDP socket, one datagram per pull.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use f1_telemetry_protocol::PacketRegistry;
use tracing::{info, trace};

use crate::close::{CloseHandle, CloseSignal};
use crate::error::CaptureError;
use crate::source::PacketSource;

/// Port F1 25 sends telemetry to by default.
pub const DEFAULT_PORT: u16 = 20777;

/// `0.0.0.0:20777`.
pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT));

/// Receive buffer size; larger than any F1 25 packet.
pub const MAX_DATAGRAM_LEN: usize = 2048;

/// Receives raw datagrams from the game.
#[derive(Debug)]
pub struct LiveSource {
    socket: Option<UdpSocket>,
    local_addr: SocketAddr,
    buf: Box<[u8; MAX_DATAGRAM_LEN]>,
    registry: Arc<PacketRegistry>,
    close: CloseSignal,
    datagrams_received: u64,
    last_peer: Option<SocketAddr>,
}

impl LiveSource {
    /// Bind a blocking UDP socket on `addr`.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Bind`] if the address is unavailable.
    pub fn bind(addr: SocketAddr) -> Result<Self, CaptureError> {
        Self::bind_with_registry(addr, Arc::new(PacketRegistry::f1_25()))
    }

    /// As [`LiveSource::bind`], decoding with a shared registry.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Bind`] if the address is unavailable.
    pub fn bind_with_registry(
        addr: SocketAddr,
        registry: Arc<PacketRegistry>,
    ) -> Result<Self, CaptureError> {
        let socket = UdpSocket::bind(addr).map_err(|source| CaptureError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| CaptureError::Bind { addr, source })?;
        info!(%local_addr, port = local_addr.port(), "UDP telemetry socket bound");
        Ok(Self {
            socket: Some(socket),
            local_addr,
            buf: Box::new([0u8; MAX_DATAGRAM_LEN]),
            registry,
            close: CloseSignal::for_socket(local_addr),
            datagrams_received: 0,
            last_peer: None,
        })
    }

    /// Block until one datagram arrives and return its bytes.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Closed`] once closed, [`CaptureError::Timeout`] when a
    /// read timeout expires, [`CaptureError::Transport`] for socket failures.
    pub fn receive(&mut self) -> Result<&[u8], CaptureError> {
        self.close.check()?;
        let socket = self.socket.as_ref().ok_or(CaptureError::Closed)?;
        let (len, peer) = match socket.recv_from(self.buf.as_mut_slice()) {
            Ok(received) => received,
            Err(err) if is_timeout(&err) => return Err(CaptureError::Timeout),
            Err(err) => return Err(CaptureError::Transport(err)),
        };
        // The wake datagram from a CloseHandle lands here.
        self.close.check()?;

        self.datagrams_received += 1;
        self.last_peer = Some(peer);
        trace!(len, %peer, "datagram received");
        Ok(self.buf.get(..len).unwrap_or_default())
    }

    /// Read timeout for [`LiveSource::receive`]; `None` blocks forever.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Transport`] if the socket rejects the timeout (for
    /// example a zero duration), [`CaptureError::Closed`] once closed.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<(), CaptureError> {
        self.socket
            .as_ref()
            .ok_or(CaptureError::Closed)?
            .set_read_timeout(timeout)
            .map_err(CaptureError::Transport)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Sender of the most recent datagram.
    pub fn last_peer(&self) -> Option<SocketAddr> {
        self.last_peer
    }

    pub fn datagrams_received(&self) -> u64 {
        self.datagrams_received
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.handle()
    }

    /// Release the socket. Later pulls fail with [`CaptureError::Closed`].
    pub fn close(&mut self) {
        self.close.mark_closed();
        if self.socket.take().is_some() {
            info!(
                local_addr = %self.local_addr,
                datagrams = self.datagrams_received,
                "UDP telemetry socket closed"
            );
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

impl PacketSource for LiveSource {
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, CaptureError> {
        self.receive().map(Some)
    }

    fn registry(&self) -> &Arc<PacketRegistry> {
        &self.registry
    }

    fn close_handle(&self) -> CloseHandle {
        LiveSource::close_handle(self)
    }
}
