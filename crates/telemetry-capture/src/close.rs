//! Cross-thread cancellation of a blocked pull.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use tracing::debug;

use crate::error::CaptureError;

/// How a close request reaches a pull that is already blocked.
#[derive(Debug, Clone)]
enum Waker {
    /// Send a zero-length datagram to the source's own socket.
    Datagram(SocketAddr),
    /// Interrupt the replay pacing wait.
    Channel(Sender<()>),
}

/// Cloneable handle that closes a source from any thread.
///
/// After [`CloseHandle::close`] the source's current or next pull fails with
/// [`CaptureError::Closed`].
#[derive(Debug, Clone)]
pub struct CloseHandle {
    closed: Arc<AtomicBool>,
    waker: Waker,
}

impl CloseHandle {
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        match &self.waker {
            Waker::Datagram(target) => wake_socket(*target),
            Waker::Channel(tx) => {
                // A full channel already holds a pending wake.
                if tx.try_send(()).is_err() {
                    debug!("close wake already pending");
                }
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn wake_socket(target: SocketAddr) {
    let target = match target.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), target.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), target.port()),
        _ => target,
    };
    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let sent = UdpSocket::bind(local).and_then(|s| s.send_to(&[], target));
    if let Err(err) = sent {
        debug!(error = %err, %target, "failed to send close wake datagram");
    }
}

/// Source-side half of a [`CloseHandle`].
#[derive(Debug)]
pub(crate) struct CloseSignal {
    closed: Arc<AtomicBool>,
    waker: Waker,
    wake_rx: Option<Receiver<()>>,
}

impl CloseSignal {
    /// Signal for a socket bound at `local_addr`.
    pub(crate) fn for_socket(local_addr: SocketAddr) -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(false)),
            waker: Waker::Datagram(local_addr),
            wake_rx: None,
        }
    }

    /// Signal for a source that blocks only in [`CloseSignal::sleep_until`].
    pub(crate) fn for_timer() -> Self {
        let (tx, rx) = channel::bounded(1);
        Self {
            closed: Arc::new(AtomicBool::new(false)),
            waker: Waker::Channel(tx),
            wake_rx: Some(rx),
        }
    }

    pub(crate) fn handle(&self) -> CloseHandle {
        CloseHandle {
            closed: Arc::clone(&self.closed),
            waker: self.waker.clone(),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Mark closed without waking anyone (the caller is the puller).
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn check(&self) -> Result<(), CaptureError> {
        if self.is_closed() {
            Err(CaptureError::Closed)
        } else {
            Ok(())
        }
    }

    /// Block until `deadline` or until closed, whichever comes first.
    pub(crate) fn sleep_until(&self, deadline: Instant) -> Result<(), CaptureError> {
        loop {
            self.check()?;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            match &self.wake_rx {
                Some(rx) => match rx.recv_timeout(remaining) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => self.check()?,
                    Err(RecvTimeoutError::Timeout) => {}
                },
                None => std::thread::sleep(remaining.min(Duration::from_millis(50))),
            }
        }
    }
}
