//! TCP sockets with timed send and receive.

use std::io::{self, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpStream, UdpSocket};
use std::time::{Duration, Instant};

use crate::net::addr::aton;
use crate::thread::millisleep;
use crate::utils::error::{ExtError, Result};

/// Outcome of [`Socket::send_all`] and [`Socket::recv_exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SockStatus {
    /// Every byte was transferred.
    Complete,
    /// The peer ended the connection.
    Closed,
    TimedOut,
}

impl SockStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Complete => 0,
            Self::Closed => 1,
            Self::TimedOut => -1,
        }
    }
}

#[derive(Debug)]
pub struct Socket {
    stream: TcpStream,
}

/// Opens a TCP connection to `ip:port`, giving up after `timeout`.
/// The returned socket is non-blocking.
pub fn connect_ip(ip: Ipv4Addr, port: u16, timeout: Duration) -> Result<Socket> {
    let addr = SocketAddr::V4(SocketAddrV4::new(ip, port));
    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_nodelay(true)?;

    let socket = Socket { stream };
    socket.set_nonblock()?;
    tracing::debug!("connected to {}", addr);
    Ok(socket)
}

/// Resolves `host` with [`aton`] and connects to it.
pub fn connect_addr(host: &str, port: u16, timeout: Duration) -> Result<Socket> {
    connect_ip(aton(host)?, port, timeout)
}

fn ipv4_of(addr: SocketAddr) -> Result<Ipv4Addr> {
    match addr.ip() {
        IpAddr::V4(ip) => Ok(ip),
        IpAddr::V6(ip) => ip
            .to_ipv4_mapped()
            .ok_or_else(|| ExtError::invalid_argument(format!("{} is not an IPv4 address", ip))),
    }
}

impl Socket {
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub fn set_nonblock(&self) -> Result<()> {
        self.stream.set_nonblocking(true)?;
        Ok(())
    }

    pub fn set_blocking(&self) -> Result<()> {
        self.stream.set_nonblocking(false)?;
        Ok(())
    }

    pub fn peer_ip(&self) -> Result<Ipv4Addr> {
        ipv4_of(self.stream.peer_addr()?)
    }

    pub fn local_ip(&self) -> Result<Ipv4Addr> {
        ipv4_of(self.stream.local_addr()?)
    }

    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }

    /// Shuts down both directions and releases the socket.
    pub fn close(self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Sends all of `pkt`. On a non-blocking socket, waits in 1 ms steps
    /// for up to `timeout` while the socket is not ready.
    pub fn send_all(&mut self, pkt: &[u8], timeout: Duration) -> Result<SockStatus> {
        let start = Instant::now();
        let mut sent = 0;
        while sent < pkt.len() {
            match self.stream.write(&pkt[sent..]) {
                Ok(0) => return Ok(SockStatus::Closed),
                Ok(n) => sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if start.elapsed() >= timeout {
                        tracing::debug!("send timed out after {} of {} bytes", sent, pkt.len());
                        return Ok(SockStatus::TimedOut);
                    }
                    millisleep(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(SockStatus::Complete)
    }

    /// Fills `buf` completely. On a non-blocking socket, waits in 1 ms
    /// steps for up to `timeout` while no data is pending.
    pub fn recv_exact(&mut self, buf: &mut [u8], timeout: Duration) -> Result<SockStatus> {
        let start = Instant::now();
        let mut received = 0;
        while received < buf.len() {
            match self.stream.read(&mut buf[received..]) {
                Ok(0) => return Ok(SockStatus::Closed),
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if start.elapsed() >= timeout {
                        tracing::debug!(
                            "recv timed out after {} of {} bytes",
                            received,
                            buf.len()
                        );
                        return Ok(SockStatus::TimedOut);
                    }
                    millisleep(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(SockStatus::Complete)
    }
}

/// The IPv4 address this host uses for outbound traffic.
///
/// Determined by routing a UDP socket toward 1.1.1.1:53; nothing is sent.
pub fn host_ip() -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect((Ipv4Addr::new(1, 1, 1, 1), 53))?;
    ipv4_of(socket.local_addr()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    const TIMEOUT: Duration = Duration::from_secs(3);

    fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[test]
    fn test_send_and_recv_round_trip() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 5];
            stream.read_exact(&mut request).unwrap();
            stream.write_all(b"pong!").unwrap();
            request
        });

        let mut sock = connect_ip(Ipv4Addr::LOCALHOST, port, TIMEOUT).unwrap();
        assert_eq!(sock.peer_ip().unwrap(), Ipv4Addr::LOCALHOST);
        assert_eq!(sock.local_ip().unwrap(), Ipv4Addr::LOCALHOST);

        assert_eq!(sock.send_all(b"ping!", TIMEOUT).unwrap(), SockStatus::Complete);
        let mut reply = [0u8; 5];
        assert_eq!(sock.recv_exact(&mut reply, TIMEOUT).unwrap(), SockStatus::Complete);
        assert_eq!(&reply, b"pong!");
        assert_eq!(&server.join().unwrap(), b"ping!");

        // server hung up
        let mut more = [0u8; 1];
        assert_eq!(sock.recv_exact(&mut more, TIMEOUT).unwrap(), SockStatus::Closed);
        sock.close().unwrap();
    }

    #[test]
    fn test_recv_times_out_on_silent_peer() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(500));
            drop(stream);
        });

        let mut sock = connect_addr("127.0.0.1", port, TIMEOUT).unwrap();
        let mut buf = [0u8; 4];
        let start = Instant::now();
        let status = sock
            .recv_exact(&mut buf, Duration::from_millis(50))
            .unwrap();
        assert_eq!(status, SockStatus::TimedOut);
        assert_eq!(status.code(), -1);
        assert!(start.elapsed() >= Duration::from_millis(50));
        server.join().unwrap();
    }

    #[test]
    fn test_blocking_toggle() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"hi").unwrap();
        });

        let mut sock = connect_ip(Ipv4Addr::LOCALHOST, port, TIMEOUT).unwrap();
        sock.set_blocking().unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(sock.recv_exact(&mut buf, Duration::ZERO).unwrap(), SockStatus::Complete);
        assert_eq!(&buf, b"hi");
        sock.set_nonblock().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        let (listener, port) = listener();
        drop(listener);
        assert!(connect_ip(Ipv4Addr::LOCALHOST, port, TIMEOUT).is_err());
    }

    #[test]
    fn test_host_ip_when_routable() {
        if let Ok(ip) = host_ip() {
            assert!(!ip.is_unspecified());
        }
    }
}
