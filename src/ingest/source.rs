//! Datagram sources for the ingestion loop

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::info;

use crate::config::ListenerConfig;

/// Something that yields whole datagrams, one per call
#[async_trait]
pub trait DatagramSource: Send + Sync {
    /// Wait for the next datagram and return its payload and sender
    async fn receive(&self) -> io::Result<(Vec<u8>, SocketAddr)>;
}

/// UDP socket bound to the configured listener address
#[derive(Debug)]
pub struct UdpSource {
    socket: UdpSocket,
    buffer_size: usize,
}

impl UdpSource {
    /// Bind the listener socket
    pub async fn bind(config: &ListenerConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind(config.address()).await?;
        info!(
            address = %socket.local_addr()?,
            "Listening for incoming Loxone UDP packets"
        );

        Ok(Self {
            socket,
            buffer_size: config.buffer_size,
        })
    }

    /// Address the socket is actually bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl DatagramSource for UdpSource {
    async fn receive(&self) -> io::Result<(Vec<u8>, SocketAddr)> {
        let mut buffer = vec![0u8; self.buffer_size];
        let (len, peer) = self.socket.recv_from(&mut buffer).await?;
        buffer.truncate(len);
        Ok((buffer, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener_config(buffer_size: usize) -> ListenerConfig {
        ListenerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 0,
            buffer_size,
        }
    }

    #[tokio::test]
    async fn test_receive_returns_exact_payload() {
        let source = UdpSource::bind(&listener_config(1024)).await.unwrap();
        let target = source.local_addr().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(b"2020-09-10 19:46:20;Temp;23.0", target)
            .await
            .unwrap();

        let (payload, peer) = source.receive().await.unwrap();
        assert_eq!(payload, b"2020-09-10 19:46:20;Temp;23.0");
        assert_eq!(peer, sender.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_receive_truncates_to_buffer_size() {
        let source = UdpSource::bind(&listener_config(8)).await.unwrap();
        let target = source.local_addr().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"0123456789abcdef", target).await.unwrap();

        let (payload, _) = source.receive().await.unwrap();
        assert_eq!(payload, b"01234567");
    }
}
