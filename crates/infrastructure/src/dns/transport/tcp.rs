use super::{transport_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use ferrous_sweep_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP: each message is preceded by its length as a big-endian u16.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let length = u16::try_from(message_bytes.len()).map_err(|_| {
            transport_error(self.server_addr, "message too large for TCP framing")
        })?;

        let mut stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| transport_error(self.server_addr, format!("connect failed: {}", e)))?;

        let mut frame = BytesMut::with_capacity(message_bytes.len() + 2);
        frame.put_u16(length);
        frame.put_slice(message_bytes);

        stream
            .write_all(&frame)
            .await
            .map_err(|e| transport_error(self.server_addr, format!("send failed: {}", e)))?;

        let response_len = stream
            .read_u16()
            .await
            .map_err(|e| transport_error(self.server_addr, format!("receive failed: {}", e)))?;

        let mut response = vec![0u8; response_len as usize];
        stream
            .read_exact(&mut response)
            .await
            .map_err(|e| transport_error(self.server_addr, format!("receive failed: {}", e)))?;

        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::QueryTimeout)??;

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
