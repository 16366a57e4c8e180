#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

const TYPE_A: u16 = 1;
const TYPE_NS: u16 = 2;
const TYPE_CNAME: u16 = 5;
const TYPE_PTR: u16 = 12;
const TYPE_MX: u16 = 15;

/// One answer record served by the mock.
#[derive(Debug, Clone)]
pub enum MockRecord {
    A([u8; 4]),
    Ns(&'static str),
    Mx(u16, &'static str),
    Ptr(&'static str),
    Cname(&'static str),
}

/// How the mock replies to every query it receives.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Answer(Vec<MockRecord>),
    NxDomain,
    /// Never replies.
    Silent,
    /// Replies with the query ID plus one.
    WrongId,
    /// UDP answers carry only the TC bit; TCP answers carry the records.
    Truncated(Vec<MockRecord>),
}

/// What the mock saw in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenQuery {
    pub name: String,
    pub qtype: u16,
    pub recursion_desired: bool,
    pub over_tcp: bool,
}

/// In-process DNS server on 127.0.0.1, UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenQuery>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_seen = seen.clone();
        let tcp_seen = seen.clone();
        let tcp_behavior = behavior.clone();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        if let Ok((mut stream, _)) = accepted {
                            let behavior = tcp_behavior.clone();
                            let seen = tcp_seen.clone();
                            tokio::spawn(async move {
                                let Ok(len) = stream.read_u16().await else { return };
                                let mut query = vec![0u8; len as usize];
                                if stream.read_exact(&mut query).await.is_err() {
                                    return;
                                }
                                if let Some(response) = Self::respond(&query, &behavior, true, &seen) {
                                    let _ = stream.write_u16(response.len() as u16).await;
                                    let _ = stream.write_all(&response).await;
                                }
                            });
                        }
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            if let Some(response) = Self::respond(&buf[..len], &behavior, false, &udp_seen) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn seen(&self) -> Vec<SeenQuery> {
        self.seen.lock().unwrap().clone()
    }

    fn respond(
        query: &[u8],
        behavior: &MockBehavior,
        over_tcp: bool,
        seen: &Mutex<Vec<SeenQuery>>,
    ) -> Option<Vec<u8>> {
        let (name, qtype, question_end) = Self::parse_question(query)?;
        seen.lock().unwrap().push(SeenQuery {
            name,
            qtype,
            recursion_desired: query[2] & 0x01 == 0x01,
            over_tcp,
        });

        match behavior {
            MockBehavior::Silent => None,
            MockBehavior::Answer(records) => {
                Some(Self::build_response(query, question_end, records, 0, false))
            }
            MockBehavior::NxDomain => Some(Self::build_response(query, question_end, &[], 3, false)),
            MockBehavior::WrongId => {
                let mut response = Self::build_response(query, question_end, &[], 0, false);
                let id = u16::from_be_bytes([response[0], response[1]]).wrapping_add(1);
                response[0..2].copy_from_slice(&id.to_be_bytes());
                Some(response)
            }
            MockBehavior::Truncated(records) if over_tcp => {
                Some(Self::build_response(query, question_end, records, 0, false))
            }
            MockBehavior::Truncated(_) => Some(Self::build_response(query, question_end, &[], 0, true)),
        }
    }

    /// Returns the query name, type and the offset just past the question.
    fn parse_question(query: &[u8]) -> Option<(String, u16, usize)> {
        if query.len() < 12 {
            return None;
        }
        let mut labels = Vec::new();
        let mut pos = 12;
        loop {
            let len = *query.get(pos)? as usize;
            pos += 1;
            if len == 0 {
                break;
            }
            labels.push(String::from_utf8_lossy(query.get(pos..pos + len)?).to_string());
            pos += len;
        }
        let qtype = u16::from_be_bytes([*query.get(pos)?, *query.get(pos + 1)?]);
        Some((labels.join("."), qtype, pos + 4))
    }

    fn build_response(
        query: &[u8],
        question_end: usize,
        records: &[MockRecord],
        rcode: u8,
        truncated: bool,
    ) -> Vec<u8> {
        let mut response = Vec::with_capacity(512);

        response.extend_from_slice(&query[0..2]);

        // QR=1, RD copied from the query, TC on request
        let mut flags = 0x80 | (query[2] & 0x01);
        if truncated {
            flags |= 0x02;
        }
        response.push(flags);
        response.push(0x80 | (rcode & 0x0f));

        response.extend_from_slice(&[0x00, 0x01]);
        response.extend_from_slice(&(records.len() as u16).to_be_bytes());
        response.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        response.extend_from_slice(&query[12..question_end]);

        for record in records {
            let (rtype, rdata) = Self::rdata(record);
            response.extend_from_slice(&[0xc0, 0x0c]);
            response.extend_from_slice(&rtype.to_be_bytes());
            response.extend_from_slice(&[0x00, 0x01]);
            response.extend_from_slice(&[0x00, 0x00, 0x00, 0x3c]);
            response.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
            response.extend_from_slice(&rdata);
        }

        response
    }

    fn rdata(record: &MockRecord) -> (u16, Vec<u8>) {
        match record {
            MockRecord::A(octets) => (TYPE_A, octets.to_vec()),
            MockRecord::Ns(name) => (TYPE_NS, Self::encode_name(name)),
            MockRecord::Ptr(name) => (TYPE_PTR, Self::encode_name(name)),
            MockRecord::Cname(name) => (TYPE_CNAME, Self::encode_name(name)),
            MockRecord::Mx(preference, name) => {
                let mut rdata = preference.to_be_bytes().to_vec();
                rdata.extend_from_slice(&Self::encode_name(name));
                (TYPE_MX, rdata)
            }
        }
    }

    fn encode_name(name: &str) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(name.len() + 2);
        for label in name.trim_end_matches('.').split('.') {
            encoded.push(label.len() as u8);
            encoded.extend_from_slice(label.as_bytes());
        }
        encoded.push(0);
        encoded
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
