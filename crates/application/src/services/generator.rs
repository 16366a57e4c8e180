use ferrous_sweep_domain::{DomainError, IpRange, LookupKey};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

pub const DEFAULT_BUFFER: usize = 65_536;

/// Produces the key stream of a sweep, in this order:
///
/// 1. `prefix.suffix` for every prefix (outer) and suffix (inner)
/// 2. each non-empty line of the host file, in file order
/// 3. every address of each IP range, ascending
///
/// The producer runs as its own task and hands keys over through a buffered
/// channel; closing the channel is the end-of-stream signal.
#[derive(Debug, Clone, Default)]
pub struct DomainGenerator {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    hosts_file: Option<PathBuf>,
    ranges: Vec<IpRange>,
}

impl DomainGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cross_product(mut self, prefixes: Vec<String>, suffixes: Vec<String>) -> Self {
        self.prefixes = prefixes;
        self.suffixes = suffixes;
        self
    }

    pub fn with_hosts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.hosts_file = Some(path.into());
        self
    }

    pub fn with_ranges(mut self, ranges: Vec<IpRange>) -> Self {
        self.ranges = ranges;
        self
    }

    /// Start the producer task. Must be called inside a tokio runtime.
    pub fn spawn(self, buffer: usize) -> KeyStream {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        tokio::spawn(self.produce(tx));
        KeyStream::new(rx)
    }

    async fn produce(self, tx: mpsc::Sender<LookupKey>) {
        let mut produced: u64 = 0;

        for prefix in &self.prefixes {
            for suffix in &self.suffixes {
                if tx.send(LookupKey::joined(prefix, suffix)).await.is_err() {
                    debug!(produced, "Key stream dropped by consumer");
                    return;
                }
                produced += 1;
            }
        }

        if let Some(ref path) = self.hosts_file {
            match Self::stream_file(path, &tx).await {
                Ok(Some(n)) => produced += n,
                Ok(None) => {
                    debug!(produced, "Key stream dropped by consumer");
                    return;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Host list read failed, continuing with ranges");
                }
            }
        }

        for range in &self.ranges {
            for addr in range.addresses() {
                if tx.send(LookupKey::from(addr.to_string())).await.is_err() {
                    debug!(produced, "Key stream dropped by consumer");
                    return;
                }
                produced += 1;
            }
        }

        debug!(produced, "Key generation finished");
    }

    /// Returns `None` when the consumer went away mid-file.
    ///
    /// Lines that are not valid UTF-8 are skipped with a warning.
    async fn stream_file(
        path: &Path,
        tx: &mpsc::Sender<LookupKey>,
    ) -> Result<Option<u64>, DomainError> {
        let mut lines = BufReader::new(File::open(path).await?).split(b'\n');
        let mut sent = 0;
        let mut line_no: u64 = 0;

        while let Some(raw) = lines.next_segment().await? {
            line_no += 1;
            let Ok(line) = std::str::from_utf8(&raw) else {
                warn!(path = %path.display(), line = line_no, "Skipping host list line that is not valid UTF-8");
                continue;
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if tx.send(LookupKey::from(line)).await.is_err() {
                return Ok(None);
            }
            sent += 1;
        }

        Ok(Some(sent))
    }
}

/// Consumer end of the generator channel. Monotonic and never rewound: once
/// `next` returns `None` it keeps returning `None`.
#[derive(Debug)]
pub struct KeyStream {
    rx: mpsc::Receiver<LookupKey>,
    exhausted: bool,
}

impl KeyStream {
    fn new(rx: mpsc::Receiver<LookupKey>) -> Self {
        Self {
            rx,
            exhausted: false,
        }
    }

    /// An already-assembled stream, closed after the last key.
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<LookupKey>,
    {
        let keys: Vec<LookupKey> = keys.into_iter().map(Into::into).collect();
        let (tx, rx) = mpsc::channel(keys.len().max(1));
        for key in keys {
            // Capacity equals the key count, so this cannot fail.
            let _ = tx.try_send(key);
        }
        Self::new(rx)
    }

    /// Next key, waiting for the producer if it is behind.
    pub async fn next(&mut self) -> Option<LookupKey> {
        if self.exhausted {
            return None;
        }
        let key = self.rx.recv().await;
        if key.is_none() {
            self.exhausted = true;
        }
        key
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn collect(mut stream: KeyStream) -> Vec<String> {
        let mut keys = Vec::new();
        while let Some(key) = stream.next().await {
            keys.push(key.to_string());
        }
        keys
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_cross_product_order() {
        let stream = DomainGenerator::new()
            .with_cross_product(strings(&["foo", "bar"]), strings(&["com", "net"]))
            .spawn(DEFAULT_BUFFER);

        assert_eq!(
            collect(stream).await,
            vec!["foo.com", "foo.net", "bar.com", "bar.net"]
        );
    }

    #[tokio::test]
    async fn test_file_lines_follow_cross_product() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mail.example.org").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "   ").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "  vpn.example.org  ").unwrap();

        let stream = DomainGenerator::new()
            .with_cross_product(strings(&["www"]), strings(&["example.com"]))
            .with_hosts_file(file.path())
            .spawn(DEFAULT_BUFFER);

        assert_eq!(
            collect(stream).await,
            vec!["www.example.com", "mail.example.org", "vpn.example.org"]
        );
    }

    #[tokio::test]
    async fn test_ranges_come_last() {
        let stream = DomainGenerator::new()
            .with_cross_product(strings(&["ns"]), strings(&["example.com"]))
            .with_ranges(vec!["192.0.2.0/31".parse().unwrap()])
            .spawn(DEFAULT_BUFFER);

        assert_eq!(
            collect(stream).await,
            vec!["ns.example.com", "192.0.2.0", "192.0.2.1"]
        );
    }

    #[tokio::test]
    async fn test_empty_generator_closes_immediately() {
        let mut stream = DomainGenerator::new().spawn(DEFAULT_BUFFER);
        assert!(stream.next().await.is_none());
        assert!(stream.is_exhausted());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_host_file_still_yields_ranges() {
        let stream = DomainGenerator::new()
            .with_cross_product(strings(&["a"]), strings(&["b"]))
            .with_hosts_file("/nonexistent/hosts.txt")
            .with_ranges(vec!["192.0.2.0/31".parse().unwrap()])
            .spawn(DEFAULT_BUFFER);

        assert_eq!(collect(stream).await, vec!["a.b", "192.0.2.0", "192.0.2.1"]);
    }

    #[tokio::test]
    async fn test_non_utf8_host_line_is_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"first.example.org\n\xff\xfebad\nafter.example.org\n")
            .unwrap();

        let stream = DomainGenerator::new()
            .with_hosts_file(file.path())
            .with_ranges(vec!["192.0.2.0/31".parse().unwrap()])
            .spawn(DEFAULT_BUFFER);

        assert_eq!(
            collect(stream).await,
            vec!["first.example.org", "after.example.org", "192.0.2.0", "192.0.2.1"]
        );
    }

    #[tokio::test]
    async fn test_small_buffer_still_yields_everything() {
        let prefixes: Vec<String> = (0..50).map(|i| format!("h{i}")).collect();
        let stream = DomainGenerator::new()
            .with_cross_product(prefixes, strings(&["lan"]))
            .spawn(1);

        let keys = collect(stream).await;
        assert_eq!(keys.len(), 50);
        assert_eq!(keys[0], "h0.lan");
        assert_eq!(keys[49], "h49.lan");
    }

    #[tokio::test]
    async fn test_from_keys_preserves_order() {
        let stream = KeyStream::from_keys(["b", "a", "c"]);
        assert_eq!(collect(stream).await, vec!["b", "a", "c"]);
    }
}
