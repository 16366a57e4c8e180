use anyhow::bail;
use ferrous_sweep_application::services::DomainGenerator;
use ferrous_sweep_domain::validators::validate_key_list;
use ferrous_sweep_domain::{IpRange, QueryType};
use ferrous_sweep_infrastructure::sources::load_key_list;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Key sources as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SourceArgs {
    pub prefixes: Option<PathBuf>,
    pub suffixes: Option<PathBuf>,
    pub hosts: Option<PathBuf>,
    pub ranges: Vec<IpRange>,
}

impl SourceArgs {
    fn is_empty(&self) -> bool {
        self.prefixes.is_none()
            && self.suffixes.is_none()
            && self.hosts.is_none()
            && self.ranges.is_empty()
    }
}

/// Validate the sources and build the generator. Prefix and suffix lists are
/// read eagerly; the host list is streamed later by the generator.
pub fn load_sources(args: &SourceArgs, query_type: QueryType) -> anyhow::Result<DomainGenerator> {
    if args.is_empty() {
        bail!("No key source given: use --prefixes with --suffixes, --hosts or --range");
    }

    let mut generator = DomainGenerator::new();

    match (&args.prefixes, &args.suffixes) {
        (Some(prefixes), Some(suffixes)) => {
            let prefixes = load_list(prefixes, "prefix")?;
            let suffixes = load_list(suffixes, "suffix")?;
            info!(
                prefixes = prefixes.len(),
                suffixes = suffixes.len(),
                keys = prefixes.len() * suffixes.len(),
                "Cross product source loaded"
            );
            generator = generator.with_cross_product(prefixes, suffixes);
        }
        (Some(_), None) => bail!("--prefixes requires --suffixes"),
        (None, Some(_)) => bail!("--suffixes requires --prefixes"),
        (None, None) => {}
    }

    if let Some(ref hosts) = args.hosts {
        if !hosts.is_file() {
            bail!("Host list '{}' is not a readable file", hosts.display());
        }
        generator = generator.with_hosts_file(hosts);
    }

    if !args.ranges.is_empty() {
        if query_type != QueryType::PTR {
            warn!(
                query_type = %query_type,
                "IP ranges are usually swept with PTR queries"
            );
        }
        generator = generator.with_ranges(args.ranges.clone());
    }

    Ok(generator)
}

fn load_list(path: &Path, source: &str) -> anyhow::Result<Vec<String>> {
    let entries = load_key_list(path)?;
    validate_key_list(&entries, source)
        .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn list(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    async fn keys(generator: DomainGenerator) -> Vec<String> {
        let mut stream = generator.spawn(16);
        let mut keys = Vec::new();
        while let Some(key) = stream.next().await {
            keys.push(key.to_string());
        }
        keys
    }

    #[test]
    fn test_no_source_is_rejected() {
        assert!(load_sources(&SourceArgs::default(), QueryType::A).is_err());
    }

    #[test]
    fn test_prefixes_need_suffixes() {
        let prefixes = list(&["www"]);
        let args = SourceArgs {
            prefixes: Some(prefixes.path().to_path_buf()),
            ..Default::default()
        };
        let err = load_sources(&args, QueryType::A).unwrap_err();
        assert!(err.to_string().contains("--suffixes"));
    }

    #[test]
    fn test_empty_prefix_list_is_rejected() {
        let prefixes = list(&["# nothing here", ""]);
        let suffixes = list(&["example.com"]);
        let args = SourceArgs {
            prefixes: Some(prefixes.path().to_path_buf()),
            suffixes: Some(suffixes.path().to_path_buf()),
            ..Default::default()
        };
        assert!(load_sources(&args, QueryType::A).is_err());
    }

    #[test]
    fn test_missing_host_file_is_rejected() {
        let args = SourceArgs {
            hosts: Some(PathBuf::from("/nonexistent/hosts.txt")),
            ..Default::default()
        };
        assert!(load_sources(&args, QueryType::A).is_err());
    }

    #[tokio::test]
    async fn test_all_sources_in_order() {
        let prefixes = list(&["www", "mail"]);
        let suffixes = list(&["example.com"]);
        let hosts = list(&["vpn.example.org"]);
        let args = SourceArgs {
            prefixes: Some(prefixes.path().to_path_buf()),
            suffixes: Some(suffixes.path().to_path_buf()),
            hosts: Some(hosts.path().to_path_buf()),
            ranges: vec!["198.51.100.0/31".parse().unwrap()],
        };

        let generator = load_sources(&args, QueryType::PTR).unwrap();
        assert_eq!(
            keys(generator).await,
            vec![
                "www.example.com",
                "mail.example.com",
                "vpn.example.org",
                "198.51.100.0",
                "198.51.100.1",
            ]
        );
    }
}
