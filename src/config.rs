use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for the target search cluster.
///
/// `server` and `index` are optional defaults: the `index_qa` tool and the
/// `submit` command accept both per call, and fall back to these when the
/// caller omits them.
#[derive(Debug, Deserialize, Clone)]
pub struct ClusterConfig {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            server: None,
            index: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_bind() -> String {
    "127.0.0.1:7431".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.cluster.timeout_secs == 0 {
        anyhow::bail!("cluster.timeout_secs must be >= 1");
    }

    if let Some(server) = &config.cluster.server {
        if !server.starts_with("http://") && !server.starts_with("https://") {
            anyhow::bail!(
                "cluster.server must start with http:// or https://, got '{}'",
                server
            );
        }
        if server.ends_with('/') {
            anyhow::bail!("cluster.server must not end with '/', got '{}'", server);
        }
    }

    if let Some(index) = &config.cluster.index {
        if index.trim().is_empty() {
            anyhow::bail!("cluster.index must not be empty when set");
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cluster.timeout_secs, 30);
        assert_eq!(config.server.bind, "127.0.0.1:7431");
        assert!(config.cluster.server.is_none());
        assert!(config.cluster.index.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[cluster]
server = "http://localhost:9200"
index = "qa_log"
timeout_secs = 10

[server]
bind = "0.0.0.0:8800"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.cluster.server.as_deref(), Some("http://localhost:9200"));
        assert_eq!(config.cluster.index.as_deref(), Some("qa_log"));
        assert_eq!(config.cluster.timeout_secs, 10);
        assert_eq!(config.server.bind, "0.0.0.0:8800");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.cluster.timeout_secs, 30);
        assert_eq!(config.server.bind, "127.0.0.1:7431");
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let file = write_config("[cluster]\ntimeout_secs = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let file = write_config("[cluster]\nserver = \"localhost:9200\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_rejects_trailing_slash() {
        let file = write_config("[cluster]\nserver = \"http://localhost:9200/\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("must not end"));
    }
}
