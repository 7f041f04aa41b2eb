//! nipopow-spv configuration file handling
//!
//! Configuration files are TOML. Every value can be overridden on the command
//! line; the file only saves typing for repeated checks against the same
//! chain and peers.

use nipopow_spv::chain::{BlockId, Digest32, EASIEST_N_BITS};
use nipopow_spv::nipopow::{PoPowParams, DEFAULT_K, DEFAULT_M};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default directory holding per-peer node dumps
const DEFAULT_DATA_DIR: &str = "./node-dumps";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpvConfig {
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Block and transaction to check
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub peers: PeersConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Genesis block id the proofs must be anchored at
    pub genesis: Option<BlockId>,

    /// Security parameter
    #[serde(default = "default_m")]
    pub m: u32,

    /// Suffix length
    #[serde(default = "default_k")]
    pub k: u32,

    /// Easiest compact target a header may declare
    #[serde(default = "default_pow_limit")]
    pub pow_limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub header_id: Option<BlockId>,
    pub tx_id: Option<Digest32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeersConfig {
    /// Peers asked for NiPoPoW proofs
    #[serde(default)]
    pub proof_peers: Vec<String>,

    /// Peer asked for the header and Merkle path (default: first proof peer)
    pub header_peer: Option<String>,

    /// Directory with one dump subdirectory per peer
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_m() -> u32 {
    DEFAULT_M
}

fn default_k() -> u32 {
    DEFAULT_K
}

fn default_pow_limit() -> u32 {
    EASIEST_N_BITS
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            genesis: None,
            m: DEFAULT_M,
            k: DEFAULT_K,
            pow_limit: EASIEST_N_BITS,
        }
    }
}

impl Default for PeersConfig {
    fn default() -> Self {
        Self {
            proof_peers: Vec::new(),
            header_peer: None,
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl VerifierConfig {
    pub fn params(&self) -> PoPowParams {
        PoPowParams {
            m: self.m,
            k: self.k,
            pow_limit: self.pow_limit,
        }
    }
}

impl SpvConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: SpvConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# nipopow-spv configuration
#
# Every value here can be overridden on the command line.

[verifier]
# Genesis block id (hex). Proofs not anchored at this block are rejected.
# genesis = "..."

# Security parameter: minimum superblocks per counted level
m = {m}

# Suffix length: number of most recent headers carried in full
k = {k}

# Easiest compact target (n_bits) a header may declare
pow_limit = {pow_limit:#010x}

[target]
# Block and transaction to check (hex)
# header_id = "..."
# tx_id = "..."

[peers]
# Peers asked for NiPoPoW proofs. Each is a subdirectory of data_dir.
proof_peers = []

# Peer asked for the header and Merkle path (default: first proof peer)
# header_peer = "..."

# Directory holding one node dump per peer
data_dir = "{data_dir}"

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
level = "{level}"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/nipopow-spv.log"
"#,
            m = DEFAULT_M,
            k = DEFAULT_K,
            pow_limit = EASIEST_N_BITS,
            data_dir = DEFAULT_DATA_DIR,
            level = DEFAULT_LOG_LEVEL,
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, Self::generate_default_toml()).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Get the default config file path
///
/// `~/.config/nipopow-spv/config.toml` on Linux, the platform config
/// directory elsewhere.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nipopow-spv")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SpvConfig::default();
        assert_eq!(config.verifier.m, 5);
        assert_eq!(config.verifier.k, 6);
        assert_eq!(config.verifier.genesis, None);
        assert_eq!(config.peers.data_dir, PathBuf::from("./node-dumps"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = SpvConfig::default();
        config.verifier.genesis = Some(BlockId(Digest32([0x11; 32])));
        config.target.tx_id = Some(Digest32([0x22; 32]));
        config.peers.proof_peers = vec!["node-a".to_string(), "node-b".to_string()];
        config.save(&config_path).unwrap();

        let loaded = SpvConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_create_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        SpvConfig::create_default(&config_path).unwrap();
        assert!(config_path.exists());

        let config = SpvConfig::load(&config_path).unwrap();
        assert_eq!(config, SpvConfig::default());
    }

    #[test]
    fn test_load_config_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let minimal_config = format!(
            r#"
[verifier]
genesis = "{}"
"#,
            "ab".repeat(32)
        );
        fs::write(&config_path, minimal_config).unwrap();

        let config = SpvConfig::load(&config_path).unwrap();
        assert_eq!(config.verifier.genesis, Some(BlockId(Digest32([0xab; 32]))));
        assert_eq!(config.verifier.params(), PoPowParams::default());
        assert!(config.peers.proof_peers.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_pow_limit_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[verifier]\npow_limit = 0x1d00ffff\n").unwrap();

        let config = SpvConfig::load(&config_path).unwrap();
        assert_eq!(config.verifier.params().pow_limit, 0x1d00ffff);
        assert!(config.verifier.params().validate().is_ok());
    }

    #[test]
    fn test_bad_hex_in_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[target]\nheader_id = \"xyz\"\n").unwrap();

        assert!(SpvConfig::load(&config_path).is_err());
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("nipopow-spv/config.toml"));
    }
}
