use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};
use interchain_rs::{ChainId, WitnessConfig};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Where mainchain events come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessMode {
    /// Poll token-bank logs over JSON-RPC
    Rpc,
    /// Synthesize heights and transfers locally
    Simulated,
}

impl FromStr for WitnessMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rpc" => Ok(Self::Rpc),
            "simulated" | "sim" => Ok(Self::Simulated),
            other => Err(eyre!("WITNESS_MODE must be 'rpc' or 'simulated', got '{}'", other)),
        }
    }
}

impl fmt::Display for WitnessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc => write!(f, "rpc"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// Main configuration for the witness service
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: WitnessMode,
    pub db_path: PathBuf,
    pub api_port: u16,
    pub mainchain: MainchainConfig,
    pub polling: PollingConfig,
    pub subchain_id: ChainId,
    pub blocks_per_dynasty: u64,
    pub channel_watch_list: Vec<ChainId>,
}

/// Mainchain endpoint and contracts
#[derive(Debug, Clone)]
pub struct MainchainConfig {
    pub rpc_url: String,
    pub chain_id: ChainId,
    pub tfuel_token_bank: String,
    pub tnt20_token_bank: String,
    pub tnt721_token_bank: String,
    pub chain_registrar: String,
}

#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub poll_interval_ms: u64,
    pub confirmations: u64,
    pub max_block_range: u64,
    pub start_height: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/witness.redb")
}

fn default_api_port() -> u16 {
    9090
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_confirmations() -> u64 {
    1
}

fn default_max_block_range() -> u64 {
    5000
}

fn default_mainchain_chain_id() -> ChainId {
    ChainId::from_u64(366)
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from a variable lookup; `load` passes the process environment
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mode = match get("WITNESS_MODE") {
            Some(raw) => raw.parse()?,
            None => WitnessMode::Rpc,
        };

        let required = |key: &str| -> Result<String> {
            match (get(key), mode) {
                (Some(value), _) => Ok(value),
                (None, WitnessMode::Simulated) => Ok(String::new()),
                (None, WitnessMode::Rpc) => {
                    Err(eyre!("{} environment variable is required", key))
                }
            }
        };

        let mainchain = MainchainConfig {
            rpc_url: required("MAINCHAIN_RPC_URL")?,
            chain_id: parse_or("MAINCHAIN_CHAIN_ID", &get, default_mainchain_chain_id())?,
            tfuel_token_bank: required("TFUEL_TOKEN_BANK_ADDRESS")?,
            tnt20_token_bank: required("TNT20_TOKEN_BANK_ADDRESS")?,
            tnt721_token_bank: required("TNT721_TOKEN_BANK_ADDRESS")?,
            chain_registrar: required("CHAIN_REGISTRAR_ADDRESS")?,
        };

        let polling = PollingConfig {
            poll_interval_ms: parse_or("POLL_INTERVAL_MS", &get, default_poll_interval())?,
            confirmations: parse_or("CONFIRMATIONS", &get, default_confirmations())?,
            max_block_range: parse_or("MAX_BLOCK_RANGE", &get, default_max_block_range())?,
            start_height: parse_or("START_HEIGHT", &get, 0)?,
        };

        let subchain_id = get("SUBCHAIN_ID")
            .ok_or_else(|| eyre!("SUBCHAIN_ID environment variable is required"))?
            .parse()
            .wrap_err("SUBCHAIN_ID must be a decimal chain ID")?;

        let channel_watch_list = get("CHANNEL_WATCH_LIST")
            .map(|raw| parse_chain_list(&raw))
            .transpose()?
            .unwrap_or_default();

        let config = Config {
            mode,
            db_path: get("WITNESS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            api_port: parse_or("API_PORT", &get, default_api_port())?,
            mainchain,
            polling,
            subchain_id,
            blocks_per_dynasty: parse_or(
                "BLOCKS_PER_DYNASTY",
                &get,
                interchain_rs::witness::DEFAULT_BLOCKS_PER_DYNASTY,
            )?,
            channel_watch_list,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.polling.poll_interval_ms == 0 {
            return Err(eyre!("POLL_INTERVAL_MS must be greater than zero"));
        }
        if self.polling.max_block_range == 0 {
            return Err(eyre!("MAX_BLOCK_RANGE must be greater than zero"));
        }
        if self.blocks_per_dynasty == 0 {
            return Err(eyre!("BLOCKS_PER_DYNASTY must be greater than zero"));
        }
        if self.mainchain.chain_id == self.subchain_id {
            return Err(eyre!(
                "SUBCHAIN_ID must differ from MAINCHAIN_CHAIN_ID ({})",
                self.subchain_id
            ));
        }

        if self.mode == WitnessMode::Rpc {
            if self.mainchain.rpc_url.is_empty() {
                return Err(eyre!("MAINCHAIN_RPC_URL cannot be empty"));
            }
            for (key, value) in [
                ("TFUEL_TOKEN_BANK_ADDRESS", &self.mainchain.tfuel_token_bank),
                ("TNT20_TOKEN_BANK_ADDRESS", &self.mainchain.tnt20_token_bank),
                ("TNT721_TOKEN_BANK_ADDRESS", &self.mainchain.tnt721_token_bank),
                ("CHAIN_REGISTRAR_ADDRESS", &self.mainchain.chain_registrar),
            ] {
                parse_address(key, value)?;
            }
        }

        Ok(())
    }

    pub fn witness_config(&self) -> WitnessConfig {
        WitnessConfig {
            mainchain_chain_id: self.mainchain.chain_id,
            subchain_id: self.subchain_id,
            poll_interval: Duration::from_millis(self.polling.poll_interval_ms),
            confirmations: self.polling.confirmations,
            max_block_range: self.polling.max_block_range,
            start_height: self.polling.start_height,
            blocks_per_dynasty: self.blocks_per_dynasty,
            channel_watch_list: self.channel_watch_list.clone(),
        }
    }

    /// TFuel, TNT20 and TNT721 token-bank addresses
    pub fn token_bank_addresses(&self) -> Result<(Address, Address, Address)> {
        Ok((
            parse_address("TFUEL_TOKEN_BANK_ADDRESS", &self.mainchain.tfuel_token_bank)?,
            parse_address("TNT20_TOKEN_BANK_ADDRESS", &self.mainchain.tnt20_token_bank)?,
            parse_address("TNT721_TOKEN_BANK_ADDRESS", &self.mainchain.tnt721_token_bank)?,
        ))
    }

    pub fn chain_registrar_address(&self) -> Result<Address> {
        parse_address("CHAIN_REGISTRAR_ADDRESS", &self.mainchain.chain_registrar)
    }
}

fn parse_or<T>(key: &str, get: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address> {
    if value.len() != 42 || !value.starts_with("0x") {
        return Err(eyre!(
            "{} must be a valid hex address (42 chars with 0x prefix)",
            key
        ));
    }
    value
        .parse()
        .wrap_err_with(|| format!("{} is not a valid hex address", key))
}

/// Comma separated decimal chain IDs
fn parse_chain_list(raw: &str) -> Result<Vec<ChainId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ChainId>()
                .wrap_err_with(|| format!("CHANNEL_WATCH_LIST entry '{}' is not a chain ID", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const BANK: &str = "0x0000000000000000000000000000000000000001";

    fn rpc_vars() -> HashMap<&'static str, String> {
        HashMap::from([
            ("MAINCHAIN_RPC_URL", "http://localhost:18888/rpc".to_string()),
            ("SUBCHAIN_ID", "360777".to_string()),
            ("TFUEL_TOKEN_BANK_ADDRESS", BANK.to_string()),
            ("TNT20_TOKEN_BANK_ADDRESS", BANK.to_string()),
            ("TNT721_TOKEN_BANK_ADDRESS", BANK.to_string()),
            ("CHAIN_REGISTRAR_ADDRESS", BANK.to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config> {
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&rpc_vars()).unwrap();
        assert_eq!(config.mode, WitnessMode::Rpc);
        assert_eq!(config.mainchain.chain_id, ChainId::from_u64(366));
        assert_eq!(config.polling.poll_interval_ms, default_poll_interval());
        assert_eq!(config.polling.max_block_range, 5000);
        assert_eq!(config.api_port, 9090);
        assert!(config.channel_watch_list.is_empty());
        assert_eq!(config.token_bank_addresses().unwrap().0, BANK.parse::<Address>().unwrap());
    }

    #[test]
    fn test_rpc_mode_requires_contracts() {
        let mut vars = rpc_vars();
        vars.remove("TNT20_TOKEN_BANK_ADDRESS");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_malformed_address_rejected() {
        let mut vars = rpc_vars();
        vars.insert("CHAIN_REGISTRAR_ADDRESS", "0x1234".to_string());
        assert!(load(&vars).is_err());

        vars.insert(
            "CHAIN_REGISTRAR_ADDRESS",
            "0xzz00000000000000000000000000000000000001".to_string(),
        );
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_zero_interval_and_range_rejected() {
        let mut vars = rpc_vars();
        vars.insert("POLL_INTERVAL_MS", "0".to_string());
        assert!(load(&vars).is_err());

        let mut vars = rpc_vars();
        vars.insert("MAX_BLOCK_RANGE", "0".to_string());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_unparseable_number_rejected() {
        let mut vars = rpc_vars();
        vars.insert("CONFIRMATIONS", "many".to_string());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_simulated_mode_needs_only_subchain() {
        let vars = HashMap::from([
            ("WITNESS_MODE", "simulated".to_string()),
            ("SUBCHAIN_ID", "360777".to_string()),
            ("CHANNEL_WATCH_LIST", "360888, 360999".to_string()),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.mode, WitnessMode::Simulated);
        assert_eq!(
            config.channel_watch_list,
            vec![ChainId::from_u64(360888), ChainId::from_u64(360999)]
        );

        let witness = config.witness_config();
        assert_eq!(witness.subchain_id, ChainId::from_u64(360777));
        assert_eq!(witness.poll_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!("replay".parse::<WitnessMode>().is_err());
        assert_eq!("RPC".parse::<WitnessMode>().unwrap(), WitnessMode::Rpc);
    }
}
