//! Link configuration, loaded from YAML.
use std::{path::Path, time::Duration};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GATEWAY_ADDRESS, delays};

const DEFAULT_CONFIG: &str = include_str!("../config/gateway.yaml");

/// Where the gateway lives and how patient to be with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bus device node, e.g. `/dev/i2c-1`.
    pub bus: String,
    #[serde(deserialize_with = "parse_address")]
    pub address: u8,
    #[serde(default)]
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bus: "/dev/i2c-1".to_string(),
            address: DEFAULT_GATEWAY_ADDRESS,
            timing: Timing::default(),
        }
    }
}

impl Config {
    /// The configuration shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(DEFAULT_CONFIG)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let raw = std::fs::read_to_string(p)
            .map_err(|e| anyhow::format_err!("cannot read config {}: {}", p.display(), e))?;
        log::debug!("Loading config from {}", p.display());
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(raw)?;
        config.timing = config.timing.at_least_minimum();
        anyhow::ensure!(
            config.address < 0x80,
            "address 0x{:02x} is not a 7-bit bus address",
            config.address
        );
        Ok(config)
    }
}

/// Settling delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// After the bus is brought up.
    pub startup: u64,
    /// Around every transaction.
    pub settle: u64,
    /// Before an analog write.
    pub analog_write: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            startup: delays::STARTUP_MS,
            settle: delays::SETTLE_MS,
            analog_write: delays::ANALOG_WRITE_MS,
        }
    }
}

impl Timing {
    /// Raise every delay to at least the firmware minimum.
    pub fn at_least_minimum(self) -> Self {
        let min = Timing::default();
        let clamp = |name: &str, value: u64, floor: u64| {
            if value < floor {
                log::warn!("timing.{}: {}ms is too short, using {}ms", name, value, floor);
                floor
            } else {
                value
            }
        };
        Timing {
            startup: clamp("startup", self.startup, min.startup),
            settle: clamp("settle", self.settle, min.settle),
            analog_write: clamp("analog_write", self.analog_write, min.analog_write),
        }
    }

    pub fn startup(&self) -> Duration {
        Duration::from_millis(self.startup)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle)
    }

    pub fn analog_write(&self) -> Duration {
        Duration::from_millis(self.analog_write)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Number(u8),
    Text(String),
}

fn parse_address<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match RawAddress::deserialize(deserializer)? {
        RawAddress::Number(n) => Ok(n),
        RawAddress::Text(s) => parse_address_str(&s).map_err(D::Error::custom),
    }
}

/// Parse `0x40`, `64` or `0b1000000`.
pub fn parse_address_str(s: &str) -> Result<u8> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u8::from_str_radix(bin, 2)
    } else {
        s.parse()
    };
    parsed.map_err(|e| anyhow::format_err!("invalid bus address {:?}: {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config() {
        let config = Config::builtin().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.address, 0x40);
        assert_eq!(config.timing.settle(), Duration::from_millis(5));
    }

    #[test]
    fn test_address_forms() {
        for raw in ["address: 64", "address: \"0x40\"", "address: \"0b1000000\""] {
            let config = Config::from_yaml(&format!("bus: /dev/i2c-0\n{}\n", raw)).unwrap();
            assert_eq!(config.address, 0x40, "{}", raw);
            assert_eq!(config.timing, Timing::default());
        }
        assert!(Config::from_yaml("bus: x\naddress: 200\n").is_err());
        assert!(Config::from_yaml("bus: x\naddress: \"0xzz\"\n").is_err());
    }

    #[test]
    fn test_timing_never_below_minimum() {
        let config = Config::from_yaml(
            "bus: /dev/i2c-1\naddress: 0x20\ntiming:\n  settle: 1\n  analog_write: 20\n",
        )
        .unwrap();
        assert_eq!(config.timing.settle, delays::SETTLE_MS);
        assert_eq!(config.timing.analog_write, 20);
        assert_eq!(config.timing.startup, delays::STARTUP_MS);
    }
}
