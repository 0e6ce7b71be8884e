//! Stellar network selection from an RPC connection string

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid network: {0}")]
pub struct NetworkParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Public,
    Futurenet,
}

impl Network {
    /// Pick the network an RPC endpoint points at.
    ///
    /// Anything that is neither a testnet nor a futurenet URL is treated as
    /// the public network.
    pub fn from_rpc_url(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("testnet") {
            Network::Testnet
        } else if url.contains("futurenet") {
            Network::Futurenet
        } else {
            Network::Public
        }
    }

    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_PASSPHRASE,
            Network::Public => PUBLIC_PASSPHRASE,
            Network::Futurenet => FUTURENET_PASSPHRASE,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Public => write!(f, "public"),
            Network::Futurenet => write!(f, "futurenet"),
        }
    }
}

impl FromStr for Network {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "public" | "mainnet" => Ok(Network::Public),
            "futurenet" => Ok(Network::Futurenet),
            other => Err(NetworkParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rpc_url() {
        assert_eq!(
            Network::from_rpc_url("https://soroban-testnet.stellar.org"),
            Network::Testnet
        );
        assert_eq!(
            Network::from_rpc_url("https://rpc-futurenet.stellar.org:443"),
            Network::Futurenet
        );
        assert_eq!(
            Network::from_rpc_url("https://mainnet.sorobanrpc.com"),
            Network::Public
        );
        assert_eq!(Network::from_rpc_url("http://localhost:8000/rpc"), Network::Public);
    }

    #[test]
    fn test_passphrases() {
        assert_eq!(Network::Testnet.passphrase(), TESTNET_PASSPHRASE);
        assert_eq!(Network::Public.passphrase(), PUBLIC_PASSPHRASE);
        assert_eq!(Network::Futurenet.passphrase(), FUTURENET_PASSPHRASE);
    }

    #[test]
    fn test_parse_round_trips_display() {
        for network in [Network::Testnet, Network::Public, Network::Futurenet] {
            assert_eq!(network.to_string().parse::<Network>(), Ok(network));
        }
        assert_eq!("Mainnet".parse::<Network>(), Ok(Network::Public));
        assert!("devnet".parse::<Network>().is_err());
    }
}
