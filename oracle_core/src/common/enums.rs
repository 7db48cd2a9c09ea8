use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Pipeline stage, used to tag errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Stage {
    #[strum(serialize = "config")]
    Config,
    #[strum(serialize = "source")]
    Source,
    #[strum(serialize = "decode")]
    Decode,
    #[strum(serialize = "histogram")]
    Histogram,
    #[strum(serialize = "stencil")]
    Stencil,
    #[strum(serialize = "mapper")]
    Mapper,
    #[strum(serialize = "solver")]
    Solver,
}

/// Ledger network, selects the record magic used in raw block files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[strum(serialize = "mainnet")]
    Mainnet,
    #[strum(serialize = "testnet")]
    Testnet,
    #[strum(serialize = "signet")]
    Signet,
    #[strum(serialize = "regtest")]
    Regtest,
}

impl Network {
    pub fn magic(&self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0xf9, 0xbe, 0xb4, 0xd9],
            Network::Testnet => [0x0b, 0x11, 0x09, 0x07],
            Network::Signet => [0x0a, 0x03, 0xcf, 0x40],
            Network::Regtest => [0xfa, 0xbf, 0xb5, 0xda],
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("signet").unwrap(), Network::Signet);
        assert_eq!(Network::Mainnet.to_string(), "mainnet");
        assert_eq!(Network::default().magic(), [0xf9, 0xbe, 0xb4, 0xd9]);
    }
}
