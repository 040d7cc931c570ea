//! Static network table keyed by chain id.
//!
//! Providers report the active chain as a hex string (`"0x1"`). Lookups are
//! numeric, so `"0x01"` and `"0X1"` resolve to the same entry. Chains that
//! are not in the table get a synthesized descriptor.

use serde::{Deserialize, Serialize};

/// Chain id of Ethereum mainnet, the target of the "switch to mainnet" action.
pub const MAINNET_CHAIN_ID: &str = "0x1";

/// Currency symbol used for chains missing from the table.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "ETH";

/// A known network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
    /// Numeric chain id.
    pub chain_id: u64,
    pub display_name: &'static str,
    pub is_testnet: bool,
    pub currency_symbol: &'static str,
    pub currency_name: &'static str,
    pub decimals: u8,
    /// Public RPC endpoint offered when asking a wallet to add the chain.
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

impl NetworkDescriptor {
    /// Chain id in the `0x`-prefixed lowercase form providers use.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

static NETWORKS: &[NetworkDescriptor] = &[
    NetworkDescriptor {
        chain_id: 1,
        display_name: "Ethereum Mainnet",
        is_testnet: false,
        currency_symbol: "ETH",
        currency_name: "Ether",
        decimals: 18,
        rpc_url: "https://ethereum-rpc.publicnode.com",
        explorer_url: "https://etherscan.io",
    },
    NetworkDescriptor {
        chain_id: 11_155_111,
        display_name: "Sepolia Testnet",
        is_testnet: true,
        currency_symbol: "SepoliaETH",
        currency_name: "Sepolia Ether",
        decimals: 18,
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
        explorer_url: "https://sepolia.etherscan.io",
    },
    NetworkDescriptor {
        chain_id: 17_000,
        display_name: "Holesky Testnet",
        is_testnet: true,
        currency_symbol: "ETH",
        currency_name: "Holesky Ether",
        decimals: 18,
        rpc_url: "https://ethereum-holesky-rpc.publicnode.com",
        explorer_url: "https://holesky.etherscan.io",
    },
    NetworkDescriptor {
        chain_id: 137,
        display_name: "Polygon Mainnet",
        is_testnet: false,
        currency_symbol: "POL",
        currency_name: "POL",
        decimals: 18,
        rpc_url: "https://polygon-rpc.com",
        explorer_url: "https://polygonscan.com",
    },
    NetworkDescriptor {
        chain_id: 80_002,
        display_name: "Polygon Amoy Testnet",
        is_testnet: true,
        currency_symbol: "POL",
        currency_name: "POL",
        decimals: 18,
        rpc_url: "https://rpc-amoy.polygon.technology",
        explorer_url: "https://amoy.polygonscan.com",
    },
    NetworkDescriptor {
        chain_id: 56,
        display_name: "BNB Smart Chain",
        is_testnet: false,
        currency_symbol: "BNB",
        currency_name: "BNB",
        decimals: 18,
        rpc_url: "https://bsc-dataseed.bnbchain.org",
        explorer_url: "https://bscscan.com",
    },
    NetworkDescriptor {
        chain_id: 97,
        display_name: "BSC Testnet",
        is_testnet: true,
        currency_symbol: "tBNB",
        currency_name: "Test BNB",
        decimals: 18,
        rpc_url: "https://data-seed-prebsc-1-s1.bnbchain.org:8545",
        explorer_url: "https://testnet.bscscan.com",
    },
    NetworkDescriptor {
        chain_id: 10,
        display_name: "Optimism",
        is_testnet: false,
        currency_symbol: "ETH",
        currency_name: "Ether",
        decimals: 18,
        rpc_url: "https://mainnet.optimism.io",
        explorer_url: "https://optimistic.etherscan.io",
    },
    NetworkDescriptor {
        chain_id: 42_161,
        display_name: "Arbitrum One",
        is_testnet: false,
        currency_symbol: "ETH",
        currency_name: "Ether",
        decimals: 18,
        rpc_url: "https://arb1.arbitrum.io/rpc",
        explorer_url: "https://arbiscan.io",
    },
    NetworkDescriptor {
        chain_id: 8_453,
        display_name: "Base",
        is_testnet: false,
        currency_symbol: "ETH",
        currency_name: "Ether",
        decimals: 18,
        rpc_url: "https://mainnet.base.org",
        explorer_url: "https://basescan.org",
    },
    NetworkDescriptor {
        chain_id: 84_532,
        display_name: "Base Sepolia",
        is_testnet: true,
        currency_symbol: "ETH",
        currency_name: "Sepolia Ether",
        decimals: 18,
        rpc_url: "https://sepolia.base.org",
        explorer_url: "https://sepolia.basescan.org",
    },
    NetworkDescriptor {
        chain_id: 31_337,
        display_name: "Localhost 8545",
        is_testnet: true,
        currency_symbol: "ETH",
        currency_name: "Ether",
        decimals: 18,
        rpc_url: "http://127.0.0.1:8545",
        explorer_url: "",
    },
    NetworkDescriptor {
        chain_id: 1_337,
        display_name: "Geth Dev",
        is_testnet: true,
        currency_symbol: "ETH",
        currency_name: "Ether",
        decimals: 18,
        rpc_url: "http://127.0.0.1:8545",
        explorer_url: "",
    },
];

/// All networks in the static table.
pub fn known_networks() -> &'static [NetworkDescriptor] {
    NETWORKS
}

/// Parse a `0x`-prefixed (or bare) hex chain id.
pub fn parse_chain_id(chain_id: &str) -> Option<u64> {
    let trimmed = chain_id.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16).ok()
}

/// Look up a chain id in the static table.
pub fn find_network(chain_id: &str) -> Option<&'static NetworkDescriptor> {
    let id = parse_chain_id(chain_id)?;
    NETWORKS.iter().find(|n| n.chain_id == id)
}

/// Resolved network metadata for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub chain_id: String,
    pub name: String,
    pub is_testnet: bool,
    pub currency_symbol: String,
}

/// Resolve a chain id reported by the provider.
///
/// Unknown ids produce `"Chain ID: N"` with `N` decoded from hex, the default
/// currency symbol, and `is_testnet = false`. An id that is not valid hex is
/// echoed verbatim in the name.
pub fn get_network_info(chain_id: &str) -> NetworkInfo {
    match find_network(chain_id) {
        Some(n) => NetworkInfo {
            chain_id: chain_id.to_string(),
            name: n.display_name.to_string(),
            is_testnet: n.is_testnet,
            currency_symbol: n.currency_symbol.to_string(),
        },
        None => {
            let label = parse_chain_id(chain_id)
                .map(|id| id.to_string())
                .unwrap_or_else(|| chain_id.to_string());
            NetworkInfo {
                chain_id: chain_id.to_string(),
                name: format!("Chain ID: {}", label),
                is_testnet: false,
                currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            }
        }
    }
}

/// Descriptor of the chain targeted by "switch to mainnet".
pub fn mainnet() -> &'static NetworkDescriptor {
    &NETWORKS[0]
}
