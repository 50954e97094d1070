//! Supported networks, deployed contract addresses, and settlement tokens.
//!
//! Everything here is static build-time data: the client supports a known
//! set of chains, each carrying its RPC endpoints (primary + fallbacks),
//! a versioned table of deployed Gateway contract addresses, and the list
//! of settlement tokens it accepts. The zero address is the sentinel for
//! the chain's native asset.

use alloy::primitives::{address, Address};

/// Deployed contract versions. Only V0 exists today; the dimension is kept
/// so an upgraded deployment can coexist with the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractVersion {
    #[default]
    V0,
}

impl ContractVersion {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "V0" | "v0" => Some(Self::V0),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V0 => write!(f, "V0"),
        }
    }
}

/// A chain the Gateway contract is deployed to.
#[derive(Debug)]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: &'static str,
    /// Symbol of the native asset (what the zero-address token resolves to).
    pub native_symbol: &'static str,
    /// RPC endpoints, primary first. Tried in order at connect time.
    pub rpc_urls: &'static [&'static str],
    contracts: &'static [(ContractVersion, Address)],
}

impl ChainDescriptor {
    /// Deployed Gateway address for a contract version, if any.
    pub fn contract_address(&self, version: ContractVersion) -> Option<Address> {
        self.contracts
            .iter()
            .find(|(v, _)| *v == version)
            .map(|(_, addr)| *addr)
    }
}

/// Display metadata for an accepted settlement token. Defined at build
/// time, looked up at render time, never mutated.
#[derive(Debug)]
pub struct TokenDescriptor {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub address: Address,
    pub icon: &'static str,
}

const GATEWAY_V0: Address = address!("792a00E52B858E913d20B364D06CF89865Ad3f9b");

pub static MONAD_TESTNET: ChainDescriptor = ChainDescriptor {
    id: 10143,
    name: "Monad Testnet",
    native_symbol: "MON",
    rpc_urls: &[
        "https://rpc.ankr.com/monad_testnet",
        "https://testnet-rpc.monad.xyz",
        "https://rpc-testnet.monadinfra.com",
    ],
    contracts: &[(ContractVersion::V0, GATEWAY_V0)],
};

pub static BASE: ChainDescriptor = ChainDescriptor {
    id: 8453,
    name: "Base",
    native_symbol: "ETH",
    rpc_urls: &["https://mainnet.base.org"],
    contracts: &[(ContractVersion::V0, GATEWAY_V0)],
};

static CHAINS: &[&ChainDescriptor] = &[&MONAD_TESTNET, &BASE];

static MONAD_TOKENS: &[TokenDescriptor] = &[
    TokenDescriptor {
        name: "USDC",
        symbol: "$",
        decimals: 6,
        address: address!("f817257fed379853cDe0fa4F97AB987181B1E5Ea"),
        icon: "usdc-logo.svg",
    },
    TokenDescriptor {
        name: "MONAD",
        symbol: "MON",
        decimals: 18,
        address: Address::ZERO,
        icon: "monad-logo.svg",
    },
];

static BASE_TOKENS: &[TokenDescriptor] = &[
    TokenDescriptor {
        name: "USDC",
        symbol: "$",
        decimals: 6,
        address: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        icon: "usdc-logo.svg",
    },
    TokenDescriptor {
        name: "ETH",
        symbol: "ETH",
        decimals: 18,
        address: Address::ZERO,
        icon: "base-logo.svg",
    },
];

/// The chain used when nothing is persisted or the persisted id is unknown.
pub fn default_chain() -> &'static ChainDescriptor {
    &MONAD_TESTNET
}

pub fn descriptor_for(chain_id: u64) -> Option<&'static ChainDescriptor> {
    CHAINS.iter().copied().find(|c| c.id == chain_id)
}

/// Settlement tokens accepted on a chain. Empty for unknown chains.
pub fn tokens_for(chain_id: u64) -> &'static [TokenDescriptor] {
    match chain_id {
        id if id == MONAD_TESTNET.id => MONAD_TOKENS,
        id if id == BASE.id => BASE_TOKENS,
        _ => &[],
    }
}

pub fn find_token(chain_id: u64, token: Address) -> Option<&'static TokenDescriptor> {
    tokens_for(chain_id).iter().find(|t| t.address == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(descriptor_for(10143).unwrap().name, "Monad Testnet");
        assert_eq!(descriptor_for(8453).unwrap().name, "Base");
        assert!(descriptor_for(1).is_none());
    }

    #[test]
    fn test_native_token_is_zero_address() {
        let native = find_token(10143, Address::ZERO).unwrap();
        assert_eq!(native.symbol, "MON");
        assert_eq!(native.decimals, 18);

        let native = find_token(8453, Address::ZERO).unwrap();
        assert_eq!(native.symbol, "ETH");
    }

    #[test]
    fn test_unknown_token_unresolved() {
        assert!(find_token(10143, address!("00000000000000000000000000000000000000ff")).is_none());
        assert!(find_token(1, Address::ZERO).is_none());
    }

    #[test]
    fn test_contract_address_versioned() {
        assert!(MONAD_TESTNET.contract_address(ContractVersion::V0).is_some());
        assert_eq!(ContractVersion::parse("V0"), Some(ContractVersion::V0));
        assert_eq!(ContractVersion::parse("V1"), None);
    }
}
