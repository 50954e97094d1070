//! Chain selection and wallet session state.
//!
//! The session owns which chain the client is pointed at, persists that
//! choice across runs, and auto-switches the provider back to the selected
//! chain at most once per wallet connection.

use std::path::PathBuf;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;
use tracing::{info, warn};

use crate::chains::{default_chain, descriptor_for, ChainDescriptor, ContractVersion};

#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("chain {0} is not supported")]
    UnknownChain(u64),
    #[error("no reachable RPC endpoint for chain {0}")]
    NoEndpoint(u64),
    #[error("switch rejected: {0}")]
    Rejected(String),
}

/// The seam between session logic and whatever actually performs a chain
/// switch. The production implementation reconnects an RPC provider; tests
/// substitute a recorder.
pub trait ChainSwitcher {
    fn request_switch(
        &mut self,
        chain_id: u64,
    ) -> impl std::future::Future<Output = Result<(), SwitchError>> + Send;
}

pub struct Session {
    selected: &'static ChainDescriptor,
    version: ContractVersion,
    wallet: Option<Address>,
    auto_switched: bool,
    selection_path: PathBuf,
}

impl Session {
    /// Restore the persisted chain selection, falling back to the default
    /// chain when the file is missing or unreadable.
    pub fn restore(selection_path: PathBuf, version: ContractVersion) -> Self {
        let selected = std::fs::read_to_string(&selection_path)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .and_then(descriptor_for)
            .unwrap_or_else(default_chain);
        info!(chain = selected.id, name = selected.name, "restored chain selection");
        Self {
            selected,
            version,
            wallet: None,
            auto_switched: false,
            selection_path,
        }
    }

    pub fn selected(&self) -> &'static ChainDescriptor {
        self.selected
    }

    pub fn version(&self) -> ContractVersion {
        self.version
    }

    pub fn wallet(&self) -> Option<Address> {
        self.wallet
    }

    /// Switch chains. The switcher runs first; session state and the
    /// persisted selection only change once it succeeds. A successful
    /// switch to an id without a descriptor lands on the default chain.
    pub async fn switch_to_chain<S: ChainSwitcher>(
        &mut self,
        switcher: &mut S,
        chain_id: u64,
    ) -> Result<(), SwitchError> {
        switcher.request_switch(chain_id).await?;
        self.selected = descriptor_for(chain_id).unwrap_or_else(default_chain);
        self.persist();
        info!(chain = self.selected.id, name = self.selected.name, "switched chain");
        Ok(())
    }

    /// Record a wallet connection. If the provider reports a different chain
    /// than the selected one, request a switch back, once per connection.
    pub async fn on_wallet_connected<S: ChainSwitcher>(
        &mut self,
        switcher: &mut S,
        address: Address,
        provider_chain_id: u64,
    ) {
        self.wallet = Some(address);
        if provider_chain_id != self.selected.id && !self.auto_switched {
            self.auto_switched = true;
            info!(
                have = provider_chain_id,
                want = self.selected.id,
                "provider chain differs from selection, switching back"
            );
            if let Err(e) = switcher.request_switch(self.selected.id).await {
                warn!(error = %e, "automatic chain switch failed");
            }
        }
    }

    pub fn on_wallet_disconnected(&mut self) {
        self.wallet = None;
        self.auto_switched = false;
    }

    fn persist(&self) {
        if let Err(e) = std::fs::write(&self.selection_path, self.selected.id.to_string()) {
            warn!(path = %self.selection_path.display(), error = %e, "failed to persist chain selection");
        }
    }
}

/// Production switcher: (re)connects an HTTP provider to the target chain,
/// trying its endpoints in order and verifying the reported chain id.
pub struct RpcSwitcher {
    signer: Option<PrivateKeySigner>,
    rpc_override: Option<String>,
    provider: Option<DynProvider>,
}

impl RpcSwitcher {
    pub fn new(signer: Option<PrivateKeySigner>, rpc_override: Option<String>) -> Self {
        Self {
            signer,
            rpc_override,
            provider: None,
        }
    }

    pub fn provider(&self) -> Option<DynProvider> {
        self.provider.clone()
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    async fn connect_one(&self, url: &str) -> Result<DynProvider, SwitchError> {
        let provider = match &self.signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer.clone()))
                .connect(url)
                .await
                .map_err(|e| SwitchError::Rejected(e.to_string()))?
                .erased(),
            None => ProviderBuilder::new()
                .connect(url)
                .await
                .map_err(|e| SwitchError::Rejected(e.to_string()))?
                .erased(),
        };
        Ok(provider)
    }
}

impl ChainSwitcher for RpcSwitcher {
    async fn request_switch(&mut self, chain_id: u64) -> Result<(), SwitchError> {
        let descriptor = descriptor_for(chain_id).ok_or(SwitchError::UnknownChain(chain_id))?;
        let mut urls: Vec<&str> = Vec::new();
        if let Some(url) = &self.rpc_override {
            urls.push(url);
        }
        urls.extend(descriptor.rpc_urls.iter().copied());

        for url in urls {
            match self.connect_one(url).await {
                Ok(provider) => match provider.get_chain_id().await {
                    Ok(reported) if reported == chain_id => {
                        info!(chain = chain_id, url, "connected");
                        self.provider = Some(provider);
                        return Ok(());
                    }
                    Ok(reported) => {
                        warn!(url, want = chain_id, have = reported, "endpoint serves wrong chain");
                    }
                    Err(e) => {
                        warn!(url, error = %e, "chain id probe failed");
                    }
                },
                Err(e) => {
                    warn!(url, error = %e, "connection failed");
                }
            }
        }
        Err(SwitchError::NoEndpoint(chain_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{BASE, MONAD_TESTNET};

    struct MockSwitcher {
        requests: Vec<u64>,
        fail: bool,
    }

    impl MockSwitcher {
        fn new() -> Self {
            Self {
                requests: Vec::new(),
                fail: false,
            }
        }
    }

    impl ChainSwitcher for MockSwitcher {
        async fn request_switch(&mut self, chain_id: u64) -> Result<(), SwitchError> {
            self.requests.push(chain_id);
            if self.fail {
                Err(SwitchError::Rejected("mock".into()))
            } else {
                Ok(())
            }
        }
    }

    fn session(path: &str) -> Session {
        Session::restore(PathBuf::from(path), ContractVersion::V0)
    }

    #[tokio::test]
    async fn restore_missing_file_uses_default_chain() {
        let s = session("/nonexistent/selection");
        assert_eq!(s.selected().id, default_chain().id);
    }

    #[tokio::test]
    async fn switch_updates_selection_only_on_success() {
        let dir = std::env::temp_dir().join("peerbet-session-test-1");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("selection");
        let mut s = Session::restore(path.clone(), ContractVersion::V0);
        let mut sw = MockSwitcher::new();

        s.switch_to_chain(&mut sw, BASE.id).await.unwrap();
        assert_eq!(s.selected().id, BASE.id);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), BASE.id.to_string());

        // A fresh session picks the persisted selection back up.
        let reloaded = Session::restore(path.clone(), ContractVersion::V0);
        assert_eq!(reloaded.selected().id, BASE.id);

        sw.fail = true;
        assert!(s.switch_to_chain(&mut sw, MONAD_TESTNET.id).await.is_err());
        assert_eq!(s.selected().id, BASE.id);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn unknown_chain_switch_falls_back_to_default() {
        let dir = std::env::temp_dir().join("peerbet-session-test-2");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("selection");
        let mut s = Session::restore(path.clone(), ContractVersion::V0);
        let mut sw = MockSwitcher::new();

        s.switch_to_chain(&mut sw, BASE.id).await.unwrap();
        // The switcher is still asked for the unrecognized id; only the
        // selection falls back.
        s.switch_to_chain(&mut sw, 1).await.unwrap();
        assert_eq!(sw.requests, vec![BASE.id, 1]);
        assert_eq!(s.selected().id, default_chain().id);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            default_chain().id.to_string()
        );

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn failed_switch_to_unknown_chain_leaves_selection_alone() {
        let mut s = session("/nonexistent/selection");
        let mut sw = MockSwitcher::new();
        sw.fail = true;
        assert!(s.switch_to_chain(&mut sw, 1).await.is_err());
        assert_eq!(sw.requests, vec![1]);
        assert_eq!(s.selected().id, default_chain().id);
    }

    #[tokio::test]
    async fn auto_switch_happens_once_per_connection() {
        let mut s = session("/nonexistent/selection");
        let mut sw = MockSwitcher::new();
        let addr = Address::repeat_byte(0x11);
        let selected = s.selected().id;

        s.on_wallet_connected(&mut sw, addr, BASE.id).await;
        assert_eq!(sw.requests, vec![selected]);
        assert_eq!(s.wallet(), Some(addr));

        // Drift again within the same connection: no second attempt.
        s.on_wallet_connected(&mut sw, addr, BASE.id).await;
        assert_eq!(sw.requests.len(), 1);

        // Reconnect re-arms the auto-switch.
        s.on_wallet_disconnected();
        assert_eq!(s.wallet(), None);
        s.on_wallet_connected(&mut sw, addr, BASE.id).await;
        assert_eq!(sw.requests.len(), 2);
    }

    #[tokio::test]
    async fn matching_provider_chain_does_not_switch() {
        let mut s = session("/nonexistent/selection");
        let mut sw = MockSwitcher::new();
        s.on_wallet_connected(&mut sw, Address::repeat_byte(0x22), s.selected().id)
            .await;
        assert!(sw.requests.is_empty());
    }
}
