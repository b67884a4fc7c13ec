//! Asset Registry: which assets are accepted as deposits and trade legs
//!
//! The native-currency sentinel is always valid and never stored. The
//! enumerable listing keeps every asset ever added, in insertion order:
//! delisting clears the validity flag but does not prune the listing, which
//! indexers may rely on.

use std::collections::HashSet;

use escrow_types::ids::AssetId;

use crate::errors::ExchangeError;

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    /// Currently accepted token assets
    listed: HashSet<AssetId>,
    /// Every asset ever added, first-insertion order
    history: Vec<AssetId>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a token asset. Callers enforce ownership first.
    pub fn add(&mut self, asset: AssetId) -> Result<(), ExchangeError> {
        if asset.is_native() {
            return Err(ExchangeError::ZeroAddress);
        }
        if self.listed.contains(&asset) {
            return Err(ExchangeError::AssetAlreadyListed { asset });
        }
        self.listed.insert(asset);
        if !self.history.contains(&asset) {
            self.history.push(asset);
        }
        Ok(())
    }

    /// Stop accepting a token asset for new deposits and orders.
    pub fn remove(&mut self, asset: AssetId) -> Result<(), ExchangeError> {
        if !self.listed.remove(&asset) {
            return Err(ExchangeError::AssetNotListed { asset });
        }
        Ok(())
    }

    pub fn is_valid(&self, asset: AssetId) -> bool {
        asset.is_native() || self.listed.contains(&asset)
    }

    /// Guard run before any mutation that takes an asset argument.
    pub fn ensure_valid(&self, asset: AssetId) -> Result<(), ExchangeError> {
        if !self.is_valid(asset) {
            return Err(ExchangeError::InvalidAsset { asset });
        }
        Ok(())
    }

    /// All assets ever added, including delisted ones.
    pub fn list(&self) -> &[AssetId] {
        &self.history
    }
}
