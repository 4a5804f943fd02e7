//! Keyed document store for the single session.
//!
//! Values are encoded document text. `portf` owns three derived keys that are
//! recomputed under the same write lock as the portfolio itself, so readers
//! never observe a portfolio together with stale derived values.

use eao_core::codec::{self, Kind};
use eao_core::{Asset, Node, Portfolio, SeedDocuments, TimeSeries, Timegrid};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKey {
    Portf,
    Timegrid,
    TimeSeriesData,
    StdNodes,
    StdAssets,
    PortfAssets,
    PortfAssetNames,
    PortfNodes,
}

impl StoreKey {
    pub const ALL: [StoreKey; 8] = [
        StoreKey::Portf,
        StoreKey::Timegrid,
        StoreKey::TimeSeriesData,
        StoreKey::StdNodes,
        StoreKey::StdAssets,
        StoreKey::PortfAssets,
        StoreKey::PortfAssetNames,
        StoreKey::PortfNodes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Portf => "portf",
            StoreKey::Timegrid => "timegrid",
            StoreKey::TimeSeriesData => "time_series_data",
            StoreKey::StdNodes => "std_nodes",
            StoreKey::StdAssets => "std_assets",
            StoreKey::PortfAssets => "portf_assets",
            StoreKey::PortfAssetNames => "portf_asset_names",
            StoreKey::PortfNodes => "portf_nodes",
        }
    }

    pub fn parse(name: &str) -> Option<StoreKey> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Keys recomputed from `portf` and never written by clients.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            StoreKey::PortfAssets | StoreKey::PortfAssetNames | StoreKey::PortfNodes
        )
    }

    /// Keys holding a plain JSON value rather than encoded document text.
    pub fn is_plain_json(self) -> bool {
        matches!(self, StoreKey::PortfAssetNames)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct SessionStore {
    entries: RwLock<BTreeMap<StoreKey, Arc<str>>>,
    seed: SeedDocuments,
}

impl SessionStore {
    /// Creates an empty store; [`SessionStore::reset`] seeds it.
    pub fn new(seed: SeedDocuments) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            seed,
        }
    }

    pub fn reset(&self) {
        let mut entries = self.entries.write();
        entries.clear();
        entries.insert(StoreKey::StdNodes, Arc::from(self.seed.std_nodes()));
        entries.insert(StoreKey::StdAssets, Arc::from(self.seed.std_assets()));
        debug!("store reset to the standard library");
    }

    /// Decodes `text` as the kind `key` holds and stores its canonical encoding.
    pub fn put(&self, key: StoreKey, text: &str) -> Result<()> {
        match key {
            StoreKey::Portf => {
                let portfolio = codec::decode_as::<Portfolio>(text)?;
                self.put_portfolio(&portfolio)
            }
            StoreKey::Timegrid => self.put_single::<Timegrid>(key, text),
            StoreKey::TimeSeriesData => self.put_single::<TimeSeries>(key, text),
            StoreKey::StdNodes => self.put_list::<Node>(key, text),
            StoreKey::StdAssets => self.put_list::<Asset>(key, text),
            derived => Err(SessionError::DerivedKey(derived.to_string())),
        }
    }

    fn put_single<T: Kind + Clone>(&self, key: StoreKey, text: &str) -> Result<()> {
        let doc = codec::decode_as::<T>(text)?.into_document();
        let encoded = codec::encode(&doc)?;
        self.entries.write().insert(key, Arc::from(encoded));
        debug!(key = %key, "stored document");
        Ok(())
    }

    fn put_list<T: Kind + Clone>(&self, key: StoreKey, text: &str) -> Result<()> {
        let items = codec::decode_list_as::<T>(text)?;
        let encoded = codec::encode_list_of(&items)?;
        self.entries.write().insert(key, Arc::from(encoded));
        debug!(key = %key, count = items.len(), "stored document list");
        Ok(())
    }

    fn put_portfolio(&self, portfolio: &Portfolio) -> Result<()> {
        let portf = codec::encode(&portfolio.clone().into_document())?;
        let assets = codec::encode_list_of(&portfolio.assets)?;
        let names = serde_json::to_string(&portfolio.asset_names())
            .map_err(eao_core::CodecError::from)?;
        let nodes = codec::encode_list_of(&portfolio.nodes())?;

        let mut entries = self.entries.write();
        entries.insert(StoreKey::Portf, Arc::from(portf));
        entries.insert(StoreKey::PortfAssets, Arc::from(assets));
        entries.insert(StoreKey::PortfAssetNames, Arc::from(names));
        entries.insert(StoreKey::PortfNodes, Arc::from(nodes));
        drop(entries);

        debug!(assets = portfolio.assets.len(), "stored portfolio and derived keys");
        Ok(())
    }

    pub fn get(&self, key: StoreKey) -> Result<Arc<str>> {
        self.entries
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(format!("key '{key}'")))
    }

    /// Like [`SessionStore::get`], for a key given by name.
    pub fn get_by_name(&self, name: &str) -> Result<Arc<str>> {
        let key = StoreKey::parse(name)
            .ok_or_else(|| SessionError::NotFound(format!("key '{name}'")))?;
        self.get(key)
    }

    /// Populated keys, in a stable order.
    pub fn list_keys(&self) -> Vec<&'static str> {
        self.entries.read().keys().map(|k| k.as_str()).collect()
    }

    pub fn contains(&self, key: StoreKey) -> bool {
        self.entries.read().contains_key(&key)
    }

    pub fn get_as<T: Kind>(&self, key: StoreKey) -> Result<T> {
        let text = self.get(key)?;
        Ok(codec::decode_as::<T>(&text)?)
    }

    pub fn get_list_as<T: Kind>(&self, key: StoreKey) -> Result<Vec<T>> {
        let text = self.get(key)?;
        Ok(codec::decode_list_as::<T>(&text)?)
    }

    /// A missing key reads as an empty list.
    pub fn list_or_empty<T: Kind>(&self, key: StoreKey) -> Result<Vec<T>> {
        match self.get_list_as(key) {
            Err(SessionError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eao_core::StandardLibrary;

    fn store() -> SessionStore {
        SessionStore::new(StandardLibrary::builtin().seed().unwrap())
    }

    #[test]
    fn new_store_is_empty_until_reset() {
        let store = store();
        assert!(store.list_keys().is_empty());
        store.reset();
        assert_eq!(store.list_keys(), ["std_nodes", "std_assets"]);
    }

    #[test]
    fn unknown_and_missing_keys_are_not_found() {
        let store = store();
        store.reset();
        assert!(matches!(store.get(StoreKey::Portf), Err(SessionError::NotFound(_))));
        assert!(matches!(store.get_by_name("nope"), Err(SessionError::NotFound(_))));
        assert!(store.get_by_name("std_nodes").is_ok());
    }

    #[test]
    fn derived_keys_cannot_be_written() {
        let store = store();
        let err = store.put(StoreKey::PortfNodes, "[]").unwrap_err();
        assert!(matches!(err, SessionError::DerivedKey(k) if k == "portf_nodes"));
    }

    #[test]
    fn put_checks_the_kind_for_the_key() {
        let store = store();
        let node = r#"{"__class__": "Node", "name": "a"}"#;
        assert!(matches!(
            store.put(StoreKey::Timegrid, node),
            Err(SessionError::WrongKind { expected: "Timegrid", found: "Node" })
        ));
        assert!(matches!(
            store.put(StoreKey::Timegrid, "{not json"),
            Err(SessionError::Decode(_))
        ));
        assert!(!store.contains(StoreKey::Timegrid));

        store.put(StoreKey::StdNodes, &format!("[{node}]")).unwrap();
        assert_eq!(store.get_list_as::<Node>(StoreKey::StdNodes).unwrap()[0].name, "a");
    }

    #[test]
    fn empty_portfolio_publishes_empty_derived_lists() {
        let store = store();
        store
            .put(StoreKey::Portf, r#"{"__class__": "Portfolio", "assets": []}"#)
            .unwrap();
        assert_eq!(&*store.get(StoreKey::PortfAssetNames).unwrap(), "[]");
        assert_eq!(&*store.get(StoreKey::PortfNodes).unwrap(), "[]");
        assert!(store.list_or_empty::<Asset>(StoreKey::PortfAssets).unwrap().is_empty());
    }

    #[test]
    fn only_asset_names_are_plain_json() {
        let plain: Vec<_> = StoreKey::ALL.into_iter().filter(|k| k.is_plain_json()).collect();
        assert_eq!(plain, [StoreKey::PortfAssetNames]);
    }
}
