use eao_core::codec::Kind;
use eao_core::registry::{self, ObjectDescriptor};
use eao_core::{CodecError, Document, EaoConfig, ParameterDetails, ParameterTree, Portfolio, SeedDocuments, TimeSeries, Timegrid};
use eao_engine::{
    CircularLayout, DispatchResult, GraphProjector, NetworkView, Optimizer, PriceTakerDispatch,
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::store::{SessionStore, StoreKey};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Largest timegrid, in steps, that `optimize` accepts.
    pub max_steps: usize,
    pub default_solver: String,
}

impl From<&EaoConfig> for SessionSettings {
    fn from(config: &EaoConfig) -> Self {
        Self {
            max_steps: config.optimizer.max_steps,
            default_solver: config.optimizer.default_solver.clone(),
        }
    }
}

/// Parameter view of one document plus the field table of its kind.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetails {
    #[serde(flatten)]
    pub details: ParameterDetails,
    pub arguments: Option<&'static ObjectDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ObjectDetails {
    Catalogue(Vec<&'static str>),
    Object(&'static ObjectDescriptor),
}

/// The one editing session the server hosts.
pub struct Session {
    pub(crate) store: SessionStore,
    optimizer: Arc<dyn Optimizer>,
    projector: Arc<dyn GraphProjector>,
    settings: SessionSettings,
    solver: RwLock<String>,
}

impl Session {
    pub fn new(
        seed: SeedDocuments,
        optimizer: Arc<dyn Optimizer>,
        projector: Arc<dyn GraphProjector>,
        settings: SessionSettings,
    ) -> Result<Self> {
        check_solver(optimizer.as_ref(), &settings.default_solver)?;
        Ok(Self {
            store: SessionStore::new(seed),
            optimizer,
            projector,
            solver: RwLock::new(settings.default_solver.clone()),
            settings,
        })
    }

    /// Session backed by the bundled optimizer and layout.
    pub fn with_defaults(seed: SeedDocuments, settings: SessionSettings) -> Result<Self> {
        Self::new(
            seed,
            Arc::new(PriceTakerDispatch),
            Arc::new(CircularLayout),
            settings,
        )
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Clears every key, reseeds the standard library and restores the default solver.
    pub fn reset(&self) {
        self.store.reset();
        *self.solver.write() = self.settings.default_solver.clone();
        info!("Session reset");
    }

    pub fn list_keys(&self) -> Vec<&'static str> {
        self.store.list_keys()
    }

    pub fn get(&self, key: &str) -> Result<Arc<str>> {
        self.store.get_by_name(key)
    }

    /// The value under `key` as clients read it: encoded documents as a JSON
    /// string, plain JSON keys as the value itself.
    pub fn get_data(&self, key: &str) -> Result<Value> {
        let text = self.store.get_by_name(key)?;
        if StoreKey::parse(key).is_some_and(StoreKey::is_plain_json) {
            Ok(serde_json::from_str(&text).map_err(CodecError::from)?)
        } else {
            Ok(Value::String(text.to_string()))
        }
    }

    pub fn asset_details(&self, name: &str) -> Result<DocumentDetails> {
        let portfolio = self.store.get_as::<Portfolio>(StoreKey::Portf)?;
        let asset = portfolio
            .asset(name)
            .ok_or_else(|| SessionError::NotFound(format!("asset '{name}'")))?;
        let arguments = registry::lookup(asset.kind());
        let details = ParameterTree::read(&Document::Asset(asset.clone()))?;
        Ok(DocumentDetails { details, arguments })
    }

    pub fn portfolio_details(&self) -> Result<DocumentDetails> {
        let portfolio = self.store.get_as::<Portfolio>(StoreKey::Portf)?;
        let details = ParameterTree::read(&portfolio.into_document())?;
        Ok(DocumentDetails {
            details,
            arguments: registry::lookup(Portfolio::KIND),
        })
    }

    /// Field table for `kind`, or the list of known kinds when `kind` is `None`.
    pub fn object_details(&self, kind: Option<&str>) -> Result<ObjectDetails> {
        match kind {
            None => Ok(ObjectDetails::Catalogue(registry::catalogue())),
            Some(kind) => registry::lookup(kind)
                .map(ObjectDetails::Object)
                .ok_or_else(|| SessionError::NotFound(format!("object kind '{kind}'"))),
        }
    }

    pub fn solver(&self) -> String {
        self.solver.read().clone()
    }

    pub fn set_solver(&self, name: &str) -> Result<()> {
        check_solver(self.optimizer.as_ref(), name)?;
        *self.solver.write() = name.to_string();
        info!("Solver set to {}", name);
        Ok(())
    }

    pub fn network(&self) -> Result<NetworkView> {
        let portfolio = self.store.get_as::<Portfolio>(StoreKey::Portf)?;
        Ok(self.projector.project(&portfolio))
    }

    /// Runs the optimizer on the stored portfolio, timegrid and time series.
    ///
    /// Blocks for as long as the optimizer does; async callers should move it
    /// off the runtime.
    pub fn optimize(&self) -> Result<Value> {
        let portfolio = self.store.get_as::<Portfolio>(StoreKey::Portf)?;
        let timegrid = self.store.get_as::<Timegrid>(StoreKey::Timegrid)?;
        let series = match self.store.get_as::<TimeSeries>(StoreKey::TimeSeriesData) {
            Err(SessionError::NotFound(_)) => TimeSeries::default(),
            other => other?,
        };

        // Asset columns share the summary object with the aggregates.
        if let Some(asset) = portfolio
            .assets
            .iter()
            .find(|a| DispatchResult::AGGREGATE_KEYS.iter().any(|k| *k == a.name()))
        {
            return Err(SessionError::ReservedName(asset.name().to_string()));
        }

        let steps = timegrid.step_count();
        if steps > self.settings.max_steps {
            warn!(steps, max = self.settings.max_steps, "Timegrid too large to optimise");
            return Err(SessionError::CapacityExceeded {
                steps,
                max: self.settings.max_steps,
            });
        }

        let solver = self.solver();
        info!(steps, assets = portfolio.assets.len(), solver = %solver, "Optimising portfolio");
        let result = self.optimizer.solve(&portfolio, &timegrid, &series, &solver)?;
        info!(value = result.value, "Optimisation finished");
        Ok(result.summary())
    }
}

fn check_solver(optimizer: &dyn Optimizer, name: &str) -> Result<()> {
    if optimizer.solvers().contains(&name) {
        Ok(())
    } else {
        Err(SessionError::UnknownSolver {
            name: name.to_string(),
            available: optimizer.solvers().join(", "),
        })
    }
}
