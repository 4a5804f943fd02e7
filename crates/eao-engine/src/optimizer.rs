//! Optimizer seam.
//!
//! The session only needs [`Optimizer`]; the real dispatch optimisation lives
//! outside this workspace. [`PriceTakerDispatch`] is a small stand-in that
//! lets the server run end to end: contracts trade against their price series
//! step by step, every other asset stays idle when that is feasible.

use chrono::NaiveDateTime;
use eao_core::{Asset, CostSpec, Portfolio, SimpleContract, TimeSeries, Timegrid};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Unsupported solver: {0}")]
    UnsupportedSolver(String),

    #[error("Asset '{asset}' needs time series '{tag}', which was not provided")]
    MissingSeries { asset: String, tag: String },

    #[error("Time series '{tag}' has {len} values but the timegrid has {steps} steps")]
    SeriesTooShort { tag: String, len: usize, steps: usize },

    #[error("Asset '{asset}' is infeasible: {reason}")]
    Infeasible { asset: String, reason: String },
}

/// Per-asset dispatch on the timegrid plus the portfolio value.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub value: f64,
    pub time_index: Vec<NaiveDateTime>,
    /// One column per asset, in portfolio order.
    pub dispatch: Vec<(String, Vec<f64>)>,
}

impl DispatchResult {
    /// Keys of [`DispatchResult::summary`] that are not asset columns.
    pub const AGGREGATE_KEYS: [&'static str; 2] = ["total value", "time_index"];

    /// Flat JSON summary: total value, formatted time index and one array per column.
    pub fn summary(&self) -> Value {
        let mut out = Map::new();
        let [value_key, index_key] = Self::AGGREGATE_KEYS;
        out.insert(value_key.to_string(), json!(self.value));
        out.insert(
            index_key.to_string(),
            json!(self
                .time_index
                .iter()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .collect::<Vec<_>>()),
        );
        for (column, values) in &self.dispatch {
            out.insert(column.clone(), json!(values));
        }
        Value::Object(out)
    }
}

pub trait Optimizer: Send + Sync {
    /// Solver names accepted by [`Optimizer::solve`].
    fn solvers(&self) -> &[&'static str];

    fn solve(
        &self,
        portfolio: &Portfolio,
        timegrid: &Timegrid,
        series: &TimeSeries,
        solver: &str,
    ) -> Result<DispatchResult, SolveError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PriceTakerDispatch;

impl Optimizer for PriceTakerDispatch {
    fn solvers(&self) -> &[&'static str] {
        &["standard", "price-taker"]
    }

    fn solve(
        &self,
        portfolio: &Portfolio,
        timegrid: &Timegrid,
        series: &TimeSeries,
        solver: &str,
    ) -> Result<DispatchResult, SolveError> {
        if !self.solvers().contains(&solver) {
            return Err(SolveError::UnsupportedSolver(solver.to_string()));
        }

        let time_index = timegrid.timestamps();
        let mut value = 0.0;
        let mut dispatch = Vec::with_capacity(portfolio.assets.len());

        for asset in &portfolio.assets {
            let (column, asset_value) = match asset {
                Asset::SimpleContract(contract) => {
                    trade_contract(contract, &time_index, series)?
                }
                other => (idle(other, time_index.len())?, 0.0),
            };
            debug!(asset = asset.name(), value = asset_value, "dispatched");
            value += asset_value;
            dispatch.push((asset.name().to_string(), column));
        }

        Ok(DispatchResult {
            value,
            time_index,
            dispatch,
        })
    }
}

fn lookup<'a>(
    asset: &str,
    tag: &str,
    series: &'a TimeSeries,
    steps: usize,
) -> Result<&'a [f64], SolveError> {
    let values = series.get(tag).ok_or_else(|| SolveError::MissingSeries {
        asset: asset.to_string(),
        tag: tag.to_string(),
    })?;
    if values.len() < steps {
        return Err(SolveError::SeriesTooShort {
            tag: tag.to_string(),
            len: values.len(),
            steps,
        });
    }
    Ok(values)
}

/// Picks, per step, the volume in `[min_cap, max_cap]` maximising
/// `-price * x - extra_costs * |x|`.
fn trade_contract(
    contract: &SimpleContract,
    time_index: &[NaiveDateTime],
    series: &TimeSeries,
) -> Result<(Vec<f64>, f64), SolveError> {
    let name = contract.base.name.as_str();
    if contract.min_cap > contract.max_cap {
        return Err(SolveError::Infeasible {
            asset: name.to_string(),
            reason: format!("min_cap {} exceeds max_cap {}", contract.min_cap, contract.max_cap),
        });
    }

    let steps = time_index.len();
    let prices = match &contract.price {
        Some(tag) => Some(lookup(name, tag, series, steps)?),
        None => None,
    };
    let extra = match &contract.extra_costs {
        CostSpec::Tag(tag) => Some(lookup(name, tag, series, steps)?),
        CostSpec::Value(_) => None,
    };

    let mut column = Vec::with_capacity(steps);
    let mut total = 0.0;
    for (t, stamp) in time_index.iter().enumerate() {
        if !contract.base.is_active(*stamp) {
            column.push(0.0);
            continue;
        }
        let price = prices.map_or(0.0, |p| p[t]);
        let cost = match (&contract.extra_costs, extra) {
            (_, Some(e)) => e[t],
            (CostSpec::Value(v), None) => *v,
            (CostSpec::Tag(_), None) => 0.0,
        };
        let cash = |x: f64| -price * x - cost * x.abs();

        // Ties resolve to the first candidate, so staying flat wins when feasible.
        let mut candidates = Vec::with_capacity(3);
        if contract.min_cap <= 0.0 && contract.max_cap >= 0.0 {
            candidates.push(0.0);
        }
        candidates.extend([contract.min_cap, contract.max_cap]);
        let best = candidates
            .into_iter()
            .fold(None, |best: Option<f64>, x| match best {
                Some(b) if cash(b) >= cash(x) => Some(b),
                _ => Some(x),
            })
            .unwrap_or(0.0);

        total += cash(best);
        column.push(best);
    }
    Ok((column, total))
}

fn idle(asset: &Asset, steps: usize) -> Result<Vec<f64>, SolveError> {
    let infeasible = |reason: String| SolveError::Infeasible {
        asset: asset.name().to_string(),
        reason,
    };
    match asset {
        Asset::Storage(s) if (s.start_level - s.end_level).abs() > f64::EPSILON => {
            Err(infeasible(format!(
                "storage must move from level {} to {}",
                s.start_level, s.end_level
            )))
        }
        Asset::MultiCommodityContract(m) if m.min_cap > 0.0 || m.max_cap < 0.0 => Err(infeasible(
            format!("capacity band [{}, {}] excludes zero", m.min_cap, m.max_cap),
        )),
        Asset::Transport(t) if t.min_cap > 0.0 => Err(infeasible(format!(
            "minimum transport of {} cannot be met",
            t.min_cap
        ))),
        _ => Ok(vec![0.0; steps]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use eao_core::{AssetBase, Frequency, Node, Storage};
    use std::collections::BTreeMap;

    fn grid(days: u32) -> Timegrid {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 1 + days).unwrap().and_hms_opt(0, 0, 0).unwrap();
        Timegrid::new(start, end, Frequency::Day)
    }

    fn contract(name: &str, price: &str) -> Asset {
        Asset::SimpleContract(SimpleContract {
            base: AssetBase::new(name, vec![Node::new("n").into()]),
            price: Some(price.to_string()),
            min_cap: -5.0,
            max_cap: 10.0,
            extra_costs: CostSpec::Value(0.0),
        })
    }

    fn prices(values: Vec<f64>) -> TimeSeries {
        TimeSeries::new(BTreeMap::from([("p".to_string(), values)]))
    }

    #[test]
    fn contract_buys_when_cheap_and_sells_when_dear() {
        let portf = Portfolio::new(vec![contract("c", "p")]);
        let result = PriceTakerDispatch
            .solve(&portf, &grid(3), &prices(vec![-1.0, 2.0, 0.0]), "standard")
            .unwrap();

        assert_eq!(result.dispatch[0].1, vec![10.0, -5.0, 0.0]);
        assert_eq!(result.value, 10.0 + 10.0);
        assert_eq!(result.time_index.len(), 3);
    }

    #[test]
    fn missing_or_short_series_fail() {
        let portf = Portfolio::new(vec![contract("c", "other")]);
        assert!(matches!(
            PriceTakerDispatch.solve(&portf, &grid(2), &prices(vec![1.0, 1.0]), "standard"),
            Err(SolveError::MissingSeries { .. })
        ));

        let portf = Portfolio::new(vec![contract("c", "p")]);
        assert!(matches!(
            PriceTakerDispatch.solve(&portf, &grid(3), &prices(vec![1.0]), "standard"),
            Err(SolveError::SeriesTooShort { len: 1, steps: 3, .. })
        ));
    }

    #[test]
    fn unbalanced_storage_is_infeasible() {
        let storage = Asset::Storage(Storage {
            base: AssetBase::new("s", vec![Node::new("n").into()]),
            size: 10.0,
            cap_in: 1.0,
            cap_out: 1.0,
            start_level: 5.0,
            end_level: 0.0,
            eff_in: 1.0,
            eff_out: 1.0,
            block_size: None,
            no_simult_in_out: false,
            price: None,
        });
        let result = PriceTakerDispatch.solve(
            &Portfolio::new(vec![storage]),
            &grid(2),
            &TimeSeries::default(),
            "standard",
        );
        assert!(matches!(result, Err(SolveError::Infeasible { .. })));
    }

    #[test]
    fn unknown_solver_is_rejected() {
        let result = PriceTakerDispatch.solve(
            &Portfolio::default(),
            &grid(1),
            &TimeSeries::default(),
            "SCIP",
        );
        assert_eq!(result, Err(SolveError::UnsupportedSolver("SCIP".into())));
    }

    #[test]
    fn summary_has_one_column_per_asset() {
        let portf = Portfolio::new(vec![contract("c", "p")]);
        let result = PriceTakerDispatch
            .solve(&portf, &grid(2), &prices(vec![1.0, 1.0]), "standard")
            .unwrap();
        let summary = result.summary();
        assert_eq!(summary["time_index"][0], "2021-01-01 00:00:00");
        assert_eq!(summary["c"], json!([-5.0, -5.0]));
        assert_eq!(summary["total value"], json!(10.0));
    }
}
