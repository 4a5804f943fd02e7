pub mod asset;
pub mod node;
pub mod portfolio;
pub mod timegrid;
pub mod timeseries;

pub use asset::*;
pub use node::{Node, NodeRef, Unit};
pub use portfolio::*;
pub use timegrid::{Frequency, Timegrid};
pub use timeseries::*;
