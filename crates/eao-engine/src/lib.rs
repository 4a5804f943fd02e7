pub mod network;
pub mod optimizer;

pub use network::*;
pub use optimizer::*;
