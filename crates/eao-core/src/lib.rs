pub mod codec;
pub mod config_manager;
pub mod error;
pub mod library;
pub mod model;
pub mod parameters;
pub mod registry;

pub use codec::{Document, Kind, KindMismatch};
pub use config_manager::*;
pub use error::*;
pub use library::*;
pub use model::*;
pub use parameters::*;
pub use registry::{FieldDescriptor, ObjectDescriptor};
