pub mod error;
pub mod protocol;
pub mod resolver;
pub mod session;
pub mod store;

pub use error::{Result, SessionError};
pub use protocol::DeleteOutcome;
pub use resolver::{resolve, NodeRegistry};
pub use session::{DocumentDetails, ObjectDetails, Session, SessionSettings};
pub use store::{SessionStore, StoreKey};
