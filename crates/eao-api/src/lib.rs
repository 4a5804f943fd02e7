pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;
pub use routes::create_router;
pub use server::Server;
pub use state::AppState;
