pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod types;

pub use response::assemble;
pub use routes::create_router;
pub use state::AppState;
pub use types::{ClaimResponse, ErrorDetail};
