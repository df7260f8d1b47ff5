//! HTTP gateway for the Lotka simulator.
//!
//! Routes decode requests into [`lotka_core`] types, run the core on tokio's
//! blocking pool under a wall-clock budget and serialize the result as JSON.
//! No simulation logic lives here.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Welcome message |
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/info` | Model metadata |
//! | `POST` | `/simulate` | Run a simulation |
//! | `POST` | `/equilibrium` | Fixed points and their linearization |
//! | `GET` | `/static/*` | Optional static assets |

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
