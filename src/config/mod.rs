//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or none
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → lifecycle::startup builds the RouteTable from `routes`
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Omitting `routes` registers the built-in routes; `routes = []` registers none
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AppConfig, ListenerConfig, ObservabilityConfig, RouteConfig, TimeoutConfig};
pub use validation::ValidationError;
