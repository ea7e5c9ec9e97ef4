//! Tool settings for pipewright.
//!
//! This module defines the Config struct that represents `.pipewright/config.yaml`
//! in the working directory. Unknown fields are ignored for forward
//! compatibility, optional fields have defaults, and values are validated on load.

mod model;
mod operations;
pub mod types;


pub use model::Config;
