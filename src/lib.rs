pub mod brush;
pub mod config;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod logging;
pub mod pipeline;
pub mod render;
