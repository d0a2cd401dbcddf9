//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `render`: Render config.toml to stdout or a file
//! - `resolve`: Show the resolved configuration
//! - `validate`: Check that settings resolve and render
//! - `apply`: Converge the service on disk
//! - `completions`: Generate shell completion scripts

pub mod apply;
pub mod completions;
pub mod render;
pub mod resolve;
pub mod validate;

pub use apply::ApplyCommand;
pub use completions::CompletionsCommand;
pub use render::RenderCommand;
pub use resolve::ResolveCommand;
pub use validate::ValidateCommand;
