//! Browsing session module
//!
//! This module owns everything that drives the rendered page:
//! - The `Renderer` abstraction over a page-rendering engine
//! - A headless Chrome renderer
//! - A scripted renderer for tests (`test-util` feature)
//! - The authenticated `Session` that every navigation goes through

mod auth;
mod chrome;
mod renderer;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use auth::{AuthState, Condition, Session};
pub use chrome::ChromeRenderer;
pub use renderer::Renderer;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::{RendererCall, ScriptedRenderer};

#[cfg(test)]
pub(crate) use auth::tests::{test_config, BASE};
