//! Browser client for the basketball shootout
//!
//! Owns the simulation and the round session, exposes pointer input and
//! flat render buffers to the page, and talks to the page's leaderboard
//! through async callbacks. Drawing itself stays on the JS side.

pub mod fsm;
pub mod hooks;
pub mod render;

#[cfg(target_arch = "wasm32")]
mod client;
#[cfg(target_arch = "wasm32")]
mod store;

#[cfg(target_arch = "wasm32")]
pub use client::HoopClient;
