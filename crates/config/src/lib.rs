//! Configuration types for the Vyoman client.
//!
//! This crate provides:
//! - Network presets (local Hardhat node, Sepolia testnet)
//! - Builder for custom endpoints and chain ids

pub mod network;

pub use network::{NetworkConfig, NetworkConfigBuilder, NetworkType};
