//! Contract bindings for the Vyoman token.
//!
//! The interface is the only description of the contract this workspace
//! needs: the session reads metadata and balances through it and submits
//! transfers through it. Bindings are generated using alloy's `sol!` macro.

pub mod token;
