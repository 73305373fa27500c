//! Wallet and token session for the Vyoman client.
//!
//! The session is a single state machine mediating wallet connection, token
//! loading and transfer submission:
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> TokenLoading -> TokenLoaded
//!                                                  TokenLoaded <-> TransferPending
//! ```
//!
//! [`state`] holds the serializable state and the pure transition function;
//! [`Session`] drives the wallet and contract collaborators and feeds their
//! results back in as events.

pub mod address;
pub mod controller;
pub mod error;
pub mod state;

pub use address::parse_address;
pub use controller::Session;
pub use error::SessionError;
pub use state::{
    transition, Balance, Effect, Event, Notice, PendingTransfer, Phase, SessionState,
    TokenHandle, TransferRecord, TransferRequest, Transition,
};

/// Result of an operation that may be overtaken by a later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation's result was applied to the session.
    Committed(T),
    /// A later operation (or a disconnect) superseded this one; nothing was
    /// applied.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn committed(self) -> Option<T> {
        match self {
            Self::Committed(value) => Some(value),
            Self::Superseded => None,
        }
    }

    pub const fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}
