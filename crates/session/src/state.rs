//! Session state and its transition function.
//!
//! [`transition`] is pure: given the current state and an event it returns the
//! next state plus the effects the driver should carry out. Results of
//! asynchronous work carry the sequence number captured when the work was
//! started; a result whose sequence is no longer current is discarded.

use crate::SessionError;
use alloy_primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use token::{units, CallError};

/// The session account's holding of the loaded token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Amount in the token's smallest unit
    pub raw: U256,
    /// `raw / 10^decimals`, exact
    pub formatted: String,
}

impl Balance {
    pub fn new(raw: U256, decimals: u8) -> Result<Self, units::UnitsError> {
        Ok(Self {
            raw,
            formatted: units::format_units(raw, decimals)?,
        })
    }

    /// Rounded for display, e.g. `1.0000`.
    pub fn display(&self, decimals: u8, places: u8) -> String {
        units::format_fixed(self.raw, decimals, places).unwrap_or_else(|_| self.formatted.clone())
    }
}

/// A loaded contract's identity and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHandle {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Most recent balance of the session account
    pub balance: Balance,
}

/// A validated transfer intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub recipient: Address,
    /// Amount as entered
    pub amount: String,
    /// Amount in the token's smallest unit
    pub raw: U256,
}

/// The transfer currently in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransfer {
    pub seq: u64,
    pub request: TransferRequest,
    /// Set once the wallet has broadcast the transaction
    pub hash: Option<TxHash>,
    pub submitted_at: DateTime<Utc>,
}

/// A confirmed transfer in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub hash: TxHash,
    pub recipient: Address,
    pub amount: String,
    pub raw: U256,
    /// Submission time, not confirmation time
    pub timestamp: DateTime<Utc>,
}

impl TransferRecord {
    pub fn new(hash: TxHash, request: &TransferRequest, submitted_at: DateTime<Utc>) -> Self {
        Self {
            hash,
            recipient: request.recipient,
            amount: request.amount.clone(),
            raw: request.raw,
            timestamp: submitted_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting {
        seq: u64,
    },
    /// Connected with no token loaded.
    Connected,
    TokenLoading {
        address: Address,
        seq: u64,
        /// Token that was loaded before this load started, restored if the
        /// load is cancelled.
        superseded: Option<TokenHandle>,
    },
    TokenLoaded,
    TransferPending {
        transfer: PendingTransfer,
    },
}

impl Phase {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting { .. } => "connecting",
            Self::Connected => "connected",
            Self::TokenLoading { .. } => "loading token",
            Self::TokenLoaded => "token loaded",
            Self::TransferPending { .. } => "transfer pending",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub account: Option<Address>,
    pub token: Option<TokenHandle>,
    /// Confirmed transfers, oldest first
    pub history: Vec<TransferRecord>,
    /// Last failure, shown until replaced or dismissed
    pub error: Option<SessionError>,
    /// Last success message
    pub notice: Option<String>,
    /// Sequence of the most recently started connect, load or transfer
    pub seq: u64,
}

impl SessionState {
    pub const fn is_connected(&self) -> bool {
        !matches!(self.phase, Phase::Disconnected | Phase::Connecting { .. })
    }

    /// Whether a load or transfer is in flight.
    pub const fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            Phase::Connecting { .. } | Phase::TokenLoading { .. } | Phase::TransferPending { .. }
        )
    }

    pub const fn pending_transfer(&self) -> Option<&PendingTransfer> {
        match &self.phase {
            Phase::TransferPending { transfer } => Some(transfer),
            _ => None,
        }
    }
}

/// Inputs to the state machine: user intents and collaborator results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ConnectRequested,
    AccountsGranted {
        seq: u64,
        account: Address,
    },
    ConnectFailed {
        seq: u64,
        error: SessionError,
    },
    LoadRequested {
        address: Address,
    },
    TokenFetched {
        seq: u64,
        token: TokenHandle,
    },
    LoadFailed {
        seq: u64,
        cause: CallError,
    },
    LoadCancelled,
    TransferRequested {
        request: TransferRequest,
        submitted_at: DateTime<Utc>,
    },
    TransferSubmitted {
        seq: u64,
        hash: TxHash,
    },
    TransferConfirmed {
        seq: u64,
        hash: TxHash,
        /// Balance refetched after confirmation
        balance: Result<Balance, CallError>,
    },
    TransferFailed {
        seq: u64,
        cause: CallError,
    },
    BalanceFetched {
        seq: u64,
        balance: Balance,
    },
    RefreshFailed {
        seq: u64,
        cause: CallError,
    },
    /// An operation was refused before any work started.
    Rejected {
        error: SessionError,
    },
    Disconnect,
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Work the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RequestAccounts,
    FetchToken { address: Address, seq: u64 },
    SubmitTransfer { recipient: Address, raw: U256 },
    AwaitConfirmation { hash: TxHash },
    Notify(Notice),
    /// The event belonged to superseded work and changed nothing.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: SessionState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    fn discard(state: &SessionState) -> Self {
        Self {
            state: state.clone(),
            effects: vec![Effect::Discarded],
        }
    }

    pub fn is_discarded(&self) -> bool {
        self.effects.contains(&Effect::Discarded)
    }
}

fn failed(mut state: SessionState, error: SessionError) -> Transition {
    let notice = Notice::Error(error.to_string());
    state.error = Some(error);
    state.notice = None;
    Transition::to(state, vec![Effect::Notify(notice)])
}

fn succeeded(mut state: SessionState, message: &str, mut effects: Vec<Effect>) -> Transition {
    state.error = None;
    state.notice = Some(message.to_string());
    effects.push(Effect::Notify(Notice::Success(message.to_string())));
    Transition::to(state, effects)
}

/// Compute the state following `event`.
///
/// User intents that the current phase does not allow are refused with
/// [`SessionError::InvalidState`]. Results of superseded work never fail;
/// they yield the unchanged state and [`Effect::Discarded`].
pub fn transition(state: &SessionState, event: Event) -> Result<Transition, SessionError> {
    let mut next = state.clone();

    let transition = match event {
        Event::ConnectRequested => {
            if state.phase != Phase::Disconnected {
                return Err(SessionError::invalid_state("connect", state.phase.name()));
            }
            next.seq = state.seq + 1;
            next.phase = Phase::Connecting { seq: next.seq };
            next.error = None;
            Transition::to(next, vec![Effect::RequestAccounts])
        }

        Event::AccountsGranted { seq, account } => {
            if !is_connecting(state, seq) {
                return Ok(Transition::discard(state));
            }
            next.phase = Phase::Connected;
            next.account = Some(account);
            succeeded(next, "Wallet connected", vec![])
        }

        Event::ConnectFailed { seq, error } => {
            if !is_connecting(state, seq) {
                return Ok(Transition::discard(state));
            }
            next.phase = Phase::Disconnected;
            failed(next, error)
        }

        Event::LoadRequested { address } => {
            let superseded = match &state.phase {
                Phase::Connected => None,
                Phase::TokenLoaded => state.token.clone(),
                Phase::TokenLoading { superseded, .. } => superseded.clone(),
                phase => return Err(SessionError::invalid_state("load a token", phase.name())),
            };
            next.seq = state.seq + 1;
            next.phase = Phase::TokenLoading {
                address,
                seq: next.seq,
                superseded,
            };
            next.token = None;
            next.error = None;
            let seq = next.seq;
            Transition::to(next, vec![Effect::FetchToken { address, seq }])
        }

        Event::TokenFetched { seq, token } => {
            if !is_loading(state, seq) {
                return Ok(Transition::discard(state));
            }
            next.phase = Phase::TokenLoaded;
            next.token = Some(token);
            succeeded(next, "Contract loaded", vec![])
        }

        Event::LoadFailed { seq, cause } => {
            if !is_loading(state, seq) {
                return Ok(Transition::discard(state));
            }
            next.phase = Phase::Connected;
            next.token = None;
            failed(next, SessionError::ContractLoadFailed(cause))
        }

        Event::LoadCancelled => {
            let Phase::TokenLoading { superseded, .. } = &state.phase else {
                return Err(SessionError::invalid_state("cancel a load", state.phase.name()));
            };
            // Bumping the sequence turns the in-flight load's result stale.
            next.seq = state.seq + 1;
            next.token = superseded.clone();
            next.phase = if next.token.is_some() {
                Phase::TokenLoaded
            } else {
                Phase::Connected
            };
            Transition::to(next, vec![])
        }

        Event::TransferRequested {
            request,
            submitted_at,
        } => {
            if state.phase != Phase::TokenLoaded || state.token.is_none() {
                return Err(SessionError::invalid_state("transfer", state.phase.name()));
            }
            next.seq = state.seq + 1;
            let effect = Effect::SubmitTransfer {
                recipient: request.recipient,
                raw: request.raw,
            };
            next.phase = Phase::TransferPending {
                transfer: PendingTransfer {
                    seq: next.seq,
                    request,
                    hash: None,
                    submitted_at,
                },
            };
            next.error = None;
            next.notice = None;
            Transition::to(next, vec![effect])
        }

        Event::TransferSubmitted { seq, hash } => {
            let Phase::TransferPending { transfer } = &mut next.phase else {
                return Ok(Transition::discard(state));
            };
            if transfer.seq != seq {
                return Ok(Transition::discard(state));
            }
            transfer.hash = Some(hash);
            Transition::to(next, vec![Effect::AwaitConfirmation { hash }])
        }

        Event::TransferConfirmed { seq, hash, balance } => {
            let Some(transfer) = pending_with_seq(state, seq) else {
                return Ok(Transition::discard(state));
            };
            next.history
                .push(TransferRecord::new(hash, &transfer.request, transfer.submitted_at));
            next.phase = Phase::TokenLoaded;
            match balance {
                Ok(balance) => {
                    if let Some(token) = next.token.as_mut() {
                        token.balance = balance;
                    }
                    succeeded(next, "Transfer successful", vec![])
                }
                // The transfer itself went through; only the display is stale.
                Err(cause) => failed(
                    next,
                    SessionError::Network(format!(
                        "transfer confirmed but balance refresh failed: {cause}"
                    )),
                ),
            }
        }

        Event::TransferFailed { seq, cause } => {
            if pending_with_seq(state, seq).is_none() {
                return Ok(Transition::discard(state));
            }
            next.phase = Phase::TokenLoaded;
            failed(next, SessionError::TransferFailed(cause))
        }

        Event::BalanceFetched { seq, balance } => {
            if state.phase != Phase::TokenLoaded || state.seq != seq {
                return Ok(Transition::discard(state));
            }
            if let Some(token) = next.token.as_mut() {
                token.balance = balance;
            }
            Transition::to(next, vec![])
        }

        Event::RefreshFailed { seq, cause } => {
            if state.phase != Phase::TokenLoaded || state.seq != seq {
                return Ok(Transition::discard(state));
            }
            failed(next, SessionError::Network(cause.to_string()))
        }

        Event::Rejected { error } => failed(next, error),

        Event::Disconnect => {
            let was_connected = state.phase != Phase::Disconnected;
            // Everything goes except the sequence, which must keep growing so
            // results of work started before the disconnect stay stale.
            next = SessionState {
                seq: state.seq + 1,
                ..SessionState::default()
            };
            if was_connected {
                succeeded(next, "Disconnected", vec![])
            } else {
                Transition::to(next, vec![])
            }
        }

        Event::Dismiss => {
            next.error = None;
            next.notice = None;
            Transition::to(next, vec![])
        }
    };

    Ok(transition)
}

fn is_connecting(state: &SessionState, seq: u64) -> bool {
    matches!(state.phase, Phase::Connecting { seq: current } if current == seq)
}

fn is_loading(state: &SessionState, seq: u64) -> bool {
    matches!(state.phase, Phase::TokenLoading { seq: current, .. } if current == seq)
}

fn pending_with_seq(state: &SessionState, seq: u64) -> Option<&PendingTransfer> {
    state.pending_transfer().filter(|transfer| transfer.seq == seq)
}
