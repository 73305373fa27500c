use crate::{
    address::parse_address,
    state::{
        transition, Balance, Effect, Event, Notice, Phase, SessionState, TokenHandle,
        TransferRecord, TransferRequest,
    },
    Outcome, SessionError,
};
use alloy_primitives::{Address, U256};
use chrono::Utc;
use client::WalletProvider;
use std::sync::{Mutex, MutexGuard, PoisonError};
use token::{units, CallError, PendingTransaction, TokenClient, TokenClientFactory};
use tracing::{debug, info, warn};

/// Drives the session state machine against a wallet and a token client
/// factory.
///
/// All operations take `&self`: state lives behind a lock that is only held
/// between suspension points, so operations may overlap and the sequence
/// guard decides which results are applied.
pub struct Session<W, F> {
    wallet: W,
    clients: F,
    state: Mutex<SessionState>,
}

impl<W, F> Session<W, F>
where
    W: WalletProvider,
    F: TokenClientFactory,
{
    pub fn new(wallet: W, clients: F) -> Self {
        Self {
            wallet,
            clients,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Request account access from the wallet.
    ///
    /// If the session disconnects before the wallet answers, the answer is
    /// dropped and [`Outcome::Superseded`] is returned.
    pub async fn connect(&self) -> Result<Outcome<Address>, SessionError> {
        let seq = {
            let mut state = self.lock();
            commit(&mut state, Event::ConnectRequested).map_err(|e| reject(&mut state, e))?;
            state.seq
        };

        match self.wallet.request_accounts().await {
            Ok(account) => {
                if is_discarded(&self.apply(Event::AccountsGranted { seq, account })?) {
                    debug!(seq, "Connect superseded");
                    return Ok(Outcome::Superseded);
                }
                info!(account = %account, "Wallet connected");
                Ok(Outcome::Committed(account))
            }
            Err(err) => {
                let error = SessionError::from(err);
                let effects = self.apply(Event::ConnectFailed {
                    seq,
                    error: error.clone(),
                })?;
                if is_discarded(&effects) {
                    return Ok(Outcome::Superseded);
                }
                Err(error)
            }
        }
    }

    /// Load the token at `address`, replacing any loaded token.
    ///
    /// Reads name, symbol, decimals and the account balance in that order.
    /// If another load starts (or the session disconnects) before this one
    /// finishes, this one stops issuing reads and returns
    /// [`Outcome::Superseded`].
    pub async fn load_token(&self, address: &str) -> Result<Outcome<TokenHandle>, SessionError> {
        let (client, account, seq) = {
            let mut state = self.lock();
            let address = parse_address(address).map_err(|e| reject(&mut state, e))?;
            let Some(account) = state.account else {
                let error = SessionError::invalid_state("load a token", state.phase.name());
                return Err(reject(&mut state, error));
            };
            commit(&mut state, Event::LoadRequested { address })
                .map_err(|e| reject(&mut state, e))?;

            (self.clients.bind(address, account), account, state.seq)
        };

        info!(token = %client.address(), seq, "Loading token");

        let token = match self.fetch_token(&client, account, seq).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!(seq, "Load superseded mid-flight");
                return Ok(Outcome::Superseded);
            }
            Err(cause) => {
                let effects = self.apply(Event::LoadFailed {
                    seq,
                    cause: cause.clone(),
                })?;
                if is_discarded(&effects) {
                    return Ok(Outcome::Superseded);
                }
                return Err(SessionError::ContractLoadFailed(cause));
            }
        };

        let effects = self.apply(Event::TokenFetched {
            seq,
            token: token.clone(),
        })?;
        if is_discarded(&effects) {
            return Ok(Outcome::Superseded);
        }

        info!(
            token = %token.address,
            name = %token.name,
            symbol = %token.symbol,
            decimals = token.decimals,
            balance = %token.balance.formatted,
            "Token loaded"
        );
        Ok(Outcome::Committed(token))
    }

    /// Transfer `amount` (decimal, in whole tokens) of the loaded token to
    /// `recipient` and wait for confirmation.
    ///
    /// The amount is not checked against the known balance; insufficient
    /// funds surface as a reverted transfer.
    pub async fn transfer(
        &self,
        recipient: &str,
        amount: &str,
    ) -> Result<Outcome<TransferRecord>, SessionError> {
        let submitted_at = Utc::now();
        let (client, account, decimals, request, seq) = {
            let mut state = self.lock();
            let Some((account, token)) = loaded_token(&state) else {
                let error = SessionError::invalid_state("transfer", state.phase.name());
                return Err(reject(&mut state, error));
            };
            let request = validate_transfer(recipient, amount, token.decimals)
                .map_err(|e| reject(&mut state, e))?;
            commit(
                &mut state,
                Event::TransferRequested {
                    request: request.clone(),
                    submitted_at,
                },
            )
            .map_err(|e| reject(&mut state, e))?;

            (
                self.clients.bind(token.address, account),
                account,
                token.decimals,
                request,
                state.seq,
            )
        };

        info!(
            token = %client.address(),
            to = %request.recipient,
            amount = %request.amount,
            raw = %request.raw,
            seq,
            "Submitting transfer"
        );

        let pending = match client.transfer(request.recipient, request.raw).await {
            Ok(pending) => pending,
            Err(cause) => return self.fail_transfer(seq, cause),
        };

        let hash = pending.tx_hash();
        if is_discarded(&self.apply(Event::TransferSubmitted { seq, hash })?) {
            return Ok(Outcome::Superseded);
        }
        info!(tx_hash = %hash, "Transfer submitted, waiting for confirmation");

        let confirmation = match pending.confirm().await {
            Ok(confirmation) => confirmation,
            Err(cause) => return self.fail_transfer(seq, cause),
        };

        let balance = client
            .balance_of(account)
            .await
            .and_then(|raw| to_balance(raw, decimals));

        let effects = self.apply(Event::TransferConfirmed {
            seq,
            hash,
            balance,
        })?;
        if is_discarded(&effects) {
            return Ok(Outcome::Superseded);
        }

        info!(
            tx_hash = %hash,
            block_number = confirmation.block_number,
            gas_used = confirmation.gas_used,
            "Transfer confirmed"
        );
        Ok(Outcome::Committed(TransferRecord::new(
            hash,
            &request,
            submitted_at,
        )))
    }

    /// Refetch the account balance of the loaded token.
    pub async fn refresh_balance(&self) -> Result<Outcome<Balance>, SessionError> {
        let (client, account, decimals, seq) = {
            let mut state = self.lock();
            let Some((account, token)) = loaded_token(&state) else {
                let error = SessionError::invalid_state("refresh the balance", state.phase.name());
                return Err(reject(&mut state, error));
            };
            (
                self.clients.bind(token.address, account),
                account,
                token.decimals,
                state.seq,
            )
        };

        let result = client
            .balance_of(account)
            .await
            .and_then(|raw| to_balance(raw, decimals));

        match result {
            Ok(balance) => {
                let effects = self.apply(Event::BalanceFetched {
                    seq,
                    balance: balance.clone(),
                })?;
                if is_discarded(&effects) {
                    return Ok(Outcome::Superseded);
                }
                Ok(Outcome::Committed(balance))
            }
            Err(cause) => {
                let effects = self.apply(Event::RefreshFailed {
                    seq,
                    cause: cause.clone(),
                })?;
                if is_discarded(&effects) {
                    return Ok(Outcome::Superseded);
                }
                Err(SessionError::Network(cause.to_string()))
            }
        }
    }

    /// Abandon the in-flight load, if any, and restore the previous token.
    ///
    /// Returns whether a load was cancelled.
    pub fn cancel_load(&self) -> bool {
        let mut state = self.lock();
        if !matches!(state.phase, Phase::TokenLoading { .. }) {
            return false;
        }
        commit(&mut state, Event::LoadCancelled).is_ok()
    }

    /// Forget the account, token and history. Idempotent.
    pub fn disconnect(&self) {
        if let Err(error) = self.apply(Event::Disconnect) {
            warn!(%error, "Disconnect refused");
        }
    }

    /// Clear the current error and notice.
    pub fn dismiss(&self) {
        if let Err(error) = self.apply(Event::Dismiss) {
            warn!(%error, "Dismiss refused");
        }
    }

    async fn fetch_token(
        &self,
        client: &F::Client,
        account: Address,
        seq: u64,
    ) -> Result<Option<TokenHandle>, CallError> {
        let name = client.name().await?;
        if !self.is_current(seq) {
            return Ok(None);
        }
        let symbol = client.symbol().await?;
        if !self.is_current(seq) {
            return Ok(None);
        }
        let decimals = client.decimals().await?;
        units::scale(decimals).map_err(|e| CallError::Malformed(e.to_string()))?;
        if !self.is_current(seq) {
            return Ok(None);
        }
        let raw = client.balance_of(account).await?;

        Ok(Some(TokenHandle {
            address: client.address(),
            name,
            symbol,
            decimals,
            balance: to_balance(raw, decimals)?,
        }))
    }

    fn fail_transfer(
        &self,
        seq: u64,
        cause: CallError,
    ) -> Result<Outcome<TransferRecord>, SessionError> {
        let effects = self.apply(Event::TransferFailed {
            seq,
            cause: cause.clone(),
        })?;
        if is_discarded(&effects) {
            return Ok(Outcome::Superseded);
        }
        Err(SessionError::TransferFailed(cause))
    }

    fn is_current(&self, seq: u64) -> bool {
        self.lock().seq == seq
    }

    fn apply(&self, event: Event) -> Result<Vec<Effect>, SessionError> {
        commit(&mut self.lock(), event)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Transitions replace the state wholesale, so a poisoned lock still
        // holds a consistent value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn commit(state: &mut SessionState, event: Event) -> Result<Vec<Effect>, SessionError> {
    let transition = transition(state, event)?;
    *state = transition.state;

    for effect in &transition.effects {
        match effect {
            Effect::Notify(Notice::Success(message)) => info!(phase = state.phase.name(), "{message}"),
            Effect::Notify(Notice::Error(message)) => warn!(phase = state.phase.name(), "{message}"),
            Effect::Discarded => debug!(seq = state.seq, "Discarded stale result"),
            _ => {}
        }
    }

    Ok(transition.effects)
}

/// Record a refused operation as the user-visible error and hand it back.
fn reject(state: &mut SessionState, error: SessionError) -> SessionError {
    // Rejected is accepted in every phase.
    let _ = commit(
        state,
        Event::Rejected {
            error: error.clone(),
        },
    );
    error
}

/// Account and token, if a token is loaded and idle.
fn loaded_token(state: &SessionState) -> Option<(Address, TokenHandle)> {
    match (&state.phase, state.account, &state.token) {
        (Phase::TokenLoaded, Some(account), Some(token)) => Some((account, token.clone())),
        _ => None,
    }
}

fn is_discarded(effects: &[Effect]) -> bool {
    effects.contains(&Effect::Discarded)
}

fn to_balance(raw: U256, decimals: u8) -> Result<Balance, CallError> {
    Balance::new(raw, decimals).map_err(|e| CallError::Malformed(e.to_string()))
}

fn validate_transfer(
    recipient: &str,
    amount: &str,
    decimals: u8,
) -> Result<TransferRequest, SessionError> {
    let recipient = parse_address(recipient)?;

    let invalid = |reason: String| SessionError::InvalidAmount {
        amount: amount.to_string(),
        reason,
    };
    let raw = units::parse_units(amount, decimals).map_err(|e| invalid(e.to_string()))?;
    if raw.is_zero() {
        return Err(invalid("amount must be greater than zero".to_string()));
    }

    Ok(TransferRequest {
        recipient,
        amount: amount.trim().to_string(),
        raw,
    })
}
