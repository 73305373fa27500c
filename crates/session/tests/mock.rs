//! In-memory wallet and token doubles shared across session tests.
#![allow(dead_code)] // each test file uses a different subset

use alloy_primitives::{address, Address, TxHash, B256, U256};
use client::{WalletError, WalletProvider};
use session::Session;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::Notify;
use token::{CallError, Confirmation, PendingTransaction, TokenClient, TokenClientFactory};

pub const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const TOKEN_A: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const TOKEN_B: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

pub const ONE_TOKEN: u64 = 1_000_000_000_000_000_000;

pub type MockSession = Session<MockWallet, MockChain>;

/// Wallet that answers every request the same way.
pub struct MockWallet {
    result: Result<Address, WalletError>,
    requests: AtomicUsize,
}

impl MockWallet {
    pub fn granting(account: Address) -> Self {
        Self {
            result: Ok(account),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: WalletError) -> Self {
        Self {
            result: Err(error),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Address, WalletError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Wallet whose requests each wait at their own gate before answering.
///
/// Answers are handed out in request order.
pub struct GatedWallet {
    answers: Mutex<VecDeque<(Arc<Gate>, Result<Address, WalletError>)>>,
}

impl GatedWallet {
    pub fn new(answers: Vec<Result<Address, WalletError>>) -> (Self, Vec<Arc<Gate>>) {
        let answers: VecDeque<_> = answers
            .into_iter()
            .map(|answer| (Arc::new(Gate::default()), answer))
            .collect();
        let gates = answers.iter().map(|(gate, _)| gate.clone()).collect();
        let wallet = Self {
            answers: Mutex::new(answers),
        };
        (wallet, gates)
    }
}

impl WalletProvider for GatedWallet {
    async fn request_accounts(&self) -> Result<Address, WalletError> {
        let (gate, answer) = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected account request");
        gate.pass().await;
        answer
    }
}

/// Pause point inside a mock call.
///
/// The call signals `entered` and then waits for `release`. Both use stored
/// permits, so the test may release before the call gets there.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Debug, Clone)]
pub struct MockToken {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub balances: HashMap<Address, U256>,
    pub revert_name: bool,
}

impl MockToken {
    pub fn new(symbol: &str, decimals: u8) -> Self {
        Self {
            name: format!("{symbol} Token"),
            symbol: symbol.to_string(),
            decimals,
            balances: HashMap::new(),
            revert_name: false,
        }
    }

    pub fn with_balance(mut self, holder: Address, raw: U256) -> Self {
        self.balances.insert(holder, raw);
        self
    }
}

#[derive(Default)]
struct ChainState {
    tokens: HashMap<Address, MockToken>,
    calls: Vec<String>,
    load_gates: HashMap<Address, Arc<Gate>>,
    confirm_gate: Option<Arc<Gate>>,
    transfer_error: Option<CallError>,
    confirm_error: Option<CallError>,
    submitted: Vec<(Address, Address, U256)>,
    transactions: u8,
}

/// A fake chain acting as the token client factory.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deploy(&self, address: Address, token: MockToken) {
        self.state.lock().unwrap().tokens.insert(address, token);
    }

    /// Make `name()` on `token` wait for the returned gate.
    pub fn gate_load(&self, token: Address) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.state
            .lock()
            .unwrap()
            .load_gates
            .insert(token, gate.clone());
        gate
    }

    /// Make transaction confirmation wait for the returned gate.
    pub fn gate_confirm(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.state.lock().unwrap().confirm_gate = Some(gate.clone());
        gate
    }

    pub fn fail_transfers(&self, error: CallError) {
        self.state.lock().unwrap().transfer_error = Some(error);
    }

    pub fn fail_confirmations(&self, error: CallError) {
        self.state.lock().unwrap().confirm_error = Some(error);
    }

    pub fn set_revert_name(&self, token: Address) {
        if let Some(token) = self.state.lock().unwrap().tokens.get_mut(&token) {
            token.revert_name = true;
        }
    }

    /// Every call issued so far, as `method@token`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Submitted transfers as `(token, to, raw amount)`.
    pub fn submitted(&self) -> Vec<(Address, Address, U256)> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn balance(&self, token: Address, holder: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .tokens
            .get(&token)
            .and_then(|t| t.balances.get(&holder).copied())
            .unwrap_or_default()
    }

    fn record(&self, method: &str, token: Address) {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("{method}@{token}"));
    }

    fn read<T>(
        &self,
        token: Address,
        f: impl FnOnce(&MockToken) -> Result<T, CallError>,
    ) -> Result<T, CallError> {
        let state = self.state.lock().unwrap();
        match state.tokens.get(&token) {
            Some(token) => f(token),
            // Calling an address without code returns no data.
            None => Err(CallError::CallReverted("execution reverted".to_string())),
        }
    }
}

impl TokenClientFactory for MockChain {
    type Client = MockClient;

    fn bind(&self, token: Address, signer: Address) -> MockClient {
        MockClient {
            chain: self.clone(),
            token,
            signer,
        }
    }
}

pub struct MockClient {
    chain: MockChain,
    token: Address,
    signer: Address,
}

impl TokenClient for MockClient {
    type Pending = MockPending;

    fn address(&self) -> Address {
        self.token
    }

    async fn name(&self) -> Result<String, CallError> {
        self.chain.record("name", self.token);
        let gate = self
            .chain
            .state
            .lock()
            .unwrap()
            .load_gates
            .get(&self.token)
            .cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.chain.read(self.token, |t| {
            if t.revert_name {
                Err(CallError::CallReverted("execution reverted".to_string()))
            } else {
                Ok(t.name.clone())
            }
        })
    }

    async fn symbol(&self) -> Result<String, CallError> {
        self.chain.record("symbol", self.token);
        self.chain.read(self.token, |t| Ok(t.symbol.clone()))
    }

    async fn decimals(&self) -> Result<u8, CallError> {
        self.chain.record("decimals", self.token);
        self.chain.read(self.token, |t| Ok(t.decimals))
    }

    async fn balance_of(&self, holder: Address) -> Result<U256, CallError> {
        self.chain.record("balanceOf", self.token);
        self.chain.read(self.token, |t| {
            Ok(t.balances.get(&holder).copied().unwrap_or_default())
        })
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<MockPending, CallError> {
        self.chain.record("transfer", self.token);
        let mut state = self.chain.state.lock().unwrap();
        if let Some(error) = state.transfer_error.clone() {
            return Err(error);
        }
        state.submitted.push((self.token, to, amount));
        state.transactions += 1;
        let hash = B256::with_last_byte(state.transactions);

        Ok(MockPending {
            chain: self.chain.clone(),
            token: self.token,
            from: self.signer,
            to,
            amount,
            hash,
        })
    }
}

pub struct MockPending {
    chain: MockChain,
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
    hash: TxHash,
}

impl PendingTransaction for MockPending {
    fn tx_hash(&self) -> TxHash {
        self.hash
    }

    async fn confirm(self) -> Result<Confirmation, CallError> {
        let gate = self.chain.state.lock().unwrap().confirm_gate.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let mut state = self.chain.state.lock().unwrap();
        if let Some(error) = state.confirm_error.clone() {
            return Err(error);
        }
        let token = state
            .tokens
            .get_mut(&self.token)
            .ok_or_else(|| CallError::CallReverted("no contract".to_string()))?;
        let from = token.balances.entry(self.from).or_default();
        if *from < self.amount {
            return Err(CallError::CallReverted(
                "ERC20: transfer amount exceeds balance".to_string(),
            ));
        }
        *from -= self.amount;
        *token.balances.entry(self.to).or_default() += self.amount;

        Ok(Confirmation {
            tx_hash: self.hash,
            block_number: Some(u64::from(state.transactions)),
            gas_used: 51_000,
        })
    }
}

/// Session connected to `ACCOUNT` over `chain`.
pub async fn connected_session(chain: &MockChain) -> MockSession {
    let session = Session::new(MockWallet::granting(ACCOUNT), chain.clone());
    session.connect().await.unwrap();
    session
}

/// Chain with `TOKEN_A` (18 decimals) holding one token for `ACCOUNT`.
pub fn vyoman_chain() -> MockChain {
    let chain = MockChain::new();
    chain.deploy(
        TOKEN_A,
        MockToken::new("VYO", 18).with_balance(ACCOUNT, U256::from(ONE_TOKEN)),
    );
    chain
}
