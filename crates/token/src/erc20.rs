use crate::{CallError, Confirmation, PendingTransaction, TokenClient, TokenClientFactory};
use alloy_network::Ethereum;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{PendingTransactionBuilder, Provider};
use binding::token::IVyoman;
use tracing::debug;

// Factory handing out clients that share one provider.
#[derive(Debug, Clone)]
pub struct Erc20Factory<P> {
    provider: P,
}

impl<P> Erc20Factory<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> TokenClientFactory for Erc20Factory<P>
where
    P: Provider + Clone,
{
    type Client = Erc20Client<P>;

    fn bind(&self, token: Address, signer: Address) -> Self::Client {
        Erc20Client::new(self.provider.clone(), token, signer)
    }
}

/// ERC20 client implementation over an alloy provider.
///
/// Transactions are sent with `from = signer`; the provider either signs them
/// (wallet filler) or forwards them to a wallet that does.
#[derive(Debug, Clone)]
pub struct Erc20Client<P> {
    provider: P,
    token: Address,
    signer: Address,
}

impl<P> Erc20Client<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, token: Address, signer: Address) -> Self {
        Self {
            provider,
            token,
            signer,
        }
    }

    /// Query the token's total supply.
    pub async fn total_supply(&self) -> Result<U256, CallError> {
        debug!(token = %self.token, "Calling totalSupply()");

        let contract = IVyoman::new(self.token, &self.provider);
        contract.totalSupply().call().await.map_err(classify)
    }
}

impl<P> TokenClient for Erc20Client<P>
where
    P: Provider + Clone,
{
    type Pending = Erc20Pending;

    fn address(&self) -> Address {
        self.token
    }

    async fn name(&self) -> Result<String, CallError> {
        debug!(token = %self.token, "Calling name()");

        let contract = IVyoman::new(self.token, &self.provider);
        contract.name().call().await.map_err(classify)
    }

    async fn symbol(&self) -> Result<String, CallError> {
        debug!(token = %self.token, "Calling symbol()");

        let contract = IVyoman::new(self.token, &self.provider);
        contract.symbol().call().await.map_err(classify)
    }

    async fn decimals(&self) -> Result<u8, CallError> {
        debug!(token = %self.token, "Calling decimals()");

        let contract = IVyoman::new(self.token, &self.provider);
        contract.decimals().call().await.map_err(classify)
    }

    async fn balance_of(&self, holder: Address) -> Result<U256, CallError> {
        debug!(token = %self.token, holder = %holder, "Calling balanceOf()");

        let contract = IVyoman::new(self.token, &self.provider);
        contract.balanceOf(holder).call().await.map_err(classify)
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<Erc20Pending, CallError> {
        debug!(
            token = %self.token,
            from = %self.signer,
            to = %to,
            amount = %amount,
            "Sending transfer()"
        );

        let contract = IVyoman::new(self.token, &self.provider);
        let pending = contract
            .transfer(to, amount)
            .from(self.signer)
            .send()
            .await
            .map_err(classify)?;

        Ok(Erc20Pending { inner: pending })
    }
}

/// A broadcast transfer awaiting its receipt.
pub struct Erc20Pending {
    inner: PendingTransactionBuilder<Ethereum>,
}

impl PendingTransaction for Erc20Pending {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn confirm(self) -> Result<Confirmation, CallError> {
        let tx_hash = self.tx_hash();
        debug!(tx_hash = %tx_hash, "Waiting for receipt");

        let receipt = self
            .inner
            .get_receipt()
            .await
            .map_err(|e| CallError::Network(e.to_string()))?;

        if !receipt.status() {
            return Err(CallError::CallReverted(format!(
                "transaction {tx_hash} reverted"
            )));
        }

        Ok(Confirmation {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

/// Sort a contract error into the call error taxonomy.
///
/// JSON-RPC error responses carry the wallet/node verdict; every other
/// transport failure means no verdict was reached. Decoding failures
/// (e.g. empty return data from an address without code) count as reverts.
fn classify(err: alloy_contract::Error) -> CallError {
    match &err {
        alloy_contract::Error::TransportError(transport) => match transport.as_error_resp() {
            Some(payload) => CallError::from_rpc(payload.code, &payload.message),
            None => CallError::Network(transport.to_string()),
        },
        _ => CallError::CallReverted(err.to_string()),
    }
}
