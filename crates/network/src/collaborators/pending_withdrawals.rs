use crate::ledger::TokenLedger;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::token::{Address, Token};
use amm_network_domain::value_objects::ContextId;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Cooldown applied before a withdrawal request can be completed.
pub const DEFAULT_LOCK_DURATION: u64 = 7 * 24 * 60 * 60;

/// A locked pool-token position waiting for its cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub provider: Address,
    pub pool_token: Token,
    pub pool_token_amount: U256,
    pub created_at: u64,
}

/// Pool tokens released by a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedWithdrawal {
    pub pool_token: Token,
    pub pool_token_amount: U256,
}

/// Ledger of pending withdrawal requests.
pub trait PendingWithdrawals {
    /// Account holding the locked pool tokens.
    fn address(&self) -> Address;

    fn lock_duration(&self) -> u64;

    fn withdrawal_request(&self, id: u64) -> Option<WithdrawalRequest>;

    /// Locks `amount` pool tokens of `provider` and returns the request id.
    fn init_withdrawal(
        &mut self,
        ledger: &mut TokenLedger,
        provider: Address,
        pool_token: Token,
        amount: U256,
        now: u64,
    ) -> NetworkResult<u64>;

    /// Returns the locked pool tokens to the provider.
    fn cancel_withdrawal(
        &mut self,
        ledger: &mut TokenLedger,
        provider: Address,
        id: u64,
    ) -> NetworkResult<U256>;

    /// Releases the pool tokens of an unlocked request to `recipient`.
    fn complete_withdrawal(
        &mut self,
        ledger: &mut TokenLedger,
        context_id: ContextId,
        provider: Address,
        id: u64,
        now: u64,
        recipient: Address,
    ) -> NetworkResult<CompletedWithdrawal>;
}

/// In-memory pending withdrawals ledger.
#[derive(Debug, Clone)]
pub struct MemoryPendingWithdrawals {
    address: Address,
    lock_duration: u64,
    next_id: u64,
    requests: BTreeMap<u64, WithdrawalRequest>,
}

impl MemoryPendingWithdrawals {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            lock_duration: DEFAULT_LOCK_DURATION,
            next_id: 1,
            requests: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_lock_duration(mut self, lock_duration: u64) -> Self {
        self.lock_duration = lock_duration;
        self
    }

    /// Ids of the provider's open requests.
    #[must_use]
    pub fn withdrawal_request_ids(&self, provider: Address) -> Vec<u64> {
        self.requests
            .iter()
            .filter(|(_, r)| r.provider == provider)
            .map(|(id, _)| *id)
            .collect()
    }

    fn owned_request(&self, provider: Address, id: u64) -> NetworkResult<WithdrawalRequest> {
        let request = self
            .requests
            .get(&id)
            .copied()
            .ok_or(NetworkError::UnknownWithdrawalRequest(id))?;
        if request.provider != provider {
            return Err(NetworkError::AccessDenied);
        }
        Ok(request)
    }
}

impl PendingWithdrawals for MemoryPendingWithdrawals {
    fn address(&self) -> Address {
        self.address
    }

    fn lock_duration(&self) -> u64 {
        self.lock_duration
    }

    fn withdrawal_request(&self, id: u64) -> Option<WithdrawalRequest> {
        self.requests.get(&id).copied()
    }

    fn init_withdrawal(
        &mut self,
        ledger: &mut TokenLedger,
        provider: Address,
        pool_token: Token,
        amount: U256,
        now: u64,
    ) -> NetworkResult<u64> {
        if amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        ledger.transfer(pool_token, provider, self.address, amount)?;
        let id = self.next_id;
        self.next_id += 1;
        self.requests.insert(
            id,
            WithdrawalRequest {
                provider,
                pool_token,
                pool_token_amount: amount,
                created_at: now,
            },
        );
        info!(id, provider = %provider, pool_token = %pool_token, amount = %amount, "Withdrawal initiated");
        Ok(id)
    }

    fn cancel_withdrawal(
        &mut self,
        ledger: &mut TokenLedger,
        provider: Address,
        id: u64,
    ) -> NetworkResult<U256> {
        let request = self.owned_request(provider, id)?;
        ledger.transfer(
            request.pool_token,
            self.address,
            provider,
            request.pool_token_amount,
        )?;
        self.requests.remove(&id);
        info!(id, provider = %provider, "Withdrawal cancelled");
        Ok(request.pool_token_amount)
    }

    fn complete_withdrawal(
        &mut self,
        ledger: &mut TokenLedger,
        context_id: ContextId,
        provider: Address,
        id: u64,
        now: u64,
        recipient: Address,
    ) -> NetworkResult<CompletedWithdrawal> {
        let request = self.owned_request(provider, id)?;
        if now < request.created_at.saturating_add(self.lock_duration) {
            return Err(NetworkError::WithdrawalLocked(id));
        }
        ledger.transfer(
            request.pool_token,
            self.address,
            recipient,
            request.pool_token_amount,
        )?;
        self.requests.remove(&id);
        debug!(context_id = %context_id, id, provider = %provider, "Withdrawal completed");
        Ok(CompletedWithdrawal {
            pool_token: request.pool_token,
            pool_token_amount: request.pool_token_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TokenLedger, MemoryPendingWithdrawals, Token, Address) {
        let mut ledger = TokenLedger::new();
        let pool_token = Token::from_label("lpTKN");
        let provider = Address::from_low_u64_be(7);
        ledger
            .mint(pool_token, provider, U256::from(100u64))
            .unwrap();
        let pending =
            MemoryPendingWithdrawals::new(Address::from_low_u64_be(3)).with_lock_duration(10);
        (ledger, pending, pool_token, provider)
    }

    #[test]
    fn test_lock_then_complete() {
        let (mut ledger, mut pending, pool_token, provider) = setup();
        let recipient = Address::from_low_u64_be(99);
        let id = pending
            .init_withdrawal(&mut ledger, provider, pool_token, U256::from(40u64), 100)
            .unwrap();
        assert_eq!(pending.withdrawal_request_ids(provider), vec![id]);

        assert_eq!(
            pending.complete_withdrawal(&mut ledger, ContextId::default(), provider, id, 109, recipient),
            Err(NetworkError::WithdrawalLocked(id))
        );
        assert_eq!(
            pending.complete_withdrawal(
                &mut ledger,
                ContextId::default(),
                Address::from_low_u64_be(8),
                id,
                110,
                recipient
            ),
            Err(NetworkError::AccessDenied)
        );

        let completed = pending
            .complete_withdrawal(&mut ledger, ContextId::default(), provider, id, 110, recipient)
            .unwrap();
        assert_eq!(completed.pool_token_amount, U256::from(40u64));
        assert_eq!(ledger.balance_of(pool_token, recipient), U256::from(40u64));
        assert!(pending.withdrawal_request(id).is_none());
    }

    #[test]
    fn test_cancel_returns_tokens() {
        let (mut ledger, mut pending, pool_token, provider) = setup();
        let id = pending
            .init_withdrawal(&mut ledger, provider, pool_token, U256::from(40u64), 0)
            .unwrap();
        assert_eq!(ledger.balance_of(pool_token, provider), U256::from(60u64));

        pending.cancel_withdrawal(&mut ledger, provider, id).unwrap();
        assert_eq!(ledger.balance_of(pool_token, provider), U256::from(100u64));
        assert_eq!(
            pending.cancel_withdrawal(&mut ledger, provider, id),
            Err(NetworkError::UnknownWithdrawalRequest(id))
        );
    }
}
