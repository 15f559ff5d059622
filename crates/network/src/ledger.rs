//! In-memory token ledger.
//!
//! Holds balances, allowances, supplies and metadata for every token the
//! network touches: reserve tokens, the network and governance tokens, and
//! the pool tokens minted by the pools. The native asset is booked like any
//! other token under [`Token::NATIVE`].

use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::math::add;
use amm_network_domain::token::{Address, Token, TokenMetadata};
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Signed approval allowing a spender to move tokens on the owner's behalf.
///
/// Verifying the signature is the token's concern; the ledger enforces the
/// deadline and the per-owner nonce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitSignature {
    /// Last timestamp at which the permit may be used.
    pub deadline: u64,
    pub v: u8,
    pub r: H256,
    pub s: H256,
}

/// Multi-token balance book.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: HashMap<(Token, Address), U256>,
    allowances: HashMap<(Token, Address, Address), U256>,
    supplies: HashMap<Token, U256>,
    metadata: HashMap<Token, TokenMetadata>,
    nonces: HashMap<(Token, Address), u64>,
}

impl TokenLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the metadata of a token.
    pub fn register_token(&mut self, token: Token, metadata: TokenMetadata) {
        self.metadata.insert(token, metadata);
    }

    #[must_use]
    pub fn metadata(&self, token: Token) -> Option<&TokenMetadata> {
        self.metadata.get(&token)
    }

    /// Symbol of a token; unregistered tokens fall back to their address.
    #[must_use]
    pub fn symbol(&self, token: Token) -> String {
        self.metadata
            .get(&token)
            .map_or_else(|| token.to_string(), |m| m.symbol.clone())
    }

    #[must_use]
    pub fn balance_of(&self, token: Token, account: Address) -> U256 {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn total_supply(&self, token: Token) -> U256 {
        self.supplies.get(&token).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn allowance(&self, token: Token, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn nonce(&self, token: Token, owner: Address) -> u64 {
        self.nonces.get(&(token, owner)).copied().unwrap_or_default()
    }

    /// Creates `amount` new tokens for `account`.
    pub fn mint(&mut self, token: Token, account: Address, amount: U256) -> NetworkResult<()> {
        let supply = add(self.total_supply(token), amount)?;
        let balance = add(self.balance_of(token, account), amount)?;
        self.supplies.insert(token, supply);
        self.balances.insert((token, account), balance);
        trace!(token = %token, account = %account, amount = %amount, "Minted");
        Ok(())
    }

    /// Destroys `amount` tokens held by `account`.
    pub fn burn(&mut self, token: Token, account: Address, amount: U256) -> NetworkResult<()> {
        let balance = self.balance_of(token, account);
        if balance < amount {
            return Err(NetworkError::InsufficientBalance);
        }
        let supply = self.total_supply(token).saturating_sub(amount);
        self.balances.insert((token, account), balance - amount);
        self.supplies.insert(token, supply);
        trace!(token = %token, account = %account, amount = %amount, "Burned");
        Ok(())
    }

    /// Moves tokens between accounts.
    pub fn transfer(
        &mut self,
        token: Token,
        from: Address,
        to: Address,
        amount: U256,
    ) -> NetworkResult<()> {
        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Err(NetworkError::InsufficientBalance);
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        let to_balance = add(self.balance_of(token, to), amount)?;
        self.balances.insert((token, from), from_balance - amount);
        self.balances.insert((token, to), to_balance);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s tokens.
    pub fn approve(&mut self, token: Token, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((token, owner, spender), amount);
    }

    /// Checks, without mutating, that `spender` may move `amount` of `from`'s
    /// tokens.
    pub fn ensure_transferable(
        &self,
        token: Token,
        spender: Address,
        from: Address,
        amount: U256,
    ) -> NetworkResult<()> {
        if self.balance_of(token, from) < amount {
            return Err(NetworkError::InsufficientBalance);
        }
        if spender != from && self.allowance(token, from, spender) < amount {
            return Err(NetworkError::InsufficientAllowance);
        }
        Ok(())
    }

    /// Moves tokens on behalf of `from`, consuming `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        token: Token,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> NetworkResult<()> {
        self.ensure_transferable(token, spender, from, amount)?;
        if spender != from {
            let allowance = self.allowance(token, from, spender);
            if allowance != U256::MAX {
                self.approve(token, from, spender, allowance - amount);
            }
        }
        self.transfer(token, from, to, amount)
    }

    /// Applies a signed permit granting `spender` an allowance of `amount`.
    pub fn permit(
        &mut self,
        token: Token,
        owner: Address,
        spender: Address,
        amount: U256,
        signature: &PermitSignature,
        now: u64,
    ) -> NetworkResult<()> {
        if token.is_native() {
            return Err(NetworkError::PermitUnsupported);
        }
        if signature.deadline < now {
            return Err(NetworkError::ExpiredDeadline);
        }
        *self.nonces.entry((token, owner)).or_default() += 1;
        self.approve(token, owner, spender, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_mint_burn_tracks_supply() {
        let token = Token::from_label("TKN");
        let mut ledger = TokenLedger::new();
        ledger.mint(token, addr(1), U256::from(100u64)).unwrap();
        ledger.mint(token, addr(2), U256::from(50u64)).unwrap();
        ledger.burn(token, addr(1), U256::from(30u64)).unwrap();

        assert_eq!(ledger.total_supply(token), U256::from(120u64));
        assert_eq!(ledger.balance_of(token, addr(1)), U256::from(70u64));
        assert_eq!(
            ledger.burn(token, addr(2), U256::from(51u64)),
            Err(NetworkError::InsufficientBalance)
        );
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let token = Token::from_label("TKN");
        let mut ledger = TokenLedger::new();
        ledger.mint(token, addr(1), U256::from(100u64)).unwrap();

        assert_eq!(
            ledger.transfer_from(token, addr(9), addr(1), addr(2), U256::from(10u64)),
            Err(NetworkError::InsufficientAllowance)
        );

        ledger.approve(token, addr(1), addr(9), U256::from(15u64));
        ledger
            .transfer_from(token, addr(9), addr(1), addr(2), U256::from(10u64))
            .unwrap();
        assert_eq!(ledger.allowance(token, addr(1), addr(9)), U256::from(5u64));
        assert_eq!(ledger.balance_of(token, addr(2)), U256::from(10u64));
        assert_eq!(ledger.total_supply(token), U256::from(100u64));
    }

    #[test]
    fn test_unlimited_allowance_is_not_consumed() {
        let token = Token::from_label("TKN");
        let mut ledger = TokenLedger::new();
        ledger.mint(token, addr(1), U256::from(100u64)).unwrap();
        ledger.approve(token, addr(1), addr(9), U256::MAX);
        ledger
            .transfer_from(token, addr(9), addr(1), addr(2), U256::from(10u64))
            .unwrap();
        assert_eq!(ledger.allowance(token, addr(1), addr(9)), U256::MAX);
    }

    #[test]
    fn test_permit() {
        let token = Token::from_label("TKN");
        let mut ledger = TokenLedger::new();
        let signature = PermitSignature {
            deadline: 100,
            ..PermitSignature::default()
        };

        ledger
            .permit(token, addr(1), addr(9), U256::from(7u64), &signature, 50)
            .unwrap();
        assert_eq!(ledger.allowance(token, addr(1), addr(9)), U256::from(7u64));
        assert_eq!(ledger.nonce(token, addr(1)), 1);

        assert_eq!(
            ledger.permit(token, addr(1), addr(9), U256::one(), &signature, 101),
            Err(NetworkError::ExpiredDeadline)
        );
        assert_eq!(
            ledger.permit(Token::NATIVE, addr(1), addr(9), U256::one(), &signature, 0),
            Err(NetworkError::PermitUnsupported)
        );
    }

    #[test]
    fn test_symbol_fallback() {
        let token = Token::from_label("TKN");
        let mut ledger = TokenLedger::new();
        assert_eq!(ledger.symbol(token), token.to_string());
        ledger.register_token(token, TokenMetadata::new("TKN", "Token", 18));
        assert_eq!(ledger.symbol(token), "TKN");
    }
}
