use crate::ledger::TokenLedger;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::token::{Address, Token};
use primitive_types::U256;
use tracing::debug;

/// Custody of pooled funds.
///
/// The vault and the external protection wallet share this shape: they hold
/// balances in the token ledger and release them on request of the network.
pub trait Vault {
    /// Account holding the custody balances.
    fn address(&self) -> Address;

    /// Balance held in custody.
    fn balance_of(&self, ledger: &TokenLedger, token: Token) -> U256 {
        ledger.balance_of(token, self.address())
    }

    /// Sends `amount` tokens to `recipient`.
    fn withdraw_tokens(
        &mut self,
        ledger: &mut TokenLedger,
        token: Token,
        recipient: Address,
        amount: U256,
    ) -> NetworkResult<()>;
}

/// Vault backed directly by the token ledger.
#[derive(Debug, Clone)]
pub struct MemoryVault {
    address: Address,
}

impl MemoryVault {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Vault for MemoryVault {
    fn address(&self) -> Address {
        self.address
    }

    fn withdraw_tokens(
        &mut self,
        ledger: &mut TokenLedger,
        token: Token,
        recipient: Address,
        amount: U256,
    ) -> NetworkResult<()> {
        if recipient.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        ledger.transfer(token, self.address, recipient, amount)?;
        debug!(vault = %self.address, token = %token, recipient = %recipient, amount = %amount, "Tokens withdrawn from custody");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_tokens() {
        let token = Token::from_label("TKN");
        let mut ledger = TokenLedger::new();
        let mut vault = MemoryVault::new(Address::from_low_u64_be(1));
        ledger
            .mint(token, vault.address(), U256::from(10u64))
            .unwrap();

        vault
            .withdraw_tokens(&mut ledger, token, Address::from_low_u64_be(2), U256::from(4u64))
            .unwrap();
        assert_eq!(vault.balance_of(&ledger, token), U256::from(6u64));

        assert_eq!(
            vault.withdraw_tokens(&mut ledger, token, Address::zero(), U256::one()),
            Err(NetworkError::InvalidAddress)
        );
        assert_eq!(vault.balance_of(&ledger, token), U256::from(6u64));
    }
}
