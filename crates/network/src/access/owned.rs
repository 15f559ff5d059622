use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::token::Address;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Two-step ownership: the owner nominates, the nominee accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owned {
    owner: Address,
    new_owner: Option<Address>,
}

impl Owned {
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            new_owner: None,
        }
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    #[must_use]
    pub fn new_owner(&self) -> Option<Address> {
        self.new_owner
    }

    /// Fails with [`NetworkError::AccessDenied`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: Address) -> NetworkResult<()> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(NetworkError::AccessDenied)
        }
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> NetworkResult<()> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() || new_owner == self.owner {
            return Err(NetworkError::InvalidAddress);
        }
        self.new_owner = Some(new_owner);
        Ok(())
    }

    pub fn accept_ownership(&mut self, caller: Address) -> NetworkResult<()> {
        if self.new_owner != Some(caller) {
            return Err(NetworkError::AccessDenied);
        }
        info!(prev_owner = %self.owner, new_owner = %caller, "Ownership transferred");
        self.owner = caller;
        self.new_owner = None;
        Ok(())
    }
}

/// Components report the version of their logic.
pub trait Versioned {
    fn version(&self) -> u16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_step_transfer() {
        let (a, b) = (Address::from_low_u64_be(1), Address::from_low_u64_be(2));
        let mut owned = Owned::new(a);

        assert_eq!(owned.transfer_ownership(b, b), Err(NetworkError::AccessDenied));
        assert_eq!(
            owned.transfer_ownership(a, Address::zero()),
            Err(NetworkError::InvalidAddress)
        );

        owned.transfer_ownership(a, b).unwrap();
        assert_eq!(owned.owner(), a);
        assert_eq!(owned.accept_ownership(a), Err(NetworkError::AccessDenied));

        owned.accept_ownership(b).unwrap();
        assert_eq!(owned.owner(), b);
        assert!(owned.new_owner().is_none());
        assert!(owned.ensure_owner(b).is_ok());
    }
}
