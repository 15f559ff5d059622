//! The network router.
//!
//! Entry point of the system: keeps the registry of pool collections and
//! routes deposits, withdrawals and trades through the collections, the
//! network token pool and the custody collaborators, recording every change
//! in its event log.
//!
//! Entry points validate and quote before the first mutation, so a failing
//! call leaves no trace.

mod deposit;
mod trade;
mod withdraw;


pub use trade::TradeParams;

use crate::access::{Owned, ReentrancyGuard, Versioned};
use crate::collaborators::{Clock, NetworkSettings, PendingWithdrawals, Vault};
use crate::config::NetworkConfig;
use crate::ledger::{PermitSignature, TokenLedger};
use crate::network_token_pool::NetworkTokenPool;
use crate::pool_collection::PoolCollection;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::events::{EventLog, NetworkEvent};
use amm_network_domain::token::{Address, Token, TokenMetadata};
use amm_network_domain::value_objects::ContextId;
use primitive_types::U256;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

const VERSION: u16 = 1;

/// Registry and orchestrator of the pools.
pub struct Network {
    config: NetworkConfig,
    owned: Owned,
    ledger: TokenLedger,
    settings: Box<dyn NetworkSettings>,
    vault: Box<dyn Vault>,
    external_protection_wallet: Option<Box<dyn Vault>>,
    pending_withdrawals: Box<dyn PendingWithdrawals>,
    network_token_pool: NetworkTokenPool,
    collections: Vec<Box<dyn PoolCollection>>,
    latest_collections: BTreeMap<u16, Address>,
    pool_collections: HashMap<Token, Address>,
    pools: Vec<Token>,
    clock: Arc<dyn Clock>,
    guard: ReentrancyGuard,
    events: EventLog<NetworkEvent>,
}

impl Network {
    /// Creates a network with an empty registry and a fresh token ledger.
    pub fn new(
        config: NetworkConfig,
        settings: Box<dyn NetworkSettings>,
        vault: Box<dyn Vault>,
        pending_withdrawals: Box<dyn PendingWithdrawals>,
        clock: Arc<dyn Clock>,
    ) -> NetworkResult<Self> {
        if config.address.is_zero() || config.owner.is_zero() || config.network_token.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        if vault.address() != config.vault {
            return Err(NetworkError::InvalidAddress);
        }

        let mut ledger = TokenLedger::new();
        ledger.register_token(
            config.network_token,
            TokenMetadata::new("NET", "Network Token", 18),
        );
        ledger.register_token(
            config.gov_token,
            TokenMetadata::new("vNET", "Network Governance Token", 18),
        );
        ledger.register_token(
            config.network_pool_token,
            TokenMetadata::new("lpNET", "Network Token Pool Token", 18),
        );

        Ok(Self {
            owned: Owned::new(config.owner),
            network_token_pool: NetworkTokenPool::new(&config),
            config,
            ledger,
            settings,
            vault,
            external_protection_wallet: None,
            pending_withdrawals,
            collections: Vec::new(),
            latest_collections: BTreeMap::new(),
            pool_collections: HashMap::new(),
            pools: Vec::new(),
            clock,
            guard: ReentrancyGuard::new(),
            events: EventLog::new(),
        })
    }

    /// Registers a pool collection and makes it the latest of its type.
    pub fn add_pool_collection(
        &mut self,
        caller: Address,
        collection: Box<dyn PoolCollection>,
    ) -> NetworkResult<()> {
        let _lock = self.guard.enter()?;
        self.owned.ensure_owner(caller)?;
        let address = collection.address();
        if address.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        if self.collection_index(address).is_some() {
            return Err(NetworkError::CollectionAlreadyExists);
        }

        let pool_type = collection.pool_type();
        self.collections.push(collection);
        self.events.record(NetworkEvent::PoolCollectionAdded {
            pool_type,
            pool_collection: address,
        });
        info!(pool_type, collection = %address, "Pool collection added");
        self.set_latest(pool_type, Some(address));
        Ok(())
    }

    /// Unregisters an empty pool collection, handing the latest slot of its
    /// type to `new_latest`.
    pub fn remove_pool_collection(
        &mut self,
        caller: Address,
        address: Address,
        new_latest: Option<Address>,
    ) -> NetworkResult<()> {
        let _lock = self.guard.enter()?;
        self.owned.ensure_owner(caller)?;
        let index = self
            .collection_index(address)
            .ok_or(NetworkError::CollectionDoesNotExist)?;
        let candidate_type = self.latest_candidate_type(new_latest)?;
        if new_latest == Some(address) {
            return Err(NetworkError::InvalidAddress);
        }
        if self.collections[index].pool_count() != 0 {
            return Err(NetworkError::CollectionIsNotEmpty);
        }
        let pool_type = self.collections[index].pool_type();
        if candidate_type.is_some_and(|t| t != pool_type) {
            return Err(NetworkError::WrongCollectionType);
        }

        self.set_latest(pool_type, new_latest);
        self.collections.remove(index);
        self.events.record(NetworkEvent::PoolCollectionRemoved {
            pool_type,
            pool_collection: address,
        });
        info!(pool_type, collection = %address, "Pool collection removed");
        Ok(())
    }

    /// Makes a registered collection the latest of its type.
    pub fn set_latest_pool_collection(
        &mut self,
        caller: Address,
        address: Address,
    ) -> NetworkResult<()> {
        let _lock = self.guard.enter()?;
        self.owned.ensure_owner(caller)?;
        let index = self
            .collection_index(address)
            .ok_or(NetworkError::CollectionDoesNotExist)?;
        let pool_type = self.collections[index].pool_type();
        self.set_latest(pool_type, Some(address));
        Ok(())
    }

    /// Replaces the wallet compensating base-token shortfalls.
    pub fn set_external_protection_wallet(
        &mut self,
        caller: Address,
        wallet: Box<dyn Vault>,
    ) -> NetworkResult<()> {
        let _lock = self.guard.enter()?;
        self.owned.ensure_owner(caller)?;
        let new_wallet = wallet.address();
        if new_wallet.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        let prev_wallet = self.external_protection_wallet();
        if prev_wallet == Some(new_wallet) {
            return Ok(());
        }

        self.external_protection_wallet = Some(wallet);
        self.events
            .record(NetworkEvent::ExternalProtectionWalletUpdated {
                prev_wallet,
                new_wallet: Some(new_wallet),
            });
        info!(wallet = %new_wallet, "External protection wallet updated");
        Ok(())
    }

    /// Creates a pool for a whitelisted token in the latest collection of
    /// `pool_type`.
    pub fn create_pool(
        &mut self,
        caller: Address,
        pool_type: u16,
        token: Token,
    ) -> NetworkResult<()> {
        let _lock = self.guard.enter()?;
        if token.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        if token == self.config.network_token {
            return Err(NetworkError::InvalidToken);
        }
        if !self.settings.is_token_whitelisted(token) {
            return Err(NetworkError::PoolNotWhitelisted);
        }
        if self.pool_collections.contains_key(&token) {
            return Err(NetworkError::PoolAlreadyExists);
        }
        let address = self
            .latest_collections
            .get(&pool_type)
            .copied()
            .ok_or(NetworkError::UnsupportedType(pool_type))?;
        let index = self
            .collection_index(address)
            .ok_or(NetworkError::UnsupportedType(pool_type))?;

        let network = self.config.address;
        self.collections[index].create_pool(network, &mut self.ledger, token)?;
        self.pool_collections.insert(token, address);
        self.pools.push(token);
        self.events.record(NetworkEvent::PoolAdded {
            pool_type,
            pool: token,
            pool_collection: address,
        });
        info!(caller = %caller, pool = %token, pool_type, collection = %address, "Pool added");
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> NetworkResult<()> {
        self.owned.transfer_ownership(caller, new_owner)
    }

    pub fn accept_ownership(&mut self, caller: Address) -> NetworkResult<()> {
        self.owned.accept_ownership(caller)
    }

    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owned.owner()
    }

    #[must_use]
    pub fn network_token(&self) -> Token {
        self.config.network_token
    }

    /// Addresses of the registered collections, in registration order.
    #[must_use]
    pub fn pool_collections(&self) -> Vec<Address> {
        self.collections.iter().map(|c| c.address()).collect()
    }

    /// Pools in creation order.
    #[must_use]
    pub fn liquidity_pools(&self) -> &[Token] {
        &self.pools
    }

    #[must_use]
    pub fn latest_pool_collection(&self, pool_type: u16) -> Option<Address> {
        self.latest_collections.get(&pool_type).copied()
    }

    #[must_use]
    pub fn collection_by_pool(&self, pool: Token) -> Option<Address> {
        self.pool_collections.get(&pool).copied()
    }

    /// The network token is always a valid pool.
    #[must_use]
    pub fn is_pool_valid(&self, pool: Token) -> bool {
        if pool == self.config.network_token {
            return true;
        }
        self.collection_for_pool(pool)
            .is_ok_and(|index| self.collections[index].is_pool_valid(pool))
    }

    #[must_use]
    pub fn pool_collection(&self, address: Address) -> Option<&dyn PoolCollection> {
        self.collection_index(address)
            .map(|index| self.collections[index].as_ref())
    }

    /// Mutable access for the collection owner's configuration calls.
    pub fn pool_collection_mut(
        &mut self,
        address: Address,
    ) -> Option<&mut (dyn PoolCollection + 'static)> {
        let index = self.collection_index(address)?;
        Some(self.collections[index].as_mut())
    }

    #[must_use]
    pub fn network_token_pool(&self) -> &NetworkTokenPool {
        &self.network_token_pool
    }

    #[must_use]
    pub fn external_protection_wallet(&self) -> Option<Address> {
        self.external_protection_wallet.as_ref().map(|w| w.address())
    }

    #[must_use]
    pub fn vault_address(&self) -> Address {
        self.vault.address()
    }

    #[must_use]
    pub fn pending_withdrawals(&self) -> &dyn PendingWithdrawals {
        self.pending_withdrawals.as_ref()
    }

    #[must_use]
    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    /// Direct ledger access for funding accounts outside the network.
    pub fn ledger_mut(&mut self) -> &mut TokenLedger {
        &mut self.ledger
    }

    /// Events in emission order.
    #[must_use]
    pub fn events(&self) -> &[NetworkEvent] {
        self.events.events()
    }

    #[must_use]
    pub fn event_log(&self) -> &EventLog<NetworkEvent> {
        &self.events
    }

    #[must_use]
    pub fn reentrancy_guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    fn collection_index(&self, address: Address) -> Option<usize> {
        self.collections.iter().position(|c| c.address() == address)
    }

    fn collection_for_pool(&self, pool: Token) -> NetworkResult<usize> {
        self.pool_collections
            .get(&pool)
            .and_then(|address| self.collection_index(*address))
            .ok_or(NetworkError::UnsupportedToken)
    }

    /// Finds the collection and reserve token behind a pool token.
    fn pool_by_pool_token(&self, pool_token: Token) -> Option<(usize, Token)> {
        self.collections
            .iter()
            .enumerate()
            .find_map(|(index, c)| c.pool_by_pool_token(pool_token).map(|pool| (index, pool)))
    }

    fn is_latest(&self, index: usize) -> bool {
        let collection = &self.collections[index];
        self.latest_collections.get(&collection.pool_type()) == Some(&collection.address())
    }

    fn is_network_liquidity_enabled(&self, pool: Token, index: usize) -> bool {
        self.network_token_pool.is_network_liquidity_enabled(
            self.settings.as_ref(),
            pool,
            self.is_latest(index),
        )
    }

    /// Validates a latest-collection candidate and returns its pool type.
    fn latest_candidate_type(&self, candidate: Option<Address>) -> NetworkResult<Option<u16>> {
        match candidate {
            None => Ok(None),
            Some(address) => self
                .collection_index(address)
                .map(|index| Some(self.collections[index].pool_type()))
                .ok_or(NetworkError::CollectionDoesNotExist),
        }
    }

    fn set_latest(&mut self, pool_type: u16, address: Option<Address>) {
        let prev = self.latest_collections.get(&pool_type).copied();
        if prev == address {
            return;
        }
        match address {
            Some(address) => self.latest_collections.insert(pool_type, address),
            None => self.latest_collections.remove(&pool_type),
        };
        self.events
            .record(NetworkEvent::LatestPoolCollectionReplaced {
                pool_type,
                prev_pool_collection: prev,
                new_pool_collection: address,
            });
        info!(pool_type, prev = ?prev, new = ?address, "Latest pool collection replaced");
    }

    /// Native deposits carry the amount as value; token deposits carry none.
    fn ensure_value(token: Token, amount: U256, value: U256) -> NetworkResult<()> {
        let matches = if token.is_native() {
            value == amount
        } else {
            value.is_zero()
        };
        if matches {
            Ok(())
        } else {
            Err(NetworkError::EthAmountMismatch)
        }
    }

    /// Checks that `amount` of `from`'s tokens can be pulled into custody.
    /// A pending permit stands in for the allowance.
    fn ensure_pullable(
        &self,
        token: Token,
        from: Address,
        amount: U256,
        permit: Option<&PermitSignature>,
    ) -> NetworkResult<()> {
        if let Some(signature) = permit {
            if token.is_native() {
                return Err(NetworkError::PermitUnsupported);
            }
            if signature.deadline < self.clock.now() {
                return Err(NetworkError::ExpiredDeadline);
            }
        }
        if token.is_native() || permit.is_some() {
            if self.ledger.balance_of(token, from) < amount {
                return Err(NetworkError::InsufficientBalance);
            }
            return Ok(());
        }
        self.ledger
            .ensure_transferable(token, self.config.address, from, amount)
    }

    /// Pulls `amount` of `from`'s tokens to `to`, applying the permit first.
    fn pull(
        &mut self,
        token: Token,
        from: Address,
        to: Address,
        amount: U256,
        permit: Option<&PermitSignature>,
    ) -> NetworkResult<()> {
        if token.is_native() {
            return self.ledger.transfer(token, from, to, amount);
        }
        let network = self.config.address;
        if let Some(signature) = permit {
            let now = self.clock.now();
            self.ledger
                .permit(token, from, network, amount, signature, now)?;
        }
        self.ledger.transfer_from(token, network, from, to, amount)
    }

    fn record_pool_totals(&mut self, context_id: ContextId, pool: Token, index: usize) {
        let Some(data) = self.collections[index].pool_data(pool) else {
            return;
        };
        let event = NetworkEvent::TotalLiquidityUpdated {
            context_id,
            pool,
            pool_token_supply: self.ledger.total_supply(data.pool_token),
            staked_balance: data.liquidity.staked_balance,
            actual_balance: self.vault.balance_of(&self.ledger, pool),
        };
        self.events.record(event);
    }

    fn record_network_totals(&mut self, context_id: ContextId) {
        let network_token = self.config.network_token;
        let event = NetworkEvent::TotalLiquidityUpdated {
            context_id,
            pool: network_token,
            pool_token_supply: self.network_token_pool.pool_token_supply(&self.ledger),
            staked_balance: self.network_token_pool.staked_balance(),
            actual_balance: self.vault.balance_of(&self.ledger, network_token),
        };
        self.events.record(event);
    }

    fn record_trading_liquidity(&mut self, context_id: ContextId, pool: Token, index: usize) {
        let Some(data) = self.collections[index].pool_data(pool) else {
            return;
        };
        self.events.record(NetworkEvent::TradingLiquidityUpdated {
            context_id,
            pool,
            reserve_token: pool,
            liquidity: data.liquidity.base_token_trading_liquidity,
        });
        self.events.record(NetworkEvent::TradingLiquidityUpdated {
            context_id,
            pool,
            reserve_token: self.config.network_token,
            liquidity: data.liquidity.network_token_trading_liquidity,
        });
    }
}

impl Versioned for Network {
    fn version(&self) -> u16 {
        VERSION
    }
}
