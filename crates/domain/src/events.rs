//! Events emitted by the network router and the pool collections.
//!
//! Events are recorded in emission order; consumers reconstruct state from
//! this order, so every operation emits a fixed sequence.

use crate::enums::FeeType;
use crate::token::{Address, Token};
use crate::value_objects::{ContextId, Fraction};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Events emitted by the network router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum NetworkEvent {
    /// A pool collection was registered.
    PoolCollectionAdded {
        pool_type: u16,
        pool_collection: Address,
    },
    /// A pool collection was unregistered.
    PoolCollectionRemoved {
        pool_type: u16,
        pool_collection: Address,
    },
    /// The latest collection of a pool type changed.
    LatestPoolCollectionReplaced {
        pool_type: u16,
        prev_pool_collection: Option<Address>,
        new_pool_collection: Option<Address>,
    },
    /// A pool was created in a collection.
    PoolAdded {
        pool_type: u16,
        pool: Token,
        pool_collection: Address,
    },
    /// The external protection wallet was replaced.
    ExternalProtectionWalletUpdated {
        prev_wallet: Option<Address>,
        new_wallet: Option<Address>,
    },
    /// Base tokens were deposited into a pool.
    BaseTokenDeposited {
        context_id: ContextId,
        token: Token,
        provider: Address,
        pool_collection: Address,
        deposit_amount: U256,
        pool_token_amount: U256,
    },
    /// Network tokens were deposited into the network token pool.
    NetworkTokenDeposited {
        context_id: ContextId,
        provider: Address,
        deposit_amount: U256,
        pool_token_amount: U256,
        gov_token_amount: U256,
    },
    /// Base tokens were withdrawn from a pool.
    BaseTokenWithdrawn {
        context_id: ContextId,
        token: Token,
        provider: Address,
        pool_collection: Address,
        base_token_amount: U256,
        pool_token_amount: U256,
        external_protection_base_token_amount: U256,
        network_token_amount: U256,
        withdrawal_fee_amount: U256,
    },
    /// Network tokens were withdrawn from the network token pool.
    NetworkTokenWithdrawn {
        context_id: ContextId,
        provider: Address,
        network_token_amount: U256,
        pool_token_amount: U256,
        gov_token_amount: U256,
        withdrawal_fee_amount: U256,
    },
    /// One trade hop was executed.
    TokensTraded {
        context_id: ContextId,
        pool: Token,
        source_token: Token,
        target_token: Token,
        source_amount: U256,
        target_amount: U256,
        trader: Address,
    },
    /// Fees were credited to stakers. `pool` is the network token when the
    /// fee accrues to the network token pool.
    FeesCollected {
        context_id: ContextId,
        pool: Token,
        fee_type: FeeType,
        amount: U256,
        staked_balance: U256,
    },
    /// Totals of one side of the network changed.
    TotalLiquidityUpdated {
        context_id: ContextId,
        pool: Token,
        pool_token_supply: U256,
        staked_balance: U256,
        actual_balance: U256,
    },
    /// Trading liquidity of one reserve of a pool changed.
    TradingLiquidityUpdated {
        context_id: ContextId,
        pool: Token,
        reserve_token: Token,
        liquidity: U256,
    },
}

impl NetworkEvent {
    /// Event name as it appears in serialized output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PoolCollectionAdded { .. } => "PoolCollectionAdded",
            Self::PoolCollectionRemoved { .. } => "PoolCollectionRemoved",
            Self::LatestPoolCollectionReplaced { .. } => "LatestPoolCollectionReplaced",
            Self::PoolAdded { .. } => "PoolAdded",
            Self::ExternalProtectionWalletUpdated { .. } => "ExternalProtectionWalletUpdated",
            Self::BaseTokenDeposited { .. } => "BaseTokenDeposited",
            Self::NetworkTokenDeposited { .. } => "NetworkTokenDeposited",
            Self::BaseTokenWithdrawn { .. } => "BaseTokenWithdrawn",
            Self::NetworkTokenWithdrawn { .. } => "NetworkTokenWithdrawn",
            Self::TokensTraded { .. } => "TokensTraded",
            Self::FeesCollected { .. } => "FeesCollected",
            Self::TotalLiquidityUpdated { .. } => "TotalLiquidityUpdated",
            Self::TradingLiquidityUpdated { .. } => "TradingLiquidityUpdated",
        }
    }

    /// Context id of operation events; registry events carry none.
    #[must_use]
    pub fn context_id(&self) -> Option<ContextId> {
        match self {
            Self::BaseTokenDeposited { context_id, .. }
            | Self::NetworkTokenDeposited { context_id, .. }
            | Self::BaseTokenWithdrawn { context_id, .. }
            | Self::NetworkTokenWithdrawn { context_id, .. }
            | Self::TokensTraded { context_id, .. }
            | Self::FeesCollected { context_id, .. }
            | Self::TotalLiquidityUpdated { context_id, .. }
            | Self::TradingLiquidityUpdated { context_id, .. } => Some(*context_id),
            _ => None,
        }
    }
}

/// Events emitted by a pool collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum PoolCollectionEvent {
    PoolCreated {
        pool_token: Token,
        token: Token,
    },
    DefaultTradingFeePpmUpdated {
        prev_fee_ppm: u32,
        new_fee_ppm: u32,
    },
    TradingFeePpmUpdated {
        pool: Token,
        prev_fee_ppm: u32,
        new_fee_ppm: u32,
    },
    InitialRateUpdated {
        pool: Token,
        prev_rate: Fraction,
        new_rate: Fraction,
    },
    DepositLimitUpdated {
        pool: Token,
        prev_deposit_limit: U256,
        new_deposit_limit: U256,
    },
    DepositsEnabledUpdated {
        pool: Token,
        prev_status: bool,
        new_status: bool,
    },
}

/// Append-only event log.
#[derive(Debug, Clone)]
pub struct EventLog<E> {
    events: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventLog<E> {
    /// Creates a new empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Records an event.
    pub fn record(&mut self, event: E) {
        self.events.push(event);
    }

    /// Returns all events.
    #[must_use]
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// Returns the events recorded after the first `mark` events.
    #[must_use]
    pub fn since(&self, mark: usize) -> &[E] {
        self.events.get(mark..).unwrap_or(&[])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clears all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventLog<NetworkEvent> {
    /// Returns the count of events with the given name.
    #[must_use]
    pub fn count_by_name(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_record_and_query() {
        let mut log = EventLog::new();
        let collection = Address::from_low_u64_be(9);
        log.record(NetworkEvent::PoolCollectionAdded {
            pool_type: 1,
            pool_collection: collection,
        });
        log.record(NetworkEvent::LatestPoolCollectionReplaced {
            pool_type: 1,
            prev_pool_collection: None,
            new_pool_collection: Some(collection),
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.count_by_name("PoolCollectionAdded"), 1);
        assert_eq!(log.since(1).len(), 1);
        assert!(log.since(5).is_empty());
        assert!(log.events()[0].context_id().is_none());

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = NetworkEvent::TradingLiquidityUpdated {
            context_id: ContextId::default(),
            pool: Token::from_label("TKN"),
            reserve_token: Token::from_label("TKN"),
            liquidity: U256::from(5u64),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "TradingLiquidityUpdated");
        assert_eq!(event.context_id(), Some(ContextId::default()));
    }
}
