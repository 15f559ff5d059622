//! JSON scenarios executed against an in-memory network.

use amm_network_domain::math::spot_rate;
use amm_network_engine::prelude::*;
use anyhow::{Context, Result, anyhow};
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// A list of steps run in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Withdrawal cooldown in seconds, one week when unset.
    #[serde(default)]
    pub lock_duration: Option<u64>,
    pub steps: Vec<Step>,
}

/// One scenario action. Tokens and accounts are referenced by label; `NET`
/// is the network token and `ETH` the native token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    RegisterToken {
        symbol: String,
        #[serde(default = "default_decimals")]
        decimals: u8,
    },
    Mint {
        token: String,
        account: String,
        amount: u64,
    },
    Approve {
        token: String,
        account: String,
    },
    Whitelist {
        token: String,
    },
    SetMintingLimit {
        token: String,
        amount: u64,
    },
    SetWithdrawalFee {
        fee_ppm: u32,
    },
    CreatePool {
        token: String,
    },
    SetInitialRate {
        token: String,
        n: u64,
        d: u64,
    },
    EnableDeposits {
        token: String,
        enabled: bool,
    },
    SetTradingFee {
        token: String,
        fee_ppm: u32,
    },
    SetDepositLimit {
        token: String,
        amount: u64,
    },
    Deposit {
        account: String,
        token: String,
        amount: u64,
    },
    InitWithdrawal {
        account: String,
        token: String,
        amount: u64,
        /// Name the request is referred to by later steps.
        request: String,
    },
    AdvanceTime {
        seconds: u64,
    },
    Withdraw {
        account: String,
        request: String,
    },
    Trade {
        account: String,
        source: String,
        target: String,
        amount: u64,
        #[serde(default)]
        min_return: Option<u64>,
    },
    Quote {
        source: String,
        target: String,
        amount: u64,
    },
}

fn default_decimals() -> u8 {
    18
}

/// In-memory network plus the handles a scenario needs to drive it.
pub struct ScenarioRunner {
    network: Network,
    settings: MemoryNetworkSettings,
    clock: ManualClock,
    owner: Address,
    collection: Address,
    requests: HashMap<String, u64>,
}

impl ScenarioRunner {
    /// Builds a network with one standard pool collection.
    pub fn new(lock_duration: u64, start: u64) -> Result<Self> {
        let config = NetworkConfig::default();
        let settings = MemoryNetworkSettings::new();
        let clock = ManualClock::new(start);
        let pending = MemoryPendingWithdrawals::new(derive_address(&[b"pending-withdrawals"]))
            .with_lock_duration(lock_duration);
        let mut network = Network::new(
            config.clone(),
            Box::new(settings.clone()),
            Box::new(MemoryVault::new(config.vault)),
            Box::new(pending),
            Arc::new(clock.clone()),
        )?;

        let collection_config = PoolCollectionConfig::default().with_owner(config.owner);
        let collection = collection_config.address;
        let standard =
            StandardPoolCollection::new(collection_config, config.address, config.network_token)?;
        network.add_pool_collection(config.owner, Box::new(standard))?;

        Ok(Self {
            network,
            settings,
            clock,
            owner: config.owner,
            collection,
            requests: HashMap::new(),
        })
    }

    /// Builds a runner configured by the scenario.
    pub fn for_scenario(scenario: &Scenario) -> Result<Self> {
        let lock = scenario.lock_duration.unwrap_or(DEFAULT_LOCK_DURATION);
        Self::new(lock, SystemClock.now())
    }

    fn token(&self, label: &str) -> Token {
        match label {
            "NET" => self.network.network_token(),
            "ETH" => Token::NATIVE,
            _ => Token::from_label(label),
        }
    }

    fn account(label: &str) -> Address {
        derive_address(&[b"account", label.as_bytes()])
    }

    fn collection_mut(&mut self) -> Result<&mut (dyn PoolCollection + 'static)> {
        self.network
            .pool_collection_mut(self.collection)
            .ok_or_else(|| anyhow!("pool collection is not registered"))
    }

    /// Runs every step, printing the events each one emits as JSON lines.
    pub fn run(&mut self, scenario: &Scenario) -> Result<()> {
        info!(name = %scenario.name, steps = scenario.steps.len(), "Running scenario");
        for (index, step) in scenario.steps.iter().enumerate() {
            let mark = self.network.events().len();
            self.execute(step)
                .with_context(|| format!("step {} failed: {:?}", index + 1, step))?;
            for event in self.network.event_log().since(mark) {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        Ok(())
    }

    fn execute(&mut self, step: &Step) -> Result<()> {
        let owner = self.owner;
        match step {
            Step::RegisterToken { symbol, decimals } => {
                let token = self.token(symbol);
                self.network.ledger_mut().register_token(
                    token,
                    TokenMetadata::new(symbol.as_str(), symbol.as_str(), *decimals),
                );
            }
            Step::Mint {
                token,
                account,
                amount,
            } => {
                let token = self.token(token);
                self.network
                    .ledger_mut()
                    .mint(token, Self::account(account), U256::from(*amount))?;
            }
            Step::Approve { token, account } => {
                let token = self.token(token);
                let spender = self.network.config().address;
                self.network.ledger_mut().approve(
                    token,
                    Self::account(account),
                    spender,
                    U256::MAX,
                );
            }
            Step::Whitelist { token } => {
                self.settings.add_token_to_whitelist(self.token(token));
            }
            Step::SetMintingLimit { token, amount } => {
                self.settings
                    .set_pool_minting_limit(self.token(token), U256::from(*amount));
            }
            Step::SetWithdrawalFee { fee_ppm } => {
                self.settings.set_withdrawal_fee_ppm(*fee_ppm)?;
            }
            Step::CreatePool { token } => {
                let token = self.token(token);
                self.network.create_pool(owner, STANDARD_POOL_TYPE, token)?;
            }
            Step::SetInitialRate { token, n, d } => {
                let token = self.token(token);
                self.collection_mut()?
                    .set_initial_rate(owner, token, Fraction::new(*n, *d))?;
            }
            Step::EnableDeposits { token, enabled } => {
                let token = self.token(token);
                self.collection_mut()?
                    .enable_deposits(owner, token, *enabled)?;
            }
            Step::SetTradingFee { token, fee_ppm } => {
                let token = self.token(token);
                self.collection_mut()?
                    .set_trading_fee_ppm(owner, token, *fee_ppm)?;
            }
            Step::SetDepositLimit { token, amount } => {
                let token = self.token(token);
                self.collection_mut()?
                    .set_deposit_limit(owner, token, U256::from(*amount))?;
            }
            Step::Deposit {
                account,
                token,
                amount,
            } => {
                let token = self.token(token);
                let amount = U256::from(*amount);
                let value = if token.is_native() { amount } else { U256::zero() };
                self.network
                    .deposit(Self::account(account), token, amount, value)?;
            }
            Step::InitWithdrawal {
                account,
                token,
                amount,
                request,
            } => {
                let pool_token = self.pool_token(self.token(token))?;
                let id = self.network.init_withdrawal(
                    Self::account(account),
                    pool_token,
                    U256::from(*amount),
                )?;
                self.requests.insert(request.clone(), id);
            }
            Step::AdvanceTime { seconds } => {
                self.clock.advance(*seconds);
            }
            Step::Withdraw { account, request } => {
                let id = *self
                    .requests
                    .get(request)
                    .ok_or_else(|| anyhow!("unknown withdrawal request '{request}'"))?;
                let paid = self.network.withdraw(Self::account(account), id)?;
                println!("💸 {account} withdrew {paid} ({request})");
            }
            Step::Trade {
                account,
                source,
                target,
                amount,
                min_return,
            } => {
                let source_token = self.token(source);
                let source_amount = U256::from(*amount);
                let params = TradeParams {
                    source_token,
                    target_token: self.token(target),
                    source_amount,
                    min_return_amount: U256::from(min_return.unwrap_or(1)),
                    deadline: self.clock.now() + 60,
                    beneficiary: None,
                };
                let value = if source_token.is_native() {
                    source_amount
                } else {
                    U256::zero()
                };
                let received = self.network.trade(Self::account(account), params, value)?;
                println!("🔁 {account} traded {amount} {source} for {received} {target}");
            }
            Step::Quote {
                source,
                target,
                amount,
            } => {
                let quote = self.network.target_amount_and_fee(
                    self.token(source),
                    self.token(target),
                    U256::from(*amount),
                )?;
                println!(
                    "📈 {amount} {source} -> {} {target} (fee {})",
                    quote.amount, quote.fee_amount
                );
            }
        }
        Ok(())
    }

    fn pool_token(&self, token: Token) -> Result<Token> {
        if token == self.network.network_token() {
            return Ok(self.network.network_token_pool().pool_token());
        }
        self.network
            .pool_collection(self.collection)
            .and_then(|c| c.pool_data(token))
            .map(|pool| pool.pool_token)
            .ok_or_else(|| anyhow!("no pool for {token}"))
    }

    /// Renders the state of every pool.
    pub fn pool_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row![
            "Pool",
            "Staked",
            "Base liquidity",
            "Network liquidity",
            "Rate",
            "Fee (ppm)",
            "Deposits"
        ]);
        let ledger = self.network.ledger();
        for pool in self.network.liquidity_pools() {
            let Some(data) = self
                .network
                .collection_by_pool(*pool)
                .and_then(|address| self.network.pool_collection(address))
                .and_then(|collection| collection.pool_data(*pool))
            else {
                continue;
            };
            let liquidity = data.liquidity;
            let rate = spot_rate(
                liquidity.base_token_trading_liquidity,
                liquidity.network_token_trading_liquidity,
            )
            .map_or_else(|| "-".to_string(), |rate| rate.round_dp(6).to_string());
            table.add_row(row![
                ledger.symbol(*pool),
                liquidity.staked_balance,
                liquidity.base_token_trading_liquidity,
                liquidity.network_token_trading_liquidity,
                rate,
                data.trading_fee_ppm,
                data.deposits_enabled
            ]);
        }
        let ntp = self.network.network_token_pool();
        table.add_row(row![
            ledger.symbol(ntp.network_token()),
            ntp.staked_balance(),
            "-",
            "-",
            "-",
            "-",
            "-"
        ]);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "name": "single pool",
        "lock_duration": 10,
        "steps": [
            { "action": "register_token", "symbol": "TKN" },
            { "action": "whitelist", "token": "TKN" },
            { "action": "set_minting_limit", "token": "TKN", "amount": 1000000 },
            { "action": "create_pool", "token": "TKN" },
            { "action": "set_initial_rate", "token": "TKN", "n": 1, "d": 1 },
            { "action": "enable_deposits", "token": "TKN", "enabled": true },
            { "action": "mint", "token": "TKN", "account": "alice", "amount": 10000 },
            { "action": "approve", "token": "TKN", "account": "alice" },
            { "action": "deposit", "account": "alice", "token": "TKN", "amount": 10000 },
            { "action": "init_withdrawal", "account": "alice", "token": "TKN", "amount": 10000, "request": "all" },
            { "action": "advance_time", "seconds": 10 },
            { "action": "withdraw", "account": "alice", "request": "all" }
        ]
    }"#;

    #[test]
    fn test_scenario_round_trip() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let mut runner = ScenarioRunner::new(10, 1_000).unwrap();
        runner.run(&scenario).unwrap();

        let alice = ScenarioRunner::account("alice");
        let tkn = runner.token("TKN");
        assert_eq!(
            runner.network.ledger().balance_of(tkn, alice),
            U256::from(10_000u64)
        );
        assert!(runner.pool_table().len() >= 2);
    }

    #[test]
    fn test_failing_step_reports_its_position() {
        let scenario: Scenario = serde_json::from_str(
            r#"{ "steps": [ { "action": "create_pool", "token": "TKN" } ] }"#,
        )
        .unwrap();
        let mut runner = ScenarioRunner::new(10, 1_000).unwrap();
        let err = runner.run(&scenario).unwrap_err();
        assert!(err.to_string().contains("step 1"));
        assert_eq!(
            err.downcast_ref::<NetworkError>(),
            Some(&NetworkError::PoolNotWhitelisted)
        );
    }

    #[test]
    fn test_demo_scenario_runs() {
        let scenario: Scenario = serde_json::from_str(crate::DEMO_SCENARIO).unwrap();
        let mut runner = ScenarioRunner::for_scenario(&scenario).unwrap();
        runner.run(&scenario).unwrap();
    }
}
