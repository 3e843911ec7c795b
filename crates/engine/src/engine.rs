//! Lending engine facade
//!
//! Owns the market map, the position store and the audit log; wires in the
//! oracle and custody collaborators. Every public operation follows the same
//! discipline: accrue the touched markets, validate everything, settle
//! custody, and only then mutate the ledger - a failure anywhere leaves the
//! ledger exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lendledger_core::{AccountId, Amount, Asset};
use lendledger_custody::AssetCustody;
use lendledger_oracle::PriceOracle;
use rust_decimal::Decimal;
use serde_json::json;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::{EventKind, EventLog, LedgerEvent};
use crate::health::{self, BalanceAdjustment, Health};
use crate::liquidation::{seized_collateral, LiquidationOutcome};
use crate::market::{Market, MarketInfo, MarketParams};
use crate::position::{PositionStore, PositionSummary};

fn not_listed(asset: &Asset) -> EngineError {
    EngineError::NotListed {
        asset: asset.clone(),
    }
}

fn ensure_positive(amount: Amount) -> Result<(), EngineError> {
    if amount.is_zero() {
        return Err(EngineError::InvalidParameter {
            name: "amount".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

/// Multi-market collateralized lending ledger
pub struct LendingEngine {
    config: EngineConfig,
    markets: HashMap<Asset, Market>,
    positions: PositionStore,
    oracle: Arc<dyn PriceOracle>,
    custody: Arc<dyn AssetCustody>,
    events: EventLog,
}

impl LendingEngine {
    /// Create an engine with no listed markets
    pub fn new(
        config: EngineConfig,
        oracle: Arc<dyn PriceOracle>,
        custody: Arc<dyn AssetCustody>,
    ) -> Self {
        Self {
            config,
            markets: HashMap::new(),
            positions: PositionStore::new(),
            oracle,
            custody,
            events: EventLog::new(),
        }
    }

    /// The engine's risk configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Committed operations, in commit order
    pub fn events(&self) -> &[LedgerEvent] {
        self.events.all()
    }

    /// Take all recorded events, leaving the log empty.
    ///
    /// Hosts call this to move the audit trail into their own durable sink.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    /// List a new market for `asset`.
    pub fn list_market(
        &mut self,
        asset: Asset,
        params: MarketParams,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if self.markets.contains_key(&asset) {
            return Err(EngineError::AlreadyListed { asset });
        }
        params.validate()?;

        let market = Market::new(asset.clone(), params, now);
        self.markets.insert(asset.clone(), market);

        tracing::info!(asset = %asset, "market listed");
        self.events.record(LedgerEvent::new(
            EventKind::MarketListed,
            None,
            asset,
            Decimal::ZERO,
            now,
        ));
        Ok(())
    }

    /// Supply `amount` of `asset` from `account` into the market.
    ///
    /// Supplying never needs a health check - it strictly improves health.
    pub fn supply(
        &mut self,
        account: &AccountId,
        asset: &Asset,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        ensure_positive(amount)?;

        let supply_index = {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.accrue(now);
            market.supply_index
        };

        self.custody.transfer_in(asset, account, amount)?;

        {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.total_supply += amount.value();
        }
        let position = self.positions.supply_mut(account, asset, supply_index);
        position.refresh(supply_index);
        position.balance += amount.value();

        tracing::info!(account = %account, asset = %asset, amount = %amount, "supply committed");
        self.events.record(LedgerEvent::new(
            EventKind::Supplied,
            Some(account.clone()),
            asset.clone(),
            amount.value(),
            now,
        ));
        Ok(())
    }

    /// Withdraw `amount` of `asset` back to `account`.
    ///
    /// Rejected if the position is too small, if the liquidity is out on
    /// loan, or if the account would end up below the minimum health ratio.
    pub fn withdraw(
        &mut self,
        account: &AccountId,
        asset: &Asset,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        ensure_positive(amount)?;
        let requested = amount.value();

        let (supply_index, available_liquidity) = {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.accrue(now);
            (market.supply_index, market.available_liquidity())
        };

        let current = self.positions.supply_balance(account, asset, supply_index);
        if current < requested {
            return Err(EngineError::InsufficientBalance {
                account: account.clone(),
                asset: asset.clone(),
                available: current,
                requested,
            });
        }
        if available_liquidity < requested {
            return Err(EngineError::InsufficientLiquidity {
                asset: asset.clone(),
                available: available_liquidity,
                requested,
            });
        }

        let adjustment = BalanceAdjustment::withdraw(asset.clone(), requested);
        let minimum = self.config.min_collateral_ratio();
        if let Health::Ratio(ratio) = self.evaluate_health(account, Some(&adjustment), now)? {
            if ratio < minimum {
                tracing::warn!(account = %account, asset = %asset, %ratio, "withdraw rejected: position would become unhealthy");
                return Err(EngineError::UnhealthyPosition { ratio, minimum });
            }
        }

        self.custody.transfer_out(asset, account, amount)?;

        {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.decrease_supply(requested)?;
        }
        let position = self.positions.supply_mut(account, asset, supply_index);
        position.refresh(supply_index);
        position.balance -= requested;

        tracing::info!(account = %account, asset = %asset, amount = %amount, "withdraw committed");
        self.events.record(LedgerEvent::new(
            EventKind::Withdrawn,
            Some(account.clone()),
            asset.clone(),
            requested,
            now,
        ));
        Ok(())
    }

    /// Borrow `amount` of `asset` against the account's cross-market
    /// collateral.
    pub fn borrow(
        &mut self,
        account: &AccountId,
        asset: &Asset,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        ensure_positive(amount)?;
        let requested = amount.value();

        let (borrow_index, available_liquidity) = {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.accrue(now);
            (market.borrow_index, market.available_liquidity())
        };

        if available_liquidity < requested {
            return Err(EngineError::InsufficientLiquidity {
                asset: asset.clone(),
                available: available_liquidity,
                requested,
            });
        }

        let adjustment = BalanceAdjustment::borrow(asset.clone(), requested);
        let minimum = self.config.min_collateral_ratio();
        if let Health::Ratio(ratio) = self.evaluate_health(account, Some(&adjustment), now)? {
            if ratio < minimum {
                tracing::warn!(account = %account, asset = %asset, %ratio, "borrow rejected: insufficient collateral");
                return Err(EngineError::InsufficientCollateral { ratio, minimum });
            }
        }

        self.custody.transfer_out(asset, account, amount)?;

        {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.total_borrows += requested;
        }
        let position = self.positions.borrow_mut(account, asset, borrow_index, now);
        position.refresh(borrow_index, now);
        position.balance += requested;

        tracing::info!(account = %account, asset = %asset, amount = %amount, "borrow committed");
        self.events.record(LedgerEvent::new(
            EventKind::Borrowed,
            Some(account.clone()),
            asset.clone(),
            requested,
            now,
        ));
        Ok(())
    }

    /// Repay up to `amount` of the account's debt in `asset`.
    ///
    /// The amount is clamped to the outstanding debt; only the clamped amount
    /// is pulled from custody. Returns what was actually repaid.
    pub fn repay(
        &mut self,
        account: &AccountId,
        asset: &Asset,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Amount, EngineError> {
        ensure_positive(amount)?;

        let borrow_index = {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.accrue(now);
            market.borrow_index
        };

        let debt = self.positions.borrow_balance(account, asset, borrow_index);
        let repaid = amount.value().min(debt);
        if repaid.is_zero() {
            return Ok(Amount::ZERO);
        }
        let repaid_amount = Amount::new_unchecked(repaid);

        self.custody.transfer_in(asset, account, repaid_amount)?;

        {
            let market = self.markets.get_mut(asset).ok_or_else(|| not_listed(asset))?;
            market.decrease_borrows(repaid)?;
        }
        let position = self.positions.borrow_mut(account, asset, borrow_index, now);
        position.refresh(borrow_index, now);
        position.balance -= repaid;

        tracing::info!(account = %account, asset = %asset, %repaid, "repay committed");
        self.events.record(
            LedgerEvent::new(
                EventKind::Repaid,
                Some(account.clone()),
                asset.clone(),
                repaid,
                now,
            )
            .with_detail("requested", json!(amount.value().to_string())),
        );
        Ok(repaid_amount)
    }

    /// Liquidate an unhealthy borrower: `liquidator` repays `repay_amount`
    /// of the borrower's debt in `repay_asset` and receives discounted
    /// collateral from the borrower's supply in `collateral_asset`.
    ///
    /// The seizure bypasses the withdraw health check - liquidation is the
    /// designated escape valve from an unhealthy state. A shortfall in
    /// seizable collateral rejects the call rather than capping it.
    pub fn liquidate(
        &mut self,
        liquidator: &AccountId,
        borrower: &AccountId,
        repay_asset: &Asset,
        collateral_asset: &Asset,
        repay_amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<LiquidationOutcome, EngineError> {
        if liquidator == borrower {
            return Err(EngineError::SelfLiquidation);
        }
        ensure_positive(repay_amount)?;
        let repaid = repay_amount.value();

        let repay_borrow_index = {
            let market = self
                .markets
                .get_mut(repay_asset)
                .ok_or_else(|| not_listed(repay_asset))?;
            market.accrue(now);
            market.borrow_index
        };
        let collateral_supply_index = {
            let market = self
                .markets
                .get_mut(collateral_asset)
                .ok_or_else(|| not_listed(collateral_asset))?;
            market.accrue(now);
            market.supply_index
        };

        let health = self.evaluate_health(borrower, None, now)?;
        let minimum = self.config.min_collateral_ratio();
        let health_before = match health {
            Health::Ratio(ratio) if ratio < minimum => ratio,
            other => {
                return Err(EngineError::AccountHealthy {
                    account: borrower.clone(),
                    health: other.to_string(),
                });
            }
        };

        let debt = self
            .positions
            .borrow_balance(borrower, repay_asset, repay_borrow_index);
        if repaid > debt {
            return Err(EngineError::RepayExceedsDebt {
                asset: repay_asset.clone(),
                debt,
                requested: repaid,
            });
        }

        let max_age = self.config.max_quote_age_secs();
        let repay_price = health::validated_price(self.oracle.as_ref(), repay_asset, now, max_age)?;
        let collateral_price =
            health::validated_price(self.oracle.as_ref(), collateral_asset, now, max_age)?;
        let seized = seized_collateral(
            repaid,
            repay_price,
            collateral_price,
            self.config.liquidation_discount(),
        );

        let collateral_balance =
            self.positions
                .supply_balance(borrower, collateral_asset, collateral_supply_index);
        if collateral_balance < seized {
            return Err(EngineError::InsufficientCollateralToSeize {
                asset: collateral_asset.clone(),
                available: collateral_balance,
                required: seized,
            });
        }

        self.custody.transfer_in(repay_asset, liquidator, repay_amount)?;
        if let Err(err) =
            self.custody
                .transfer_out(collateral_asset, liquidator, Amount::new_unchecked(seized))
        {
            // Unwind the first custody leg so no value is stranded
            if let Err(refund_err) =
                self.custody.transfer_out(repay_asset, liquidator, repay_amount)
            {
                tracing::error!(
                    liquidator = %liquidator,
                    asset = %repay_asset,
                    error = %refund_err,
                    "refund of liquidation repayment failed"
                );
            }
            return Err(err.into());
        }

        {
            let market = self
                .markets
                .get_mut(repay_asset)
                .ok_or_else(|| not_listed(repay_asset))?;
            market.decrease_borrows(repaid)?;
        }
        {
            let market = self
                .markets
                .get_mut(collateral_asset)
                .ok_or_else(|| not_listed(collateral_asset))?;
            market.decrease_supply(seized)?;
        }
        {
            let position =
                self.positions
                    .borrow_mut(borrower, repay_asset, repay_borrow_index, now);
            position.refresh(repay_borrow_index, now);
            position.balance -= repaid;
        }
        {
            let position =
                self.positions
                    .supply_mut(borrower, collateral_asset, collateral_supply_index);
            position.refresh(collateral_supply_index);
            position.balance -= seized;
        }

        let outcome = LiquidationOutcome {
            borrower: borrower.clone(),
            liquidator: liquidator.clone(),
            repay_asset: repay_asset.clone(),
            collateral_asset: collateral_asset.clone(),
            repaid,
            seized,
            health_before,
        };

        tracing::info!(
            borrower = %borrower,
            liquidator = %liquidator,
            %repaid,
            %seized,
            "liquidation settled"
        );
        self.events.record(
            LedgerEvent::new(
                EventKind::Liquidated,
                Some(liquidator.clone()),
                repay_asset.clone(),
                repaid,
                now,
            )
            .with_detail("borrower", json!(borrower.as_str()))
            .with_detail("collateral_asset", json!(collateral_asset.code()))
            .with_detail("seized", json!(seized.to_string()))
            .with_detail("health_before", json!(health_before.to_string())),
        );
        Ok(outcome)
    }

    /// Snapshot of one market's aggregates
    pub fn market_info(&self, asset: &Asset) -> Result<MarketInfo, EngineError> {
        self.markets
            .get(asset)
            .map(MarketInfo::from)
            .ok_or_else(|| not_listed(asset))
    }

    /// An account's current balances in one market, interest included
    pub fn account_position(
        &self,
        account: &AccountId,
        asset: &Asset,
    ) -> Result<PositionSummary, EngineError> {
        let market = self.markets.get(asset).ok_or_else(|| not_listed(asset))?;
        Ok(PositionSummary {
            account: account.clone(),
            asset: asset.clone(),
            supplied: self
                .positions
                .supply_balance(account, asset, market.supply_index),
            borrowed: self
                .positions
                .borrow_balance(account, asset, market.borrow_index),
        })
    }

    /// Cross-market health of an account, priced fresh from the oracle
    pub fn health_ratio(
        &self,
        account: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Health, EngineError> {
        self.evaluate_health(account, None, now)
    }

    /// Scan all borrowers and return those eligible for liquidation
    pub fn liquidatable_accounts(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<(AccountId, Decimal)>, EngineError> {
        let minimum = self.config.min_collateral_ratio();
        let mut eligible = Vec::new();

        for account in self.positions.borrowing_accounts() {
            if let Health::Ratio(ratio) = self.evaluate_health(&account, None, now)? {
                if ratio < minimum {
                    eligible.push((account, ratio));
                }
            }
        }

        Ok(eligible)
    }

    fn evaluate_health(
        &self,
        account: &AccountId,
        adjustment: Option<&BalanceAdjustment>,
        now: DateTime<Utc>,
    ) -> Result<Health, EngineError> {
        health::evaluate(
            &self.markets,
            &self.positions,
            self.oracle.as_ref(),
            account,
            adjustment,
            now,
            self.config.max_quote_age_secs(),
        )
    }
}
