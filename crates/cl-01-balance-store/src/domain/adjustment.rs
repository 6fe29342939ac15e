//! # Adjustment Engine
//!
//! Every balance mutation in the ledger funnels through [`adjust`]. The
//! dry-run twin [`can_adjust`] returns the same verdict without writing.

use crate::domain::errors::AdjustmentError;
use crate::ports::{BalanceLedger, BalanceReader};
use shared_types::{Address, AssetId, Delta, EventLog, LedgerEvent, U256};

/// Apply `delta` to one balance cell.
///
/// Returns the delta that was actually applied. With `allow_clamp`, a debit
/// larger than the balance drains the cell instead of failing and emits
/// [`LedgerEvent::AmountAdjusted`].
pub fn adjust<L, E>(
    ledger: &mut L,
    events: &mut E,
    account: Address,
    asset: AssetId,
    delta: Delta,
    allow_clamp: bool,
) -> Result<Delta, AdjustmentError>
where
    L: BalanceLedger + ?Sized,
    E: EventLog + ?Sized,
{
    let have = ledger.balance(&account, &asset);

    match delta {
        Delta::Credit(amount) => {
            let updated = have
                .checked_add(amount)
                .ok_or(AdjustmentError::Overflow {
                    account,
                    asset,
                    balance: have,
                    credit: amount,
                })?;
            ledger.set_balance(account, asset, updated);
            Ok(delta)
        }
        Delta::Debit(want) if want <= have => {
            ledger.set_balance(account, asset, have - want);
            Ok(delta)
        }
        Delta::Debit(want) if allow_clamp => {
            ledger.set_balance(account, asset, U256::zero());
            events.emit(LedgerEvent::AmountAdjusted {
                account,
                asset,
                requested: want,
                actual: have,
            });
            tracing::debug!(
                asset = %asset,
                requested = %want,
                actual = %have,
                "debit clamped to available balance"
            );
            Ok(Delta::Debit(have))
        }
        Delta::Debit(want) => Err(AdjustmentError::InsufficientBalance {
            account,
            asset,
            requested: want,
            available: have,
        }),
    }
}

/// Would [`adjust`] succeed? Never mutates.
pub fn can_adjust<R>(
    reader: &R,
    account: &Address,
    asset: &AssetId,
    delta: Delta,
    allow_clamp: bool,
) -> bool
where
    R: BalanceReader + ?Sized,
{
    let have = reader.balance(account, asset);
    match delta {
        Delta::Credit(amount) => have.checked_add(amount).is_some(),
        Delta::Debit(want) => allow_clamp || want <= have,
    }
}

/// Resolve the withdraw-all sentinel: an amount of zero means the whole
/// current balance.
pub fn resolve_amount<R>(reader: &R, account: &Address, asset: &AssetId, amount: U256) -> U256
where
    R: BalanceReader + ?Sized,
{
    if amount.is_zero() {
        reader.balance(account, asset)
    } else {
        amount
    }
}
