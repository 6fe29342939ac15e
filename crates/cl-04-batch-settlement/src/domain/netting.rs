//! # Structural Validation and Netting
//!
//! Checks that need only the payload, not balances. Any failure here is
//! fatal for the whole batch.

use super::entities::{AssetAdjustments, SettlementBatch, WalletAdjustment};
use super::errors::BatchError;
use shared_types::{AssetId, U256};

/// Reject batches whose shape is wrong: empty, non-parallel trade hashes,
/// empty asset lists, or wallet indices outside the wallet list.
pub fn validate_structure(batch: &SettlementBatch) -> Result<(), BatchError> {
    if batch.wallets.is_empty() || batch.adjustments.is_empty() {
        return Err(BatchError::EmptyBatch);
    }

    if batch.trade_hashes.len() != batch.wallets.len() {
        return Err(BatchError::TradeHashCountMismatch {
            wallets: batch.wallets.len(),
            lists: batch.trade_hashes.len(),
        });
    }

    for list in &batch.adjustments {
        if list.increments.is_empty() && list.decrements.is_empty() {
            return Err(BatchError::EmptyAdjustmentList { asset: list.asset });
        }

        for adjustment in list.increments.iter().chain(&list.decrements) {
            if batch.wallet(adjustment.wallet_index).is_none() {
                return Err(BatchError::WalletIndexOutOfRange {
                    index: adjustment.wallet_index,
                    wallets: batch.wallets.len(),
                });
            }
        }
    }

    Ok(())
}

/// Enforce `sum(increments) + fee == sum(decrements)` for every asset list.
pub fn check_net_zero(batch: &SettlementBatch) -> Result<(), BatchError> {
    batch.adjustments.iter().try_for_each(check_list)
}

fn check_list(list: &AssetAdjustments) -> Result<(), BatchError> {
    let credits = sum(list.asset, &list.increments)?
        .checked_add(list.fee)
        .ok_or(BatchError::AmountOverflow { asset: list.asset })?;
    let debits = sum(list.asset, &list.decrements)?;

    if credits != debits {
        return Err(BatchError::NetNonZero {
            asset: list.asset,
            credits,
            debits,
        });
    }
    Ok(())
}

fn sum(asset: AssetId, adjustments: &[WalletAdjustment]) -> Result<U256, BatchError> {
    adjustments.iter().try_fold(U256::zero(), |acc, adjustment| {
        acc.checked_add(adjustment.amount)
            .ok_or(BatchError::AmountOverflow { asset })
    })
}
