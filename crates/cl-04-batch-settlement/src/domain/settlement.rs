//! # Settlement Evaluation
//!
//! Runs a settlement batch against a scratch overlay in listed order: for
//! each asset list the fee and increments are credited first, then every
//! decrement is debited.
//!
//! The same routine serves both phases:
//!
//! | Mode | Decrement that does not fit |
//! |------|-----------------------------|
//! | [`Mode::DryRun`] (prepare) | `SettlementFailed` event, skip, keep going |
//! | [`Mode::Strict`] (submit) | `SettlementInconsistent`, abort |

use super::entities::SettlementBatch;
use super::errors::BatchError;
use cl_01_balance_store::{adjust, can_adjust, BalanceOverlay, BalanceReader, ChangeSet};
use shared_types::{Address, Delta, EventLog, LedgerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Strict,
}

/// Result of evaluating a batch.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Final balances of every cell the batch touched.
    pub changes: ChangeSet,
    /// Decrements that did not fit (dry run only).
    pub failures: u32,
}

impl Evaluation {
    pub fn is_viable(&self) -> bool {
        self.failures == 0
    }
}

/// Evaluate `batch` over `reader` without touching it.
///
/// Callers must run [`super::netting::validate_structure`] first; wallet
/// indices are assumed to be in range.
pub fn evaluate<R, E>(
    reader: &R,
    fee_account: Address,
    batch: &SettlementBatch,
    mode: Mode,
    events: &mut E,
) -> Result<Evaluation, BatchError>
where
    R: BalanceReader + ?Sized,
    E: EventLog + ?Sized,
{
    let mut overlay = BalanceOverlay::new(reader);
    let mut failures = 0u32;

    for list in &batch.adjustments {
        let asset = list.asset;

        if !list.fee.is_zero() {
            adjust(&mut overlay, events, fee_account, asset, Delta::Credit(list.fee), false)?;
        }

        for increment in &list.increments {
            let wallet = wallet_at(batch, increment.wallet_index)?;
            adjust(&mut overlay, events, wallet, asset, Delta::Credit(increment.amount), false)?;
        }

        for decrement in &list.decrements {
            let wallet = wallet_at(batch, decrement.wallet_index)?;
            let delta = Delta::Debit(decrement.amount);

            if can_adjust(&overlay, &wallet, &asset, delta, false) {
                adjust(&mut overlay, events, wallet, asset, delta, false)?;
                continue;
            }

            let balance = overlay.balance(&wallet, &asset);
            match mode {
                Mode::Strict => {
                    return Err(BatchError::SettlementInconsistent {
                        wallet,
                        asset,
                        requested: decrement.amount,
                        balance,
                    });
                }
                Mode::DryRun => {
                    tracing::debug!(
                        asset = %asset,
                        wallet_index = decrement.wallet_index,
                        requested = %decrement.amount,
                        balance = %balance,
                        "settlement decrement does not fit"
                    );
                    events.emit(LedgerEvent::SettlementFailed {
                        wallet,
                        asset,
                        requested: decrement.amount,
                        balance,
                        trade_hashes: batch.trade_hashes_of(decrement.wallet_index),
                    });
                    failures += 1;
                }
            }
        }
    }

    Ok(Evaluation {
        changes: overlay.into_changeset(),
        failures,
    })
}

fn wallet_at(batch: &SettlementBatch, index: u32) -> Result<Address, BatchError> {
    batch
        .wallet(index)
        .copied()
        .ok_or(BatchError::WalletIndexOutOfRange {
            index,
            wallets: batch.wallets.len(),
        })
}
