//! # Withdrawal Batch Processing
//!
//! Withdrawal batches execute immediately and item by item. Each item runs
//! on its own overlay stacked on the batch overlay; a failing item is
//! dropped with a `WithdrawalFailed` event and later items see exactly the
//! balances they would have seen had it never been listed.
//!
//! Per item:
//!
//! 1. Authenticate: signature by the sender or its linked signer, or a null
//!    signature matching the sender's pending sovereign request.
//! 2. Reject reused nonces.
//! 3. Resolve the withdraw-all sentinel against the current balance.
//! 4. Debit the sender (clamped if enabled).
//! 5. Credit the fee to the fee account; pay out the remainder.

use super::entities::{WithdrawalBatch, WithdrawalItem};
use super::errors::BatchError;
use cl_01_balance_store::{
    adjust, resolve_amount, AdjustmentError, BalanceLedger, BalanceOverlay, BalanceReader,
    ChangeSet,
};
use cl_02_authentication::{
    Authenticator, LinkedSignerRegistry, ReplayGuard, SignatureRecovery, TypedDomain,
};
use cl_03_sovereign_withdrawal::{SovereignBook, SovereignRequest};
use shared_types::{
    Address, AssetId, Delta, ErrorCode, EventLog, LedgerEvent, Payout, U256,
};
use std::collections::HashSet;

/// Read-only ledger state a withdrawal batch is checked against.
pub struct WithdrawalContext<'a, A: SignatureRecovery> {
    pub authenticator: &'a Authenticator<A>,
    pub domain: &'a TypedDomain,
    pub signers: &'a LinkedSignerRegistry,
    pub replay: &'a ReplayGuard,
    pub sovereign: &'a SovereignBook,
    pub fee_account: Address,
    /// Clamp over-requests to the available balance instead of failing.
    pub clamp: bool,
}

/// How an applied item was authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Signed { nonce: u64 },
    Sovereign(SovereignRequest),
}

/// A withdrawal that went through, with what is needed to reverse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedWithdrawal {
    pub sequence: u64,
    pub account: Address,
    pub asset: AssetId,
    /// Total taken from the account, fee included.
    pub debited: U256,
    pub fee: U256,
    pub authorization: Authorization,
}

impl AppliedWithdrawal {
    pub fn payout(&self) -> Option<Payout> {
        let amount = self.debited.saturating_sub(self.fee);
        (!amount.is_zero()).then_some(Payout {
            recipient: self.account,
            asset: self.asset,
            amount,
        })
    }
}

/// Outcome of a processed withdrawal batch, ready to commit.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalReport {
    pub changes: ChangeSet,
    pub applied: Vec<AppliedWithdrawal>,
    pub failed: u32,
}

impl WithdrawalReport {
    pub fn payouts(&self) -> Vec<Payout> {
        self.applied.iter().filter_map(AppliedWithdrawal::payout).collect()
    }

    /// Accounts whose pending sovereign request this batch completed.
    pub fn sovereign_completions(&self) -> impl Iterator<Item = &Address> {
        self.applied
            .iter()
            .filter(|w| matches!(w.authorization, Authorization::Sovereign(_)))
            .map(|w| &w.account)
    }

    /// `(account, nonce)` pairs consumed by signed items.
    pub fn consumed_nonces(&self) -> impl Iterator<Item = (Address, u64)> + '_ {
        self.applied.iter().filter_map(|w| match w.authorization {
            Authorization::Signed { nonce } => Some((w.account, nonce)),
            Authorization::Sovereign(_) => None,
        })
    }
}

/// Process every item of `batch` over `reader` without touching it.
pub fn process_withdrawals<R, A, E>(
    reader: &R,
    ctx: &WithdrawalContext<'_, A>,
    batch: &WithdrawalBatch,
    events: &mut E,
) -> Result<WithdrawalReport, BatchError>
where
    R: BalanceReader + ?Sized,
    A: SignatureRecovery,
    E: EventLog + ?Sized,
{
    if batch.items.is_empty() {
        return Err(BatchError::EmptyBatch);
    }

    let mut overlay = BalanceOverlay::new(reader);
    let mut batch_nonces: HashSet<(Address, u64)> = HashSet::new();
    let mut batch_sovereign: HashSet<Address> = HashSet::new();
    let mut applied = Vec::new();
    let mut failed = 0u32;

    for item in &batch.items {
        let mut item_events: Vec<LedgerEvent> = Vec::new();
        let mut item_overlay = BalanceOverlay::new(&overlay);

        let outcome = authorize(ctx, item, &batch_nonces, &batch_sovereign).and_then(|auth| {
            debit_item(&mut item_overlay, &mut item_events, ctx, item, auth)
        });

        match outcome {
            Ok(done) => {
                let changes = item_overlay.into_changeset();
                overlay.absorb(changes);
                match done.authorization {
                    Authorization::Signed { nonce } => {
                        batch_nonces.insert((item.sender, nonce));
                    }
                    Authorization::Sovereign(_) => {
                        batch_sovereign.insert(item.sender);
                    }
                }
                for event in item_events {
                    events.emit(event);
                }
                events.emit(LedgerEvent::Withdrawal {
                    sequence: item.sequence,
                    account: item.sender,
                    asset: item.asset,
                    amount: done.debited,
                    fee: done.fee,
                });
                applied.push(done);
            }
            Err(error) => {
                drop(item_overlay);
                let balance = overlay.balance(&item.sender, &item.asset);
                tracing::debug!(
                    sequence = item.sequence,
                    asset = %item.asset,
                    error = %error,
                    code = error.code(),
                    "withdrawal item skipped"
                );
                events.emit(LedgerEvent::WithdrawalFailed {
                    sequence: item.sequence,
                    account: item.sender,
                    asset: item.asset,
                    requested: item.amount,
                    fee: item.fee,
                    balance,
                    error,
                });
                failed += 1;
            }
        }
    }

    Ok(WithdrawalReport {
        changes: overlay.into_changeset(),
        applied,
        failed,
    })
}

fn authorize<A: SignatureRecovery>(
    ctx: &WithdrawalContext<'_, A>,
    item: &WithdrawalItem,
    batch_nonces: &HashSet<(Address, u64)>,
    batch_sovereign: &HashSet<Address>,
) -> Result<Authorization, ErrorCode> {
    if item.signature.is_null() {
        // The account never agreed to a fee, so a sovereign exit pays none.
        if !item.fee.is_zero()
            || batch_sovereign.contains(&item.sender)
            || !ctx.sovereign.matches(&item.sender, &item.asset, item.amount)
        {
            return Err(ErrorCode::InvalidSignature);
        }
        let pending = ctx
            .sovereign
            .pending(&item.sender)
            .ok_or(ErrorCode::InvalidSignature)?;
        return Ok(Authorization::Sovereign(pending));
    }

    let digest = ctx
        .domain
        .withdraw_digest(&item.sender, &item.asset, item.amount, item.nonce);
    let delegate = ctx.signers.delegate_of(&item.sender);
    ctx.authenticator
        .authenticate(&item.sender, &digest, &item.signature, delegate.as_ref())
        .map_err(|_| ErrorCode::InvalidSignature)?;

    if ctx.replay.is_used(&item.sender, item.nonce)
        || batch_nonces.contains(&(item.sender, item.nonce))
    {
        return Err(ErrorCode::NonceReused);
    }

    Ok(Authorization::Signed { nonce: item.nonce })
}

fn debit_item<L, E, A>(
    ledger: &mut L,
    events: &mut E,
    ctx: &WithdrawalContext<'_, A>,
    item: &WithdrawalItem,
    authorization: Authorization,
) -> Result<AppliedWithdrawal, ErrorCode>
where
    L: BalanceLedger + ?Sized,
    E: EventLog + ?Sized,
    A: SignatureRecovery,
{
    let requested = resolve_amount(&*ledger, &item.sender, &item.asset, item.amount);
    if requested.is_zero() {
        return Err(ErrorCode::InsufficientBalance);
    }

    let debited = adjust(
        ledger,
        events,
        item.sender,
        item.asset,
        Delta::Debit(requested),
        ctx.clamp,
    )
    .map_err(error_code)?
    .amount();

    // A clamp against an empty balance moves nothing and must not spend the nonce.
    if debited.is_zero() {
        return Err(ErrorCode::InsufficientBalance);
    }

    if item.fee > debited {
        return Err(ErrorCode::FeeExceedsAmount);
    }

    if !item.fee.is_zero() {
        adjust(
            ledger,
            events,
            ctx.fee_account,
            item.asset,
            Delta::Credit(item.fee),
            false,
        )
        .map_err(error_code)?;
    }

    Ok(AppliedWithdrawal {
        sequence: item.sequence,
        account: item.sender,
        asset: item.asset,
        debited,
        fee: item.fee,
        authorization,
    })
}

fn error_code(error: AdjustmentError) -> ErrorCode {
    match error {
        AdjustmentError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
        AdjustmentError::Overflow { .. } => ErrorCode::BalanceOverflow,
    }
}

/// Balance changes that reverse `applied`: fees come back out of the fee
/// account and each account is re-credited with what it was debited.
pub fn compensate<R>(
    reader: &R,
    fee_account: Address,
    applied: &[AppliedWithdrawal],
) -> Result<ChangeSet, BatchError>
where
    R: BalanceReader + ?Sized,
{
    let mut overlay = BalanceOverlay::new(reader);
    let mut events = shared_types::NullEventLog;

    for withdrawal in applied.iter().rev() {
        if !withdrawal.fee.is_zero() {
            adjust(
                &mut overlay,
                &mut events,
                fee_account,
                withdrawal.asset,
                Delta::Debit(withdrawal.fee),
                false,
            )
            .map_err(BatchError::CompensationFailed)?;
        }
        adjust(
            &mut overlay,
            &mut events,
            withdrawal.account,
            withdrawal.asset,
            Delta::Credit(withdrawal.debited),
            false,
        )?;
    }

    Ok(overlay.into_changeset())
}
