//! # Ledger Service
//!
//! The single entry point of the ledger. Every public operation is one
//! atomic call:
//!
//! 1. Check the caller's role.
//! 2. Compute the full effect on scratch state, buffering events.
//! 3. Commit balances, then move funds through [`Custody`].
//! 4. If custody fails, revert everything and return the error.
//! 5. Publish the buffered events.
//!
//! A call that returns `Err` leaves no state change and publishes nothing.

use crate::config::{LedgerConfig, WithdrawalRollbackPolicy};
use crate::domain::roles::non_zero;
use crate::domain::{CommittedWithdrawals, LedgerError, LedgerState, Roles};
use crate::ports::outbound::{Custody, EventSink, TimeSource};
use cl_01_balance_store::{adjust, resolve_amount, BalanceOverlay, BalanceReader};
use cl_02_authentication::{
    Authenticator, EcdsaRecovery, EcdsaSignature, SignatureRecovery, TypedDomain,
};
use cl_03_sovereign_withdrawal::{SovereignDecision, SovereignError, SovereignRequest};
use cl_04_batch_settlement::{
    compensate, payload_hash, process_withdrawals, AppliedWithdrawal, Authorization, BatchError,
    BatchState, EncodedBatch, PrepareOutcome, WithdrawalContext,
};
use ledger_telemetry::{
    log_account_event, log_batch_event, log_event, metric_inc, AMOUNT_ADJUSTMENTS, DEPOSITS,
    LEDGER_ERRORS, SETTLEMENT_BATCHES, SOVEREIGN_WITHDRAWALS, WITHDRAWALS, WITHDRAWAL_BATCHES,
    WITHDRAWAL_FAILURES,
};
use shared_types::{
    format_address, format_hash, Address, AssetId, Delta, Hash, LedgerEvent, Payout, U256,
};

const SUBSYSTEM: &str = "ledger";

/// Result of a sovereign withdrawal call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SovereignOutcome {
    /// A request was stored; call again once the delay has passed.
    Requested(SovereignRequest),
    /// The matured request was paid out.
    Completed { asset: AssetId, amount: U256 },
}

/// Result of a processed withdrawal batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalBatchSummary {
    pub batch_hash: Hash,
    pub applied: u32,
    pub failed: u32,
}

/// The custody ledger.
pub struct LedgerService<C, T, S, R = EcdsaRecovery>
where
    C: Custody,
    T: TimeSource,
    S: EventSink,
    R: SignatureRecovery,
{
    state: LedgerState,
    config: LedgerConfig,
    domain: TypedDomain,
    authenticator: Authenticator<R>,
    custody: C,
    clock: T,
    sink: S,
}

impl<C, T, S> LedgerService<C, T, S, EcdsaRecovery>
where
    C: Custody,
    T: TimeSource,
    S: EventSink,
{
    /// Create a ledger that verifies secp256k1 signatures.
    pub fn new(
        config: LedgerConfig,
        roles: Roles,
        custody: C,
        clock: T,
        sink: S,
    ) -> Result<Self, LedgerError> {
        Self::with_recovery(config, roles, EcdsaRecovery::new(), custody, clock, sink)
    }
}

impl<C, T, S, R> LedgerService<C, T, S, R>
where
    C: Custody,
    T: TimeSource,
    S: EventSink,
    R: SignatureRecovery,
{
    pub fn with_recovery(
        config: LedgerConfig,
        roles: Roles,
        recovery: R,
        custody: C,
        clock: T,
        sink: S,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let domain = TypedDomain::new(
            &config.domain_name,
            &config.domain_version,
            config.chain_id,
            config.verifying_contract,
        );
        let state = LedgerState::new(roles, config.sovereign_delay_secs)?;

        log_event!(
            info,
            SUBSYSTEM,
            "ledger initialized",
            chain_id = config.chain_id,
            operator = %format_address(&roles.operator),
            sovereign_delay = config.sovereign_delay_secs,
            clamp = config.clamp_withdrawals
        );

        Ok(Self {
            state,
            config,
            domain,
            authenticator: Authenticator::new(recovery),
            custody,
            clock,
            sink,
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn balance(&self, account: &Address, asset: &AssetId) -> U256 {
        self.state.balances.balance(account, asset)
    }

    pub fn linked_signer(&self, account: &Address) -> Option<Address> {
        self.state.signers.delegate_of(account)
    }

    pub fn sovereign_request(&self, account: &Address) -> Option<SovereignRequest> {
        self.state.sovereign.pending(account)
    }

    pub fn settlement_state(&self) -> BatchState {
        self.state.settlement.state()
    }

    pub fn last_settlement_hash(&self) -> Option<Hash> {
        self.state.settlement.gate().last_settlement()
    }

    pub fn last_withdrawal_hash(&self) -> Option<Hash> {
        self.state.settlement.gate().last_withdrawal()
    }

    pub fn sovereign_delay(&self) -> u64 {
        self.state.sovereign.delay()
    }

    pub fn roles(&self) -> &Roles {
        &self.state.roles
    }

    /// Signing domain withdrawal and link digests are built in.
    pub fn domain(&self) -> &TypedDomain {
        &self.domain
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Where committed events go.
    pub fn events(&self) -> &S {
        &self.sink
    }

    // =========================================================================
    // DEPOSITS
    // =========================================================================

    /// Pull `amount` of `asset` from `caller` into custody and credit it.
    ///
    /// Not gated by a prepared settlement: a credit cannot invalidate one.
    pub fn deposit(
        &mut self,
        caller: Address,
        asset: AssetId,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.run("deposit", |ledger, events| {
            if amount.is_zero() {
                return Err(LedgerError::ZeroAmount);
            }

            let mut overlay = BalanceOverlay::new(&ledger.state.balances);
            adjust(&mut overlay, events, caller, asset, Delta::Credit(amount), false)?;
            let changes = overlay.into_changeset();

            ledger.custody.transfer_in(&caller, &asset, amount)?;
            ledger.state.balances.apply(&changes);

            events.push(LedgerEvent::Deposit {
                account: caller,
                asset,
                amount,
            });
            log_account_event!(
                info,
                SUBSYSTEM,
                "deposit credited",
                format_address(&caller),
                asset = %asset,
                amount = %amount
            );
            Ok(())
        })
    }

    // =========================================================================
    // LINKED SIGNERS
    // =========================================================================

    /// Make `signer` the delegate of `caller`.
    ///
    /// `signature` is the delegate's countersignature over
    /// `(caller, signer, nonce)`; `nonce` must exceed every earlier link nonce
    /// of `caller`.
    pub fn link_signer(
        &mut self,
        caller: Address,
        signer: Address,
        nonce: u64,
        signature: EcdsaSignature,
    ) -> Result<(), LedgerError> {
        self.run("link_signer", |ledger, events| {
            ledger.state.signers.check_link(&caller, &signer, nonce)?;
            let digest = ledger.domain.link_signer_digest(&caller, &signer, nonce);
            ledger
                .authenticator
                .verify_signer(&signer, &digest, &signature)?;

            let replaced = ledger.state.signers.link(caller, signer, nonce)?;
            if let Some(previous) = replaced.filter(|previous| *previous != signer) {
                events.push(LedgerEvent::LinkedSignerRemoved {
                    account: caller,
                    signer: previous,
                });
            }
            events.push(LedgerEvent::LinkedSignerSet {
                account: caller,
                signer,
                nonce,
            });
            log_account_event!(
                info,
                SUBSYSTEM,
                "linked signer set",
                format_address(&caller),
                signer = %format_address(&signer),
                nonce = nonce
            );
            Ok(())
        })
    }

    /// Remove the delegate of `caller`, if any.
    pub fn remove_linked_signer(&mut self, caller: Address) -> Result<Option<Address>, LedgerError> {
        self.run("remove_linked_signer", |ledger, events| {
            let removed = ledger.state.signers.unlink(&caller);
            if let Some(signer) = removed {
                events.push(LedgerEvent::LinkedSignerRemoved {
                    account: caller,
                    signer,
                });
                log_account_event!(info, SUBSYSTEM, "linked signer removed", format_address(&caller));
            }
            Ok(removed)
        })
    }

    // =========================================================================
    // SOVEREIGN WITHDRAWALS
    // =========================================================================

    /// Request, or once the delay has passed complete, a sovereign
    /// withdrawal of `amount` (0 for the whole balance) of `asset`.
    pub fn request_sovereign_withdrawal(
        &mut self,
        caller: Address,
        asset: AssetId,
        amount: U256,
    ) -> Result<SovereignOutcome, LedgerError> {
        self.run("request_sovereign_withdrawal", |ledger, events| {
            let now = ledger.clock.now();
            let balance = ledger.state.balances.balance(&caller, &asset);

            match ledger
                .state
                .sovereign
                .evaluate(&caller, asset, amount, balance, now)?
            {
                SovereignDecision::Record(request) => {
                    ledger.state.sovereign.record(caller, request);
                    events.push(LedgerEvent::SovereignWithdrawalRequested {
                        account: caller,
                        asset,
                        amount,
                        requested_at: now,
                    });
                    log_account_event!(
                        info,
                        SUBSYSTEM,
                        "sovereign withdrawal requested",
                        format_address(&caller),
                        asset = %asset,
                        amount = %amount,
                        ready_at = request.ready_at(ledger.state.sovereign.delay())
                    );
                    Ok(SovereignOutcome::Requested(request))
                }
                SovereignDecision::Complete(request) => {
                    ledger.complete_sovereign(caller, request, events)
                }
            }
        })
    }

    fn complete_sovereign(
        &mut self,
        account: Address,
        request: SovereignRequest,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<SovereignOutcome, LedgerError> {
        let asset = request.asset;
        let amount = resolve_amount(&self.state.balances, &account, &asset, request.amount);
        if amount.is_zero() {
            return Err(SovereignError::InsufficientBalance {
                requested: request.amount,
                available: U256::zero(),
            }
            .into());
        }

        let mut overlay = BalanceOverlay::new(&self.state.balances);
        adjust(&mut overlay, events, account, asset, Delta::Debit(amount), false)?;
        let changes = overlay.into_changeset();

        let undo = self.state.balances.apply(&changes);
        self.state.sovereign.take(&account);

        let payout = Payout {
            recipient: account,
            asset,
            amount,
        };
        if let Err(error) = self.custody.transfer_out(&[payout]) {
            self.state.balances.revert(undo);
            self.state.sovereign.restore(account, request);
            return Err(error.into());
        }

        events.push(LedgerEvent::SovereignWithdrawalCompleted {
            account,
            asset,
            amount,
        });
        log_account_event!(
            info,
            SUBSYSTEM,
            "sovereign withdrawal completed",
            format_address(&account),
            asset = %asset,
            amount = %amount
        );
        Ok(SovereignOutcome::Completed { asset, amount })
    }

    // =========================================================================
    // WITHDRAWAL BATCHES
    // =========================================================================

    /// Apply an operator withdrawal batch item by item.
    ///
    /// Refused while a settlement is prepared. Failing items are reported as
    /// `WithdrawalFailed` events; the rest are debited and paid out in one
    /// custody transfer.
    pub fn process_withdrawal_batch(
        &mut self,
        caller: Address,
        payload: &[u8],
    ) -> Result<WithdrawalBatchSummary, LedgerError> {
        self.run("process_withdrawal_batch", |ledger, events| {
            ledger.state.roles.require_operator(&caller)?;
            ledger.state.settlement.ensure_idle()?;
            let (batch_hash, batch) = EncodedBatch::decode(payload)?.into_withdrawals()?;
            let fee_account = ledger.state.roles.fee_account;

            let report = {
                let ctx = WithdrawalContext {
                    authenticator: &ledger.authenticator,
                    domain: &ledger.domain,
                    signers: &ledger.state.signers,
                    replay: &ledger.state.replay,
                    sovereign: &ledger.state.sovereign,
                    fee_account,
                    clamp: ledger.config.clamp_withdrawals,
                };
                process_withdrawals(&ledger.state.balances, &ctx, &batch, events)?
            };

            let undo = ledger.state.balances.apply(&report.changes);
            let mut completed = Vec::new();
            for account in report.sovereign_completions() {
                if let Some(request) = ledger.state.sovereign.take(account) {
                    completed.push((*account, request));
                }
            }
            let nonces: Vec<(Address, u64)> = report.consumed_nonces().collect();
            for (account, nonce) in &nonces {
                ledger.state.replay.consume(*account, *nonce);
            }

            let payouts = report.payouts();
            if !payouts.is_empty() {
                if let Err(error) = ledger.custody.transfer_out(&payouts) {
                    ledger.state.balances.revert(undo);
                    for (account, request) in completed {
                        ledger.state.sovereign.restore(account, request);
                    }
                    for (account, nonce) in &nonces {
                        ledger.state.replay.release(account, *nonce);
                    }
                    return Err(error.into());
                }
            }

            for withdrawal in &report.applied {
                if let Authorization::Sovereign(_) = withdrawal.authorization {
                    events.push(LedgerEvent::SovereignWithdrawalCompleted {
                        account: withdrawal.account,
                        asset: withdrawal.asset,
                        amount: withdrawal.debited,
                    });
                }
            }

            let applied = u32::try_from(report.applied.len()).unwrap_or(u32::MAX);
            let failed = report.failed;
            events.push(LedgerEvent::WithdrawalBatchProcessed {
                batch_hash,
                applied,
                failed,
            });

            ledger.state.settlement.record_withdrawal(batch_hash);
            ledger.state.last_withdrawals = Some(CommittedWithdrawals {
                batch_hash,
                fee_account,
                applied: report.applied,
            });

            log_batch_event!(
                info,
                SUBSYSTEM,
                "withdrawal batch processed",
                format_hash(&batch_hash),
                applied = applied,
                failed = failed
            );
            Ok(WithdrawalBatchSummary {
                batch_hash,
                applied,
                failed,
            })
        })
    }

    /// Reverse the most recent withdrawal batch, identified by its exact
    /// payload. Only available under [`WithdrawalRollbackPolicy::Compensate`].
    pub fn rollback_withdrawal_batch(
        &mut self,
        caller: Address,
        payload: &[u8],
    ) -> Result<Hash, LedgerError> {
        self.run("rollback_withdrawal_batch", |ledger, events| {
            ledger.state.roles.require_operator(&caller)?;
            if ledger.config.withdrawal_rollback == WithdrawalRollbackPolicy::Disabled {
                return Err(LedgerError::RollbackDisabled);
            }
            ledger.state.settlement.ensure_idle()?;
            let (batch_hash, _) = EncodedBatch::decode(payload)?.into_withdrawals()?;

            let committed = match &ledger.state.last_withdrawals {
                Some(committed) if committed.batch_hash == batch_hash => committed,
                _ => return Err(BatchError::NoWithdrawalBatch.into()),
            };

            let reverse = compensate(
                &ledger.state.balances,
                committed.fee_account,
                &committed.applied,
            )?;
            let payouts: Vec<Payout> = committed
                .applied
                .iter()
                .filter_map(AppliedWithdrawal::payout)
                .collect();

            let undo = ledger.state.balances.apply(&reverse);
            if let Err(error) = ledger.custody.reclaim(&payouts) {
                ledger.state.balances.revert(undo);
                return Err(error.into());
            }

            for withdrawal in &committed.applied {
                match withdrawal.authorization {
                    Authorization::Signed { nonce } => {
                        ledger.state.replay.release(&withdrawal.account, nonce);
                    }
                    Authorization::Sovereign(request) => {
                        if ledger.state.sovereign.pending(&withdrawal.account).is_none() {
                            ledger.state.sovereign.restore(withdrawal.account, request);
                        }
                    }
                }
            }

            ledger.state.last_withdrawals = None;
            ledger.state.settlement.clear_withdrawal();
            events.push(LedgerEvent::WithdrawalBatchRolledBack { batch_hash });
            log_batch_event!(
                warn,
                SUBSYSTEM,
                "withdrawal batch rolled back",
                format_hash(&batch_hash),
                items = payouts.len()
            );
            Ok(batch_hash)
        })
    }

    // =========================================================================
    // SETTLEMENT BATCHES
    // =========================================================================

    /// Phase one of a settlement batch.
    pub fn prepare_settlement_batch(
        &mut self,
        caller: Address,
        payload: &[u8],
    ) -> Result<PrepareOutcome, LedgerError> {
        self.run("prepare_settlement_batch", |ledger, events| {
            ledger.state.roles.require_operator(&caller)?;
            ledger.state.settlement.ensure_idle()?;
            let (batch_hash, batch) = EncodedBatch::decode(payload)?.into_settlement()?;
            let fee_account = ledger.state.roles.fee_account;

            let outcome = ledger.state.settlement.prepare(
                &ledger.state.balances,
                fee_account,
                batch_hash,
                &batch,
                events,
            )?;
            if let PrepareOutcome::Failed { .. } = outcome {
                metric_inc!(SETTLEMENT_BATCHES, &["failed"]);
            }
            Ok(outcome)
        })
    }

    /// Phase two: apply the prepared batch. `payload` must be byte-identical
    /// to the prepared one.
    pub fn submit_settlement_batch(
        &mut self,
        caller: Address,
        payload: &[u8],
    ) -> Result<Hash, LedgerError> {
        self.run("submit_settlement_batch", |ledger, events| {
            ledger.state.roles.require_operator(&caller)?;
            ledger
                .state
                .settlement
                .gate()
                .expect_pending(&payload_hash(payload))?;
            let (batch_hash, batch) = EncodedBatch::decode(payload)?.into_settlement()?;
            let fee_account = ledger.state.roles.fee_account;

            ledger.state.settlement.submit(
                &mut ledger.state.balances,
                fee_account,
                batch_hash,
                &batch,
                events,
            )?;
            Ok(batch_hash)
        })
    }

    /// Discard the prepared settlement batch.
    pub fn rollback_settlement_batch(&mut self, caller: Address) -> Result<Hash, LedgerError> {
        self.run("rollback_settlement_batch", |ledger, events| {
            ledger.state.roles.require_operator(&caller)?;
            Ok(ledger.state.settlement.rollback(events)?)
        })
    }

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    pub fn set_operator(&mut self, caller: Address, operator: Address) -> Result<(), LedgerError> {
        self.run("set_operator", |ledger, events| {
            ledger.state.roles.require_owner(&caller)?;
            let current = non_zero("operator", operator)?;
            let previous = std::mem::replace(&mut ledger.state.roles.operator, current);
            events.push(LedgerEvent::OperatorChanged { previous, current });
            Ok(())
        })
    }

    pub fn set_owner(&mut self, caller: Address, owner: Address) -> Result<(), LedgerError> {
        self.run("set_owner", |ledger, events| {
            ledger.state.roles.require_owner(&caller)?;
            let current = non_zero("owner", owner)?;
            let previous = std::mem::replace(&mut ledger.state.roles.owner, current);
            events.push(LedgerEvent::OwnerChanged { previous, current });
            Ok(())
        })
    }

    /// Change the fee account. Refused while a settlement is prepared, since
    /// the prepared batch credits its fees to the current account.
    pub fn set_fee_account(&mut self, caller: Address, fee_account: Address) -> Result<(), LedgerError> {
        self.run("set_fee_account", |ledger, events| {
            ledger.state.roles.require_owner(&caller)?;
            let current = non_zero("fee account", fee_account)?;
            ledger.state.settlement.ensure_idle()?;
            let previous = std::mem::replace(&mut ledger.state.roles.fee_account, current);
            events.push(LedgerEvent::FeeAccountChanged { previous, current });
            Ok(())
        })
    }

    pub fn set_sovereign_delay(&mut self, caller: Address, delay: u64) -> Result<(), LedgerError> {
        self.run("set_sovereign_delay", |ledger, events| {
            ledger.state.roles.require_owner(&caller)?;
            let previous = ledger.state.sovereign.set_delay(delay)?;
            events.push(LedgerEvent::SovereignDelayChanged {
                previous,
                current: delay,
            });
            Ok(())
        })
    }

    // =========================================================================
    // CALL BOUNDARY
    // =========================================================================

    /// Run one call: publish its events if it commits, drop them if it fails.
    fn run<V>(
        &mut self,
        operation: &'static str,
        call: impl FnOnce(&mut Self, &mut Vec<LedgerEvent>) -> Result<V, LedgerError>,
    ) -> Result<V, LedgerError> {
        let mut events = Vec::new();
        match call(self, &mut events) {
            Ok(value) => {
                self.publish(&events);
                Ok(value)
            }
            Err(error) => {
                metric_inc!(LEDGER_ERRORS, &[error.reason()]);
                log_event!(
                    warn,
                    SUBSYSTEM,
                    "call rejected",
                    operation = operation,
                    error = %error
                );
                Err(error)
            }
        }
    }

    fn publish(&self, events: &[LedgerEvent]) {
        if events.is_empty() {
            return;
        }
        events.iter().for_each(record_metrics);
        self.sink.publish(events);
    }
}

fn record_metrics(event: &LedgerEvent) {
    match event {
        LedgerEvent::Deposit { .. } => metric_inc!(DEPOSITS),
        LedgerEvent::AmountAdjusted { .. } => metric_inc!(AMOUNT_ADJUSTMENTS),
        LedgerEvent::Withdrawal { .. } => metric_inc!(WITHDRAWALS, &["applied"]),
        LedgerEvent::WithdrawalFailed { error, .. } => {
            metric_inc!(WITHDRAWALS, &["failed"]);
            metric_inc!(WITHDRAWAL_FAILURES, &[error.as_str()]);
        }
        LedgerEvent::WithdrawalBatchProcessed { .. } => {
            metric_inc!(WITHDRAWAL_BATCHES, &["processed"])
        }
        LedgerEvent::WithdrawalBatchRolledBack { .. } => {
            metric_inc!(WITHDRAWAL_BATCHES, &["rolled_back"])
        }
        LedgerEvent::SovereignWithdrawalRequested { .. } => {
            metric_inc!(SOVEREIGN_WITHDRAWALS, &["requested"])
        }
        LedgerEvent::SovereignWithdrawalCompleted { .. } => {
            metric_inc!(SOVEREIGN_WITHDRAWALS, &["completed"])
        }
        LedgerEvent::SettlementPrepared { .. } => metric_inc!(SETTLEMENT_BATCHES, &["prepared"]),
        LedgerEvent::SettlementSubmitted { .. } => metric_inc!(SETTLEMENT_BATCHES, &["submitted"]),
        LedgerEvent::SettlementRolledBack { .. } => {
            metric_inc!(SETTLEMENT_BATCHES, &["rolled_back"])
        }
        _ => {}
    }
}
