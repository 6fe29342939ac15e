//! # Withdrawal Batch Scenarios
//!
//! Operator batches with signed and sovereign items, clamping, custody
//! failure and policy-gated compensation.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_04_batch_settlement::{payload_hash, BatchError};
    use ledger_runtime::{LedgerConfig, LedgerError, WithdrawalBatchSummary, WithdrawalRollbackPolicy};
    use shared_types::{ErrorCode, LedgerEvent, U256};

    fn strict_config() -> LedgerConfig {
        LedgerConfig {
            clamp_withdrawals: false,
            ..test_config()
        }
    }

    fn compensating_config() -> LedgerConfig {
        LedgerConfig {
            withdrawal_rollback: WithdrawalRollbackPolicy::Compensate,
            ..test_config()
        }
    }

    fn failure_codes(env: &Env) -> Vec<(u64, ErrorCode)> {
        env.events_of("withdrawal_failed")
            .into_iter()
            .filter_map(|event| match event {
                LedgerEvent::WithdrawalFailed { sequence, error, .. } => Some((sequence, error)),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // ITEM OUTCOMES
    // =========================================================================

    #[test]
    fn test_mixed_batch_reports_each_failure() {
        let mut env = Env::with_config(strict_config());
        let alice = Trader::new();
        let bob = Trader::new();
        env.deposit(alice.address, USDC, usdc(100));
        env.deposit(bob.address, USDC, usdc(50));
        let domain = *env.ledger.domain();

        let mut items = vec![
            alice.withdrawal(&domain, USDC, usdc(40), 1, usdc(1)),
            alice.withdrawal(&domain, USDC, usdc(10), 1, U256::zero()),
            bob.withdrawal(&domain, USDC, usdc(80), 1, U256::zero()),
            alice.withdrawal_for(bob.address, &domain, USDC, usdc(5), 2, U256::zero()),
            bob.withdrawal(&domain, USDC, usdc(10), 3, usdc(20)),
            bob.withdrawal(&domain, USDC, U256::zero(), 4, U256::zero()),
        ];
        for (sequence, item) in items.iter_mut().enumerate() {
            item.sequence = sequence as u64;
        }
        let payload = withdrawal_payload(items);

        let summary = env
            .ledger
            .process_withdrawal_batch(OPERATOR, &payload)
            .expect("batch");
        assert_eq!(
            summary,
            WithdrawalBatchSummary {
                batch_hash: payload_hash(&payload),
                applied: 2,
                failed: 4
            }
        );
        assert_eq!(
            failure_codes(&env),
            vec![
                (1, ErrorCode::NonceReused),
                (2, ErrorCode::InsufficientBalance),
                (3, ErrorCode::InvalidSignature),
                (4, ErrorCode::FeeExceedsAmount),
            ]
        );

        assert_eq!(env.balance(&alice.address, &USDC), usdc(60));
        assert_eq!(env.balance(&bob.address, &USDC), U256::zero());
        assert_eq!(env.balance(&FEE_ACCOUNT, &USDC), usdc(1));
        assert_eq!(env.custody.inner.wallet(&alice.address, &USDC), usdc(39));
        assert_eq!(env.custody.inner.wallet(&bob.address, &USDC), usdc(50));
        assert_eq!(env.ledger.last_withdrawal_hash(), Some(payload_hash(&payload)));
    }

    #[test]
    fn test_failed_item_reports_balance_it_saw() {
        let mut env = Env::with_config(strict_config());
        let alice = Trader::new();
        env.deposit(alice.address, USDC, usdc(100));
        let domain = *env.ledger.domain();

        let payload = withdrawal_payload(vec![
            alice.withdrawal(&domain, USDC, usdc(70), 1, U256::zero()),
            alice.withdrawal(&domain, USDC, usdc(70), 2, U256::zero()),
        ]);
        env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();

        match &env.events_of("withdrawal_failed")[..] {
            [LedgerEvent::WithdrawalFailed {
                requested,
                balance,
                error,
                ..
            }] => {
                assert_eq!(*requested, usdc(70));
                assert_eq!(*balance, usdc(30));
                assert_eq!(*error, ErrorCode::InsufficientBalance);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_clamped_withdrawal_drains_balance() {
        let mut env = Env::new();
        let alice = Trader::new();
        env.deposit(alice.address, USDC, usdc(30));
        let domain = *env.ledger.domain();

        let payload = withdrawal_payload(vec![alice.withdrawal(&domain, USDC, usdc(50), 1, usdc(2))]);
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!((summary.applied, summary.failed), (1, 0));

        assert_eq!(
            env.events_of("amount_adjusted"),
            vec![LedgerEvent::AmountAdjusted {
                account: alice.address,
                asset: USDC,
                requested: usdc(50),
                actual: usdc(30),
            }]
        );
        match &env.events_of("withdrawal")[..] {
            [LedgerEvent::Withdrawal { amount, fee, .. }] => {
                assert_eq!(*amount, usdc(30));
                assert_eq!(*fee, usdc(2));
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert_eq!(env.balance(&alice.address, &USDC), U256::zero());
        assert_eq!(env.balance(&FEE_ACCOUNT, &USDC), usdc(2));
        assert_eq!(env.custody.inner.wallet(&alice.address, &USDC), usdc(28));
    }

    #[test]
    fn test_clamp_below_fee_fails_without_adjustment_event() {
        let mut env = Env::new();
        let alice = Trader::new();
        env.deposit(alice.address, USDC, usdc(30));
        let domain = *env.ledger.domain();

        let payload = withdrawal_payload(vec![alice.withdrawal(&domain, USDC, usdc(50), 1, usdc(40))]);
        env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();

        assert_eq!(failure_codes(&env), vec![(1, ErrorCode::FeeExceedsAmount)]);
        assert!(env.events_of("amount_adjusted").is_empty());
        assert_eq!(env.balance(&alice.address, &USDC), usdc(30));
    }

    #[test]
    fn test_clamp_against_empty_balance_keeps_nonce() {
        let mut env = Env::new();
        let alice = Trader::new();
        env.deposit(alice.address, BTC, btc(1));
        let domain = *env.ledger.domain();

        let payload = withdrawal_payload(vec![alice.withdrawal(&domain, USDC, usdc(5), 1, U256::zero())]);
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();

        assert_eq!((summary.applied, summary.failed), (0, 1));
        assert_eq!(failure_codes(&env), vec![(1, ErrorCode::InsufficientBalance)]);
        assert!(env.events_of("withdrawal").is_empty());
        assert!(env.events_of("amount_adjusted").is_empty());

        // Once funded, the same signed item still goes through.
        env.deposit(alice.address, USDC, usdc(10));
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!(summary.applied, 1);
        assert_eq!(env.custody.inner.wallet(&alice.address, &USDC), usdc(5));
    }

    #[test]
    fn test_signature_binds_every_field() {
        let mut env = Env::with_config(strict_config());
        let alice = Trader::new();
        env.deposit(alice.address, USDC, usdc(100));
        env.deposit(alice.address, BTC, btc(1));
        let domain = *env.ledger.domain();
        let signed = alice.withdrawal(&domain, USDC, usdc(10), 1, U256::zero());

        let mut amount = signed.clone();
        amount.amount = usdc(11);
        let mut asset = signed.clone();
        asset.asset = BTC;
        let mut nonce = signed.clone();
        nonce.nonce = 2;

        let payload = withdrawal_payload(vec![amount, asset, nonce]);
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!((summary.applied, summary.failed), (0, 3));
        assert!(failure_codes(&env)
            .iter()
            .all(|(_, code)| *code == ErrorCode::InvalidSignature));

        // The untouched item still goes through.
        let payload = withdrawal_payload(vec![signed]);
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!(summary.applied, 1);
        assert_eq!(env.balance(&alice.address, &USDC), usdc(90));
    }

    #[test]
    fn test_replay_across_batches() {
        let mut env = Env::new();
        let alice = Trader::new();
        env.deposit(alice.address, USDC, usdc(100));
        let domain = *env.ledger.domain();
        let item = alice.withdrawal(&domain, USDC, usdc(10), 7, U256::zero());

        env.ledger
            .process_withdrawal_batch(OPERATOR, &withdrawal_payload(vec![item.clone()]))
            .unwrap();
        let mut replay = item;
        replay.sequence = 8;
        let summary = env
            .ledger
            .process_withdrawal_batch(OPERATOR, &withdrawal_payload(vec![replay]))
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(failure_codes(&env), vec![(8, ErrorCode::NonceReused)]);
        assert_eq!(env.balance(&alice.address, &USDC), usdc(90));
    }

    // =========================================================================
    // SOVEREIGN ITEMS
    // =========================================================================

    #[test]
    fn test_null_signature_completes_sovereign_request() {
        let mut env = Env::new();
        let bob = Trader::new();
        env.deposit(bob.address, USDC, usdc(50));
        env.ledger
            .request_sovereign_withdrawal(bob.address, USDC, usdc(20))
            .unwrap();

        // A null signature with no matching request is rejected.
        let payload = withdrawal_payload(vec![
            sovereign_item(bob.address, USDC, usdc(21), 1),
            sovereign_item(bob.address, USDC, usdc(20), 2),
            sovereign_item(bob.address, USDC, usdc(20), 3),
        ]);
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();

        assert_eq!((summary.applied, summary.failed), (1, 2));
        assert_eq!(
            failure_codes(&env),
            vec![(1, ErrorCode::InvalidSignature), (3, ErrorCode::InvalidSignature)]
        );
        assert_eq!(env.balance(&bob.address, &USDC), usdc(30));
        assert!(env.ledger.sovereign_request(&bob.address).is_none());
        assert_eq!(
            env.events_of("sovereign_withdrawal_completed"),
            vec![LedgerEvent::SovereignWithdrawalCompleted {
                account: bob.address,
                asset: USDC,
                amount: usdc(20),
            }]
        );
    }

    #[test]
    fn test_sovereign_item_cannot_carry_fee() {
        let mut env = Env::new();
        let bob = Trader::new();
        env.deposit(bob.address, USDC, usdc(50));
        env.ledger
            .request_sovereign_withdrawal(bob.address, USDC, usdc(20))
            .unwrap();

        let mut item = sovereign_item(bob.address, USDC, usdc(20), 1);
        item.fee = usdc(20);
        let summary = env
            .ledger
            .process_withdrawal_batch(OPERATOR, &withdrawal_payload(vec![item]))
            .unwrap();

        assert_eq!((summary.applied, summary.failed), (0, 1));
        assert_eq!(failure_codes(&env), vec![(1, ErrorCode::InvalidSignature)]);
        assert_eq!(env.balance(&FEE_ACCOUNT, &USDC), U256::zero());
        assert_eq!(env.balance(&bob.address, &USDC), usdc(50));
        assert_eq!(env.custody.inner.wallet(&bob.address, &USDC), U256::zero());
        assert!(env.ledger.sovereign_request(&bob.address).is_some());

        // The fee-free form completes the request in full.
        let payload = withdrawal_payload(vec![sovereign_item(bob.address, USDC, usdc(20), 2)]);
        env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!(env.custody.inner.wallet(&bob.address, &USDC), usdc(20));
        assert!(env.ledger.sovereign_request(&bob.address).is_none());
    }

    // =========================================================================
    // CUSTODY FAILURE
    // =========================================================================

    #[test]
    fn test_custody_failure_reverts_whole_batch() {
        let mut env = Env::new();
        let alice = Trader::new();
        let bob = Trader::new();
        env.deposit(alice.address, USDC, usdc(100));
        env.deposit(bob.address, USDC, usdc(50));
        env.ledger
            .request_sovereign_withdrawal(bob.address, USDC, usdc(20))
            .unwrap();
        let domain = *env.ledger.domain();
        let events_before = env.log.len();

        let payload = withdrawal_payload(vec![
            alice.withdrawal(&domain, USDC, usdc(40), 1, usdc(1)),
            sovereign_item(bob.address, USDC, usdc(20), 2),
        ]);

        env.custody.fail_transfers_out(true);
        let err = env
            .ledger
            .process_withdrawal_batch(OPERATOR, &payload)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Custody(_)));

        assert_eq!(env.balance(&alice.address, &USDC), usdc(100));
        assert_eq!(env.balance(&bob.address, &USDC), usdc(50));
        assert_eq!(env.balance(&FEE_ACCOUNT, &USDC), U256::zero());
        assert!(env.ledger.sovereign_request(&bob.address).is_some());
        assert_eq!(env.log.len(), events_before);
        assert_eq!(env.ledger.last_withdrawal_hash(), None);

        env.custody.fail_transfers_out(false);
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!((summary.applied, summary.failed), (2, 0));
        assert_eq!(env.balance(&alice.address, &USDC), usdc(60));
        assert_eq!(env.balance(&bob.address, &USDC), usdc(30));
    }

    #[test]
    fn test_batch_requires_operator_and_items() {
        let mut env = Env::new();
        let alice = Trader::new();
        let domain = *env.ledger.domain();
        let payload = withdrawal_payload(vec![alice.withdrawal(&domain, USDC, usdc(1), 1, U256::zero())]);

        assert!(matches!(
            env.ledger.process_withdrawal_batch(alice.address, &payload),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert_eq!(
            env.ledger
                .process_withdrawal_batch(OPERATOR, &withdrawal_payload(Vec::new())),
            Err(LedgerError::Batch(BatchError::EmptyBatch))
        );
    }

    // =========================================================================
    // COMPENSATION
    // =========================================================================

    #[test]
    fn test_rollback_disabled_by_default() {
        let mut env = Env::new();
        let alice = Trader::new();
        env.deposit(alice.address, USDC, usdc(10));
        let domain = *env.ledger.domain();
        let payload = withdrawal_payload(vec![alice.withdrawal(&domain, USDC, usdc(5), 1, U256::zero())]);
        env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();

        assert_eq!(
            env.ledger.rollback_withdrawal_batch(OPERATOR, &payload),
            Err(LedgerError::RollbackDisabled)
        );
        assert_eq!(env.balance(&alice.address, &USDC), usdc(5));
    }

    #[test]
    fn test_compensating_rollback_restores_everything() {
        let mut env = Env::with_config(compensating_config());
        let alice = Trader::new();
        let bob = Trader::new();
        env.deposit(alice.address, USDC, usdc(100));
        env.deposit(bob.address, USDC, usdc(50));
        env.ledger
            .request_sovereign_withdrawal(bob.address, USDC, usdc(20))
            .unwrap();
        let domain = *env.ledger.domain();
        let payload = withdrawal_payload(vec![
            alice.withdrawal(&domain, USDC, usdc(40), 1, usdc(2)),
            sovereign_item(bob.address, USDC, usdc(20), 2),
        ]);
        let hash = payload_hash(&payload);

        env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!(env.custody.inner.wallet(&alice.address, &USDC), usdc(38));

        let other = withdrawal_payload(vec![alice.withdrawal(&domain, USDC, usdc(1), 9, U256::zero())]);
        assert_eq!(
            env.ledger.rollback_withdrawal_batch(OPERATOR, &other),
            Err(LedgerError::Batch(BatchError::NoWithdrawalBatch))
        );

        assert_eq!(env.ledger.rollback_withdrawal_batch(OPERATOR, &payload), Ok(hash));
        assert_eq!(env.balance(&alice.address, &USDC), usdc(100));
        assert_eq!(env.balance(&bob.address, &USDC), usdc(50));
        assert_eq!(env.balance(&FEE_ACCOUNT, &USDC), U256::zero());
        assert_eq!(env.custody.inner.wallet(&alice.address, &USDC), U256::zero());
        assert_eq!(env.custody.inner.wallet(&bob.address, &USDC), U256::zero());
        assert_eq!(env.custody.inner.vault(&USDC), usdc(150));
        assert!(env.ledger.sovereign_request(&bob.address).is_some());
        assert_eq!(env.ledger.last_withdrawal_hash(), None);
        assert_eq!(
            env.events_of("withdrawal_batch_rolled_back"),
            vec![LedgerEvent::WithdrawalBatchRolledBack { batch_hash: hash }]
        );

        assert_eq!(
            env.ledger.rollback_withdrawal_batch(OPERATOR, &payload),
            Err(LedgerError::Batch(BatchError::NoWithdrawalBatch))
        );

        // Released nonce and restored request make the batch valid again.
        let summary = env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!((summary.applied, summary.failed), (2, 0));
        assert_eq!(env.balance(&alice.address, &USDC), usdc(60));
    }
}
