//! # Sovereign Withdrawal Scenarios
//!
//! Two-call, time-locked withdrawals that bypass the operator.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_03_sovereign_withdrawal::{SovereignError, SovereignRequest, MIN_SOVEREIGN_DELAY};
    use ledger_runtime::{LedgerError, SovereignOutcome};
    use shared_types::{Address, LedgerEvent, U256};

    const ALICE: Address = [0xA1; 20];

    fn request(env: &mut Env, amount: U256) -> Result<SovereignOutcome, LedgerError> {
        env.ledger.request_sovereign_withdrawal(ALICE, USDC, amount)
    }

    #[test]
    fn test_request_then_complete_after_delay() {
        let mut env = Env::new();
        env.deposit(ALICE, USDC, usdc(3));
        let delay = env.ledger.sovereign_delay();

        assert_eq!(
            request(&mut env, usdc(2)),
            Ok(SovereignOutcome::Requested(SovereignRequest {
                asset: USDC,
                amount: usdc(2),
                requested_at: T0,
            }))
        );
        assert_eq!(env.balance(&ALICE, &USDC), usdc(3));

        env.clock.set(T0 + delay - 1);
        assert_eq!(
            request(&mut env, usdc(2)),
            Err(LedgerError::Sovereign(SovereignError::DelayNotMet {
                ready_at: T0 + delay,
                now: T0 + delay - 1,
            }))
        );

        env.clock.set(T0 + delay);
        assert_eq!(
            request(&mut env, usdc(2)),
            Ok(SovereignOutcome::Completed {
                asset: USDC,
                amount: usdc(2)
            })
        );
        assert_eq!(env.balance(&ALICE, &USDC), usdc(1));
        assert_eq!(env.custody.inner.wallet(&ALICE, &USDC), usdc(2));
        assert!(env.ledger.sovereign_request(&ALICE).is_none());
        assert_eq!(
            env.events_of("sovereign_withdrawal_completed"),
            vec![LedgerEvent::SovereignWithdrawalCompleted {
                account: ALICE,
                asset: USDC,
                amount: usdc(2),
            }]
        );
    }

    #[test]
    fn test_pending_request_blocks_other_calls_until_delay() {
        let mut env = Env::new();
        env.deposit(ALICE, USDC, usdc(3));
        request(&mut env, usdc(2)).unwrap();

        env.clock.advance(60);
        assert!(matches!(
            request(&mut env, usdc(1)),
            Err(LedgerError::Sovereign(SovereignError::DelayNotMet { .. }))
        ));
        assert_eq!(
            env.ledger.sovereign_request(&ALICE).map(|r| r.amount),
            Some(usdc(2))
        );
    }

    #[test]
    fn test_mismatch_after_delay_reinitiates() {
        let mut env = Env::new();
        env.deposit(ALICE, USDC, usdc(3));
        request(&mut env, usdc(2)).unwrap();

        env.clock.advance(MIN_SOVEREIGN_DELAY);
        let now = T0 + MIN_SOVEREIGN_DELAY;
        assert_eq!(
            request(&mut env, usdc(1)),
            Ok(SovereignOutcome::Requested(SovereignRequest {
                asset: USDC,
                amount: usdc(1),
                requested_at: now,
            }))
        );
        assert_eq!(env.balance(&ALICE, &USDC), usdc(3));
        assert_eq!(env.events_of("sovereign_withdrawal_requested").len(), 2);

        // The new request restarts the clock.
        assert!(matches!(
            request(&mut env, usdc(1)),
            Err(LedgerError::Sovereign(SovereignError::DelayNotMet { .. }))
        ));
    }

    #[test]
    fn test_request_larger_than_balance() {
        let mut env = Env::new();
        env.deposit(ALICE, USDC, usdc(3));

        assert_eq!(
            request(&mut env, usdc(5)),
            Err(LedgerError::Sovereign(SovereignError::InsufficientBalance {
                requested: usdc(5),
                available: usdc(3),
            }))
        );
        assert!(env.ledger.sovereign_request(&ALICE).is_none());
    }

    #[test]
    fn test_withdraw_all_resolves_at_completion() {
        let mut env = Env::new();
        env.deposit(ALICE, USDC, usdc(3));
        request(&mut env, U256::zero()).unwrap();

        env.deposit(ALICE, USDC, usdc(4));
        env.clock.advance(MIN_SOVEREIGN_DELAY);

        assert_eq!(
            request(&mut env, U256::zero()),
            Ok(SovereignOutcome::Completed {
                asset: USDC,
                amount: usdc(7)
            })
        );
        assert_eq!(env.balance(&ALICE, &USDC), U256::zero());
    }

    #[test]
    fn test_completion_of_drained_balance_fails() {
        let mut env = Env::new();
        let trader = Trader::new();
        env.deposit(trader.address, USDC, usdc(3));
        env.ledger
            .request_sovereign_withdrawal(trader.address, USDC, U256::zero())
            .unwrap();

        let domain = *env.ledger.domain();
        let payload = withdrawal_payload(vec![trader.withdrawal(&domain, USDC, U256::zero(), 1, U256::zero())]);
        env.ledger.process_withdrawal_batch(OPERATOR, &payload).unwrap();
        assert_eq!(env.balance(&trader.address, &USDC), U256::zero());

        env.clock.advance(MIN_SOVEREIGN_DELAY);
        assert!(matches!(
            env.ledger
                .request_sovereign_withdrawal(trader.address, USDC, U256::zero()),
            Err(LedgerError::Sovereign(SovereignError::InsufficientBalance { .. }))
        ));
        assert!(env.ledger.sovereign_request(&trader.address).is_some());
    }

    #[test]
    fn test_custody_failure_keeps_request() {
        let mut env = Env::new();
        env.deposit(ALICE, USDC, usdc(3));
        request(&mut env, usdc(2)).unwrap();
        env.clock.advance(MIN_SOVEREIGN_DELAY);

        env.custody.fail_transfers_out(true);
        assert!(matches!(
            request(&mut env, usdc(2)),
            Err(LedgerError::Custody(_))
        ));
        assert_eq!(env.balance(&ALICE, &USDC), usdc(3));
        assert!(env.ledger.sovereign_request(&ALICE).is_some());
        assert!(env.events_of("sovereign_withdrawal_completed").is_empty());

        env.custody.fail_transfers_out(false);
        assert!(matches!(
            request(&mut env, usdc(2)),
            Ok(SovereignOutcome::Completed { .. })
        ));
    }

    // =========================================================================
    // DELAY POLICY
    // =========================================================================

    #[test]
    fn test_delay_change_applies_to_pending_requests() {
        let mut env = Env::new();
        env.deposit(ALICE, USDC, usdc(3));
        request(&mut env, usdc(2)).unwrap();

        let longer = 2 * MIN_SOVEREIGN_DELAY;
        env.ledger.set_sovereign_delay(OWNER, longer).unwrap();
        assert_eq!(
            env.events_of("sovereign_delay_changed"),
            vec![LedgerEvent::SovereignDelayChanged {
                previous: MIN_SOVEREIGN_DELAY,
                current: longer,
            }]
        );

        env.clock.advance(MIN_SOVEREIGN_DELAY);
        assert!(matches!(
            request(&mut env, usdc(2)),
            Err(LedgerError::Sovereign(SovereignError::DelayNotMet { .. }))
        ));
        env.clock.advance(MIN_SOVEREIGN_DELAY);
        assert!(matches!(
            request(&mut env, usdc(2)),
            Ok(SovereignOutcome::Completed { .. })
        ));
    }

    #[test]
    fn test_delay_floor_and_ownership() {
        let mut env = Env::new();

        assert_eq!(
            env.ledger.set_sovereign_delay(OWNER, MIN_SOVEREIGN_DELAY - 1),
            Err(LedgerError::Sovereign(SovereignError::DelayBelowMinimum {
                requested: MIN_SOVEREIGN_DELAY - 1,
                minimum: MIN_SOVEREIGN_DELAY,
            }))
        );
        assert!(matches!(
            env.ledger.set_sovereign_delay(OPERATOR, 3 * MIN_SOVEREIGN_DELAY),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert_eq!(env.ledger.sovereign_delay(), MIN_SOVEREIGN_DELAY);
    }
}
