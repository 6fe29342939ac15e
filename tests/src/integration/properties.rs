//! # Ledger Properties
//!
//! Randomized checks of the two accounting invariants: funds are conserved
//! across deposits and withdrawals, and a settlement that does not net to
//! zero never touches a balance.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use cl_04_batch_settlement::{AssetAdjustments, BatchError, BatchState, SettlementBatch};
    use ledger_runtime::{LedgerConfig, LedgerError};
    use proptest::prelude::*;
    use shared_types::{Address, U256};

    const LEFT: Address = [0x1E; 20];
    const RIGHT: Address = [0x21; 20];

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_unbalanced_settlement_changes_nothing(
            credit in 1u64..1_000_000,
            fee in 0u64..1_000,
            skew in 1u64..1_000,
            over in any::<bool>(),
        ) {
            let mut env = Env::new();
            env.deposit(LEFT, USDC, usdc(10_000_000));
            env.deposit(RIGHT, USDC, usdc(10_000_000));

            let balanced = credit + fee;
            let debit = if over { balanced + skew } else { balanced.saturating_sub(skew) };
            prop_assume!(debit != balanced);

            let batch = SettlementBatch {
                wallets: vec![LEFT, RIGHT],
                trade_hashes: vec![vec![[0x42; 32]], vec![[0x42; 32]]],
                adjustments: vec![AssetAdjustments {
                    asset: USDC,
                    increments: vec![adj(0, U256::from(credit))],
                    decrements: vec![adj(1, U256::from(debit))],
                    fee: U256::from(fee),
                }],
            };
            let before = env.snapshot(&[LEFT, RIGHT, FEE_ACCOUNT], &[USDC]);
            let events_before = env.log.len();

            let result = env
                .ledger
                .prepare_settlement_batch(OPERATOR, &settlement_payload(&batch));

            prop_assert!(
                matches!(result, Err(LedgerError::Batch(BatchError::NetNonZero { .. }))),
                "unexpected {:?}",
                result
            );
            prop_assert_eq!(env.snapshot(&[LEFT, RIGHT, FEE_ACCOUNT], &[USDC]), before);
            prop_assert_eq!(env.log.len(), events_before);
            prop_assert_eq!(env.ledger.settlement_state(), BatchState::Idle);
        }

        #[test]
        fn prop_withdrawals_conserve_funds(
            requests in proptest::collection::vec((1u64..1_000, 0u64..1_500, 0u64..50), 1..6),
            clamp in any::<bool>(),
        ) {
            let mut env = Env::with_config(LedgerConfig {
                clamp_withdrawals: clamp,
                ..test_config()
            });
            let domain = *env.ledger.domain();
            let traders: Vec<Trader> = requests.iter().map(|_| Trader::new()).collect();

            let mut deposited = U256::zero();
            let mut items = Vec::new();
            for (nonce, (trader, (deposit, amount, fee))) in
                traders.iter().zip(&requests).enumerate()
            {
                env.deposit(trader.address, USDC, U256::from(*deposit));
                deposited += U256::from(*deposit);
                items.push(trader.withdrawal(
                    &domain,
                    USDC,
                    U256::from(*amount),
                    nonce as u64 + 1,
                    U256::from(*fee),
                ));
            }

            let summary = env
                .ledger
                .process_withdrawal_batch(OPERATOR, &withdrawal_payload(items))
                .expect("batch");
            prop_assert_eq!(
                (summary.applied + summary.failed) as usize,
                requests.len()
            );

            let held: U256 = traders
                .iter()
                .map(|t| env.balance(&t.address, &USDC))
                .fold(env.balance(&FEE_ACCOUNT, &USDC), |sum, b| sum + b);
            let paid: U256 = traders
                .iter()
                .map(|t| env.custody.inner.wallet(&t.address, &USDC))
                .fold(U256::zero(), |sum, b| sum + b);

            prop_assert_eq!(held + paid, deposited);
            prop_assert_eq!(env.custody.inner.vault(&USDC), held);
        }
    }
}
