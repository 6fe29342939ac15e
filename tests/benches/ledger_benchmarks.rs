//! # Custody Ledger Benchmarks
//!
//! | Path | Work per iteration |
//! |------|--------------------|
//! | Settlement | decode, net, dry run, strict run and apply of one batch |
//! | Withdrawals | decode, signature recovery and debit of every item |
//! | Codec | canonical decode of a settlement payload |

#![allow(clippy::excessive_nesting)]

use cl_04_batch_settlement::{
    AssetAdjustments, EncodedBatch, SettlementBatch, WalletAdjustment,
};
use cl_tests::fixtures::{settlement_payload, withdrawal_payload, Env, Trader, OPERATOR, USDC};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{Address, U256};
use std::time::Duration;

const SIZES: [usize; 3] = [10, 50, 200];

fn wallet(index: usize) -> Address {
    let mut address = [0x10; 20];
    address[..8].copy_from_slice(&(index as u64 + 1).to_be_bytes());
    address
}

/// Pairs of wallets trading random USDC amounts; the second of each pair
/// pays a fee on top.
fn random_settlement(pairs: usize) -> (SettlementBatch, Vec<(Address, U256)>) {
    let mut rng = rand::thread_rng();
    let mut increments = Vec::with_capacity(pairs);
    let mut decrements = Vec::with_capacity(pairs);
    let mut funding = Vec::with_capacity(pairs);
    let mut fee = U256::zero();

    for pair in 0..pairs {
        let amount = U256::from(rng.gen_range(1_000u64..1_000_000));
        let pair_fee = U256::from(rng.gen_range(0u64..100));
        let (buyer, seller) = (2 * pair, 2 * pair + 1);

        increments.push(WalletAdjustment {
            wallet_index: buyer as u32,
            amount,
        });
        decrements.push(WalletAdjustment {
            wallet_index: seller as u32,
            amount: amount + pair_fee,
        });
        funding.push((wallet(seller), amount + pair_fee));
        fee += pair_fee;
    }

    let wallets: Vec<Address> = (0..2 * pairs).map(wallet).collect();
    let batch = SettlementBatch {
        trade_hashes: vec![vec![[0x77; 32]]; wallets.len()],
        wallets,
        adjustments: vec![AssetAdjustments {
            asset: USDC,
            increments,
            decrements,
            fee,
        }],
    };
    (batch, funding)
}

fn bench_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement");
    group.measurement_time(Duration::from_secs(10));

    for size in SIZES {
        let (batch, funding) = random_settlement(size);
        let payload = settlement_payload(&batch);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("prepare_submit", size), &payload, |b, payload| {
            b.iter_batched(
                || {
                    let mut env = Env::new();
                    for (account, amount) in &funding {
                        env.deposit(*account, USDC, *amount);
                    }
                    env
                },
                |mut env| {
                    env.ledger
                        .prepare_settlement_batch(OPERATOR, payload)
                        .expect("prepare");
                    black_box(
                        env.ledger
                            .submit_settlement_batch(OPERATOR, payload)
                            .expect("submit"),
                    )
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("decode", size), &payload, |b, payload| {
            b.iter(|| black_box(EncodedBatch::decode(payload).expect("decode")))
        });
    }

    group.finish();
}

fn bench_withdrawals(c: &mut Criterion) {
    let mut group = c.benchmark_group("withdrawals");
    group.measurement_time(Duration::from_secs(10));
    let mut rng = rand::thread_rng();

    for size in SIZES {
        let traders: Vec<Trader> = (0..size).map(|_| Trader::new()).collect();
        let domain = *Env::new().ledger.domain();
        let items = traders
            .iter()
            .enumerate()
            .map(|(nonce, trader)| {
                let amount = U256::from(rng.gen_range(100u64..10_000));
                trader.withdrawal(&domain, USDC, amount, nonce as u64 + 1, U256::from(1))
            })
            .collect();
        let payload = withdrawal_payload(items);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("process_batch", size), &payload, |b, payload| {
            b.iter_batched(
                || {
                    let mut env = Env::new();
                    for trader in &traders {
                        env.deposit(trader.address, USDC, U256::from(10_000));
                    }
                    env
                },
                |mut env| {
                    black_box(
                        env.ledger
                            .process_withdrawal_batch(OPERATOR, payload)
                            .expect("batch"),
                    )
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_settlement, bench_withdrawals);
criterion_main!(benches);
