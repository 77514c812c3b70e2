//! # Cosigner Benchmarks
//!
//! | Operation | Notes |
//! |-----------|-------|
//! | Digest | two Keccak rounds over fixed-size pre-images plus the data hash |
//! | Aggregation | sort and concatenate N signatures |
//! | Batch encoding | N packed sub-calls |
//! | Local signing | secp256k1 sign with recovery id |
//! | Simulation | full `execTransaction` against the account emulator |

use cosigner_core::domain::batch::{encode_calls, MULTI_SEND_CALL_ONLY};
use cosigner_core::domain::digest::transaction_digest;
use cosigner_core::domain::entities::{SafeAccount, TransactionRequest};
use cosigner_core::domain::signature::synthetic_approvals;
use cosigner_core::ports::inbound::OrchestratorApi;
use cosigner_core::service::TransactionSigner;
use cosigner_tests::fixtures::{owner_a, owner_key, Harness, COUNTER, OWNER_B, OWNER_C};
use cosigner_types::{Address, BatchCall, Bytes, SafeTransaction, U256};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn account() -> SafeAccount {
    SafeAccount::new(1, Address::new([0xbb; 20]))
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    for size in [0usize, 256, 4096] {
        let tx = SafeTransaction::call(Address::new([0xaa; 20]), Bytes::from(vec![0x5a; size]))
            .with_nonce(U256::from(42));
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("transaction_digest", size), &tx, |b, tx| {
            b.iter(|| transaction_digest(black_box(&account()), black_box(tx)));
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for count in [2u8, 10, 50] {
        let owners: Vec<Address> = (0..count).rev().map(|i| Address::new([i; 20])).collect();
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::new("synthetic", count), &owners, |b, owners| {
            b.iter(|| synthetic_approvals(black_box(owners)));
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    for count in [1usize, 10, 100] {
        let calls: Vec<BatchCall> = (0..count)
            .map(|i| BatchCall::new(Address::new([0x11; 20]), Bytes::from(vec![0xab; 68 + i])))
            .collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("encode_calls", count), &calls, |b, calls| {
            b.iter(|| encode_calls(MULTI_SEND_CALL_ONLY, black_box(calls)));
        });
    }
    group.finish();
}

fn bench_sign(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let signer = owner_key();
    let tx = SafeTransaction::call(Address::new([0xaa; 20]), Bytes::new());
    c.bench_function("local_key_sign", |b| {
        b.iter(|| runtime.block_on(signer.sign(&account(), black_box(&tx), owner_a())));
    });
}

fn bench_simulation(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let mut harness = Harness::simulation();
    harness.bind(&[OWNER_B, OWNER_C]);
    c.bench_function("simulate_two_of_three", |b| {
        b.iter(|| {
            runtime.block_on(
                harness
                    .client
                    .run(TransactionRequest::call(COUNTER, Bytes::new())),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_digest,
    bench_aggregate,
    bench_batch,
    bench_sign,
    bench_simulation
);
criterion_main!(benches);
