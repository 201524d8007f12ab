// Chain benchmarks for the POLARIS ledger.
//
// Covers block sealing, the full claim admission pipeline, point lookups,
// the per-address star index, and whole-chain validation at various sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use tokio::runtime::Runtime;

use polaris_ledger::chain::{Block, BlockBody, ChainManager};
use polaris_ledger::crypto::keys::WalletKeypair;
use polaris_ledger::identity::StarAddress;

/// A wallet with its derived address, for driving the claim pipeline.
struct Claimant {
    keypair: WalletKeypair,
    address: StarAddress,
}

fn claimant() -> Claimant {
    let keypair = WalletKeypair::generate();
    let address = StarAddress::from_public_key(&keypair.public_key());
    Claimant { keypair, address }
}

/// Build a chain with `claims` admitted star claims from one wallet.
fn populated_chain(rt: &Runtime, claims: usize) -> (ChainManager, Claimant) {
    let owner = claimant();
    let chain = rt.block_on(async {
        let chain = ChainManager::new().await;
        for i in 0..claims {
            let message = chain.request_challenge(&owner.address).await;
            let signature = owner.keypair.sign(message.as_bytes());
            chain
                .submit_claim(&owner.address, &message, &signature, json!({ "n": i }))
                .await
                .unwrap();
        }
        chain
    });
    (chain, owner)
}

fn bench_seal_block(c: &mut Criterion) {
    let owner = claimant();
    let body = BlockBody::StarClaim {
        address: owner.address.clone(),
        message: "m".to_string(),
        star: json!({"ra": "5h 55m", "dec": "+7d 24m", "story": "a benchmark star"}),
    };

    c.bench_function("chain/seal_block", |b| {
        b.iter(|| Block::seal(1, 1_700_000_000, Some([7u8; 32]), body.clone()));
    });
}

fn bench_submit_claim(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (chain, owner) = populated_chain(&rt, 0);

    c.bench_function("chain/submit_claim", |b| {
        b.iter_with_setup(
            || {
                let message = rt.block_on(chain.request_challenge(&owner.address));
                let signature = owner.keypair.sign(message.as_bytes());
                (message, signature)
            },
            |(message, signature)| {
                rt.block_on(chain.submit_claim(
                    &owner.address,
                    &message,
                    &signature,
                    json!("bench"),
                ))
                .unwrap()
            },
        );
    });
}

fn bench_block_by_hash(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("chain/block_by_hash");

    for size in [100usize, 1_000] {
        let (chain, _owner) = populated_chain(&rt, size);
        // Worst-ish case: a hash from the middle of the scan.
        let target = rt
            .block_on(chain.block_by_height(size as u64 / 2))
            .unwrap()
            .hash_hex();

        group.bench_with_input(BenchmarkId::from_parameter(size), &target, |b, target| {
            b.iter(|| rt.block_on(chain.block_by_hash(target)).unwrap());
        });
    }

    group.finish();
}

fn bench_stars_by_address(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("chain/stars_by_address");

    for size in [100usize, 1_000] {
        let (chain, owner) = populated_chain(&rt, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| rt.block_on(chain.stars_by_address(&owner.address)));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("chain/validate");

    for size in [100usize, 1_000] {
        let (chain, _owner) = populated_chain(&rt, size);
        group.throughput(Throughput::Elements(size as u64 + 1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let defects = rt.block_on(chain.validate());
                assert!(defects.is_empty());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_seal_block,
    bench_submit_claim,
    bench_block_by_hash,
    bench_stars_by_address,
    bench_validate,
);
criterion_main!(benches);
