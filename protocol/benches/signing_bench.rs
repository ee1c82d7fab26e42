// Signing, packing and Merkle benchmarks for the Bitmark protocol core.
//
// Covers Ed25519 key generation and signing, canonical record packing,
// batch issuance signing at various sizes, and Merkle tree construction.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bitmark_protocol::config::Network;
use bitmark_protocol::crypto::hash::{sha3_256, sha3_256_pair};
use bitmark_protocol::crypto::keys::KeyPair;
use bitmark_protocol::crypto::merkle::build_tree;
use bitmark_protocol::crypto::signatures::{sign, verify};
use bitmark_protocol::transaction::{Issuance, Link, SignableParams, Transfer};

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(KeyPair::generate);
    });
}

fn bench_sign_message(c: &mut Criterion) {
    let keypair = KeyPair::generate();
    let message = b"transfer bitmark 20df48ef to eujeF5ZB";

    c.bench_function("ed25519/sign_message", |b| {
        b.iter(|| sign(&keypair, message));
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let keypair = KeyPair::generate();
    let message = b"transfer bitmark 20df48ef to eujeF5ZB";
    let signature = sign(&keypair, message);
    let public_key = keypair.public_key();

    c.bench_function("ed25519/verify_signature", |b| {
        b.iter(|| verify(&public_key, message, &signature));
    });
}

fn bench_pack_transfer(c: &mut Criterion) {
    let owner = KeyPair::generate().address(Network::Testnet);
    let transfer = Transfer::new(Link::from_bytes([0x20; 32]), owner);

    c.bench_function("codec/pack_transfer", |b| {
        b.iter(|| transfer.canonical_bytes().unwrap());
    });
}

fn bench_sign_transfer(c: &mut Criterion) {
    let keypair = KeyPair::generate();
    let owner = KeyPair::generate().address(Network::Testnet);

    c.bench_function("params/sign_transfer", |b| {
        b.iter(|| {
            let mut transfer = Transfer::new(Link::from_bytes([0x20; 32]), owner);
            transfer.sign(&keypair).unwrap();
            transfer.to_json().unwrap()
        });
    });
}

fn bench_sign_issuance(c: &mut Criterion) {
    let mut group = c.benchmark_group("params/sign_issuance");
    let keypair = KeyPair::generate();
    let owner = keypair.address(Network::Testnet);
    let asset_id = "f5".repeat(64);

    for quantity in [1u32, 10, 100] {
        let nonces: Vec<u32> = (1..=quantity).collect();
        let issuance = Issuance::with_nonces(&asset_id, owner, quantity, nonces).unwrap();

        group.throughput(Throughput::Elements(u64::from(quantity)));
        group.bench_with_input(
            BenchmarkId::from_parameter(quantity),
            &issuance,
            |b, issuance| {
                b.iter(|| {
                    let mut issuance = issuance.clone();
                    issuance.sign(&keypair).unwrap();
                    issuance
                });
            },
        );
    }

    group.finish();
}

fn bench_merkle_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle/build_tree_sha3_256");

    for size in [10usize, 100, 1_000] {
        let leaves: Vec<[u8; 32]> = (0..size)
            .map(|i| sha3_256(format!("leaf-{i:06}").as_bytes()))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &leaves, |b, leaves| {
            b.iter(|| build_tree(leaves, sha3_256_pair).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_message,
    bench_verify_signature,
    bench_pack_transfer,
    bench_sign_transfer,
    bench_sign_issuance,
    bench_merkle_tree,
);
criterion_main!(benches);
