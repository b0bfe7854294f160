// Signing & envelope codec benchmarks.
//
// Covers Ed25519 keypair generation, raw signing and verification, envelope
// signing, and envelope encode/decode at various operation counts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use stellar_wire::config::Network;
use stellar_wire::crypto::{verify_decorated, KeyPair};
use stellar_wire::operation::PaymentBuilder;
use stellar_wire::transaction::{TransactionBuilder, TransactionEnvelope};
use stellar_wire::types::{Asset, SignerKey};
use stellar_wire::xdr::{ReadXdr, WriteXdr};

const DESTINATION: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

fn envelope_with(keypair: &KeyPair, ops: usize) -> TransactionEnvelope {
    let usdc = Asset::credit("USDC", DESTINATION).unwrap();
    let payments = (0..ops).map(|i| {
        let asset = if i % 2 == 0 { Asset::native() } else { usdc.clone() };
        PaymentBuilder::new(DESTINATION, asset, "12.5").build().unwrap()
    });
    TransactionBuilder::new(&keypair.address(), 1)
        .add_operations(payments)
        .build()
        .unwrap()
        .into_envelope()
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(KeyPair::random);
    });
}

fn bench_sign_message(c: &mut Criterion) {
    let keypair = KeyPair::random();
    let message = [42u8; 32];

    c.bench_function("ed25519/sign_decorated", |b| {
        b.iter(|| keypair.sign_decorated(&message));
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let keypair = KeyPair::random();
    let message = [42u8; 32];
    let signature = keypair.sign_decorated(&message);
    let signer = SignerKey::Ed25519(keypair.public_key_bytes());

    c.bench_function("ed25519/verify_decorated", |b| {
        b.iter(|| verify_decorated(&signer, &message, &signature).unwrap());
    });
}

fn bench_sign_envelope(c: &mut Criterion) {
    let keypair = KeyPair::random();
    let network = Network::testnet();
    let envelope = envelope_with(&keypair, 1);

    c.bench_function("envelope/sign", |b| {
        b.iter(|| {
            let mut env = envelope.clone();
            env.sign(&keypair, &network).unwrap();
            env
        });
    });
}

fn bench_envelope_codec(c: &mut Criterion) {
    let keypair = KeyPair::random();
    let network = Network::testnet();
    let mut group = c.benchmark_group("envelope/codec");

    for ops in [1, 10, 100] {
        let mut envelope = envelope_with(&keypair, ops);
        envelope.sign(&keypair, &network).unwrap();
        let bytes = envelope.to_xdr();

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", ops), &envelope, |b, env| {
            b.iter(|| env.to_xdr());
        });
        group.bench_with_input(BenchmarkId::new("decode", ops), &bytes, |b, bytes| {
            b.iter(|| TransactionEnvelope::from_xdr(bytes).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_message,
    bench_verify_signature,
    bench_sign_envelope,
    bench_envelope_codec,
);
criterion_main!(benches);
