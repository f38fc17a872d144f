//! Criterion benchmarks for inspected transactions.
//!
//! Covers: promotion from utxos, record encode, and record decode.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use itx_core::address::Network;
use itx_core::script::Script;
use itx_core::types::{Hash256, OutPoint, Transaction, TxInput, TxOutput};
use itx_core::utxo::Utxo;
use itx_inspector::InspectedTransaction;
use itx_protocol::actions::{Settlement, Transfer};
use itx_protocol::{Action, EnvelopeCodec, ProtocolCodec};

const INPUTS: usize = 16;

fn fixture(codec: &EnvelopeCodec) -> (Transaction, Vec<Utxo>) {
    let utxos: Vec<Utxo> = (0..INPUTS)
        .map(|i| Utxo {
            txid: Hash256([i as u8; 32]),
            index: i as u32,
            value: 100_000,
            locking_script: Script::p2pkh(&[i as u8; 20]),
        })
        .collect();
    let tx = Transaction {
        version: 1,
        inputs: utxos
            .iter()
            .map(|u| TxInput {
                previous_output: OutPoint::new(u.txid, u.index),
                unlocking_script: Script::new(vec![0x51; 107]),
                sequence: u32::MAX,
            })
            .collect(),
        outputs: vec![
            TxOutput { value: 1_000_000, locking_script: Script::p2pkh(&[0xAA; 20]) },
            TxOutput {
                value: 0,
                locking_script: codec.encode(&Action::from(Transfer::default()), false).unwrap(),
            },
            TxOutput {
                value: 0,
                locking_script: codec.encode(&Action::from(Settlement::default()), false).unwrap(),
            },
        ],
        lock_time: 0,
    };
    (tx, utxos)
}

fn bench_promote(c: &mut Criterion) {
    let codec = EnvelopeCodec::new();
    let (tx, utxos) = fixture(&codec);
    c.bench_function("promote_from_utxos", |b| {
        b.iter_with_setup(
            || InspectedTransaction::new_base(tx.clone()).unwrap(),
            |itx| {
                itx.promote_from_utxos(black_box(&utxos), &codec, Network::Mainnet).unwrap();
                itx
            },
        );
    });
}

fn bench_codec(c: &mut Criterion) {
    let codec = EnvelopeCodec::new();
    let (tx, utxos) = fixture(&codec);
    let itx = InspectedTransaction::new_base(tx).unwrap();
    itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
    let bytes = itx.encode();

    c.bench_function("record_encode", |b| b.iter(|| black_box(&itx).encode()));
    c.bench_function("record_decode", |b| {
        b.iter(|| InspectedTransaction::decode(black_box(&bytes), &codec, Network::Mainnet).unwrap())
    });
}

criterion_group!(benches, bench_promote, bench_codec);
criterion_main!(benches);
