//! Full pipeline runs over synthetic blocks assembled byte by byte.

use std::fs;

use chrono::NaiveDate;
use oracle_core::common::utils::sha256d;
use oracle_core::source::{HexDirSource, MemoryBlockSource};
use oracle_core::{BlockRef, BlockWindow, ErrCode, Oracle, OracleConfig, Stage};

const DAY_START: u32 = 1_710_028_800; // 2024-03-10 00:00:00 UTC
const FIRST_HEIGHT: u32 = 834_000;
const USD: [f64; 14] = [
    5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 100.0, 150.0, 200.0, 300.0, 500.0, 1000.0,
];

fn varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        _ => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
    }
}

fn p2wpkh(tag: u8) -> Vec<u8> {
    let mut script = vec![0x00, 0x14];
    script.extend_from_slice(&[tag; 20]);
    script
}

/// Version 2 transaction; a non-empty witness switches to the segwit layout
fn transaction(
    inputs: &[([u8; 32], u32)],
    outputs: &[(u64, Vec<u8>)],
    witness: &[&[u8]],
) -> Vec<u8> {
    let mut tx = 2u32.to_le_bytes().to_vec();
    if !witness.is_empty() {
        tx.extend_from_slice(&[0x00, 0x01]);
    }
    varint(&mut tx, inputs.len() as u64);
    for (prev, vout) in inputs {
        tx.extend_from_slice(prev);
        tx.extend_from_slice(&vout.to_le_bytes());
        tx.push(0);
        tx.extend_from_slice(&0xffff_fffdu32.to_le_bytes());
    }
    varint(&mut tx, outputs.len() as u64);
    for (value, script) in outputs {
        tx.extend_from_slice(&value.to_le_bytes());
        varint(&mut tx, script.len() as u64);
        tx.extend_from_slice(script);
    }
    if !witness.is_empty() {
        for _ in inputs {
            varint(&mut tx, witness.len() as u64);
            for item in witness {
                varint(&mut tx, item.len() as u64);
                tx.extend_from_slice(item);
            }
        }
    }
    tx.extend_from_slice(&0u32.to_le_bytes());
    tx
}

fn coinbase(height: u32) -> Vec<u8> {
    let mut tx = 1u32.to_le_bytes().to_vec();
    tx.push(1);
    tx.extend_from_slice(&[0u8; 32]);
    tx.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
    let script = [&[0x03][..], &height.to_le_bytes()[..3]].concat();
    varint(&mut tx, script.len() as u64);
    tx.extend_from_slice(&script);
    tx.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
    tx.push(2);
    tx.extend_from_slice(&312_500_000u64.to_le_bytes());
    let spk = p2wpkh(0xcb);
    varint(&mut tx, spk.len() as u64);
    tx.extend_from_slice(&spk);
    tx.extend_from_slice(&100_000u64.to_le_bytes());
    varint(&mut tx, spk.len() as u64);
    tx.extend_from_slice(&spk);
    tx.extend_from_slice(&0u32.to_le_bytes());
    tx
}

fn txid(legacy_tx: &[u8]) -> [u8; 32] {
    sha256d(legacy_tx)
}

/// Header plus transactions; returns the display-order hash and the block bytes
fn block(prev: [u8; 32], time: u32, txs: &[Vec<u8>]) -> (String, Vec<u8>) {
    let mut header = 0x2000_0000u32.to_le_bytes().to_vec();
    header.extend_from_slice(&prev);
    header.extend_from_slice(&[0x5a; 32]);
    header.extend_from_slice(&time.to_le_bytes());
    header.extend_from_slice(&0x1703_4219u32.to_le_bytes());
    header.extend_from_slice(&time.wrapping_mul(31).to_le_bytes());
    let mut hash = sha256d(&header);
    hash.reverse();

    let mut bytes = header;
    varint(&mut bytes, txs.len() as u64);
    for tx in txs {
        bytes.extend_from_slice(tx);
    }
    (hex::encode(hash), bytes)
}

fn unique_prev(n: u32) -> [u8; 32] {
    let mut prev = [0xee; 32];
    prev[..4].copy_from_slice(&n.to_le_bytes());
    prev
}

/// Output amounts, in sats, clustered around every round USD amount at $100,000
fn round_usd_sats() -> Vec<u64> {
    let mut sats = Vec::new();
    for usd in USD {
        for f in [0.9925, 0.9975, 1.0025, 1.0075] {
            let s = (usd * 1000.0 * f).round() as u64;
            sats.extend(std::iter::repeat(s).take(10));
        }
    }
    sats
}

struct Chain {
    blocks: Vec<(BlockRef, Vec<u8>)>,
}

impl Chain {
    fn manifest(&self) -> Vec<BlockRef> {
        self.blocks.iter().map(|(r, _)| r.clone()).collect()
    }

    fn memory_source(&self) -> MemoryBlockSource {
        let mut source = MemoryBlockSource::new();
        for (r, bytes) in &self.blocks {
            source.insert(&r.hash, bytes.clone());
        }
        source
    }
}

/// Six blocks inside the day carrying the round-USD payments plus filtered noise,
/// and one block after midnight closing the day
fn build_chain(payment_sats: &[u64]) -> Chain {
    let pairs: Vec<&[u64]> = payment_sats.chunks(2).collect();
    let per_block = (pairs.len() + 5) / 6;
    let mut blocks = Vec::new();
    let mut prev_hash = [0u8; 32];
    let mut prev_counter = 0u32;
    let mut first_payment_txid = None;

    for b in 0..7u32 {
        let height = FIRST_HEIGHT + b;
        let time = if b < 6 {
            DAY_START + 600 + b * 3_600
        } else {
            DAY_START + 86_400 + 300
        };
        let mut txs = vec![coinbase(height)];

        if b < 6 {
            let start = (b as usize * per_block).min(pairs.len());
            let end = ((b as usize + 1) * per_block).min(pairs.len());
            for (i, pair) in pairs[start..end].iter().enumerate() {
                prev_counter += 1;
                let outputs: Vec<(u64, Vec<u8>)> =
                    pair.iter().map(|v| (*v, p2wpkh(i as u8))).collect();
                let sig = [0x30u8; 71];
                let key = [0x02u8; 33];
                let witness: Vec<&[u8]> = if i % 2 == 0 {
                    vec![&sig[..], &key[..]]
                } else {
                    vec![]
                };
                let tx = transaction(&[(unique_prev(prev_counter), 0)], &outputs, &witness);
                if first_payment_txid.is_none() {
                    let legacy = transaction(&[(unique_prev(prev_counter), 0)], &outputs, &[]);
                    first_payment_txid = Some(txid(&legacy));
                }
                txs.push(tx);
            }

            // filtered out: three outputs, data carrier, six inputs
            txs.push(transaction(
                &[(unique_prev(900_000 + b), 0)],
                &[(123_456, p2wpkh(1)), (234_567, p2wpkh(2)), (345_678, p2wpkh(3))],
                &[],
            ));
            txs.push(transaction(
                &[(unique_prev(910_000 + b), 0)],
                &[(150_000, p2wpkh(1)), (0, vec![0x6a, 0x02, 0xbe, 0xef])],
                &[],
            ));
            let many: Vec<([u8; 32], u32)> = (0..6)
                .map(|k| (unique_prev(920_000 + b * 10 + k), 0))
                .collect();
            txs.push(transaction(&many, &[(170_000, p2wpkh(1)), (180_000, p2wpkh(2))], &[]));
        }

        if let (3, Some(parent)) = (b, first_payment_txid) {
            // spends the day's first payment, so it is excluded as a same-day spend
            txs.push(transaction(
                &[(parent, 0)],
                &[(777_777, p2wpkh(7)), (888_888, p2wpkh(8))],
                &[],
            ));
        }

        let (hash, bytes) = block(prev_hash, time, &txs);
        let mut raw_hash = hex::decode(&hash).unwrap();
        raw_hash.reverse();
        prev_hash.copy_from_slice(&raw_hash);
        blocks.push((BlockRef::new(height, hash, time as u64), bytes));
    }
    Chain { blocks }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

#[test]
fn test_round_usd_payments_recover_price() {
    let chain = build_chain(&round_usd_sats());
    let source = chain.memory_source();
    let oracle = Oracle::new(OracleConfig::default()).unwrap();
    let window = BlockWindow::utc_day(&chain.manifest(), day(), oracle.calibration()).unwrap();
    assert_eq!(window.blocks.len(), 6);

    let report = oracle.run(&source, &window).unwrap();
    assert!((report.final_price - 100_000.0).abs() / 100_000.0 < 0.01);
    assert!((report.rough_price - 100_000.0).abs() / 100_000.0 < 0.02);
    assert_eq!(report.final_price, report.central_price.round());
    assert!(report.deviation_pct > 0.0 && report.deviation_pct < 0.1);
    assert_eq!(report.bounds.ax_range, 0.05);

    assert_eq!(report.stats.blocks, 6);
    assert_eq!(report.stats.qualifying_txs, 280);
    assert_eq!(report.stats.same_day_spends, 1);
    assert_eq!(report.stats.outputs, 560);
    assert_eq!(report.first_height, FIRST_HEIGHT);
    assert_eq!(report.last_height, FIRST_HEIGHT + 5);
    assert_eq!(report.window, "2024-03-10");

    let plotted = report.plot_points();
    assert!(!plotted.is_empty());
    assert!(plotted.iter().all(|p| report.bounds.contains(p.implied_price)));
    assert!(plotted
        .windows(2)
        .all(|w| w[0].block_height <= w[1].block_height));
}

#[test]
fn test_sequential_and_parallel_agree() {
    let chain = build_chain(&round_usd_sats());
    let source = chain.memory_source();
    let window = BlockWindow::recent(&chain.manifest(), 7).unwrap();

    let parallel = Oracle::new(OracleConfig::default()).unwrap();
    let mut conf = std::collections::HashMap::new();
    conf.insert("parallel_decode".to_string(), serde_json::json!(false));
    let sequential = Oracle::new(OracleConfig::new(Some(conf)).unwrap()).unwrap();

    let a = parallel.run(&source, &window).unwrap();
    let b = sequential.run(&source, &window).unwrap();
    assert_eq!(a.final_price, b.final_price);
    assert_eq!(a.stats, b.stats);
    assert_eq!(a.price_points, b.price_points);
}

#[test]
fn test_hex_dump_directory() {
    let chain = build_chain(&round_usd_sats());
    let dir = tempfile::tempdir().unwrap();
    for (r, bytes) in &chain.blocks {
        fs::write(dir.path().join(format!("{}.hex", r.hash)), hex::encode(bytes)).unwrap();
    }
    let source = HexDirSource::new(dir.path()).unwrap();
    let oracle = Oracle::new(OracleConfig::default()).unwrap();
    let window = BlockWindow::utc_day(&chain.manifest(), day(), oracle.calibration()).unwrap();
    let from_disk = oracle.run(&source, &window).unwrap();
    let in_memory = oracle.run(&chain.memory_source(), &window).unwrap();
    assert_eq!(from_disk.final_price, in_memory.final_price);
}

#[test]
fn test_no_qualifying_outputs_is_insufficient_data() {
    let chain = build_chain(&[]);
    let source = chain.memory_source();
    let oracle = Oracle::new(OracleConfig::default()).unwrap();
    let window = BlockWindow::utc_day(&chain.manifest(), day(), oracle.calibration()).unwrap();
    let err = oracle.run(&source, &window).unwrap_err();
    assert_eq!(err.errcode, ErrCode::InsufficientData);
    assert_eq!(err.stage, Stage::Histogram);
}

#[test]
fn test_missing_block_is_ledger_error() {
    let chain = build_chain(&round_usd_sats());
    let mut source = MemoryBlockSource::new();
    for (r, bytes) in chain.blocks.iter().skip(1) {
        source.insert(&r.hash, bytes.clone());
    }
    let oracle = Oracle::new(OracleConfig::default()).unwrap();
    let window = BlockWindow::utc_day(&chain.manifest(), day(), oracle.calibration()).unwrap();
    let err = oracle.run(&source, &window).unwrap_err();
    assert_eq!(err.errcode, ErrCode::LedgerUnavailable);
}
