pub mod block;
pub mod byte_reader;
pub mod filter_config;
pub mod raw_output;
pub mod scanner;
pub mod seen_txids;
pub mod transaction;
pub mod txid;
pub mod varint;

pub use block::{decode_block, BlockHeader, CandidateTx, DecodedBlock};
pub use filter_config::TxFilterConfig;
pub use raw_output::RawOutput;
pub use scanner::{scan_blocks, OutputScanner, ScanResult, ScanStats};
pub use seen_txids::SeenTxids;
pub use txid::Txid;
