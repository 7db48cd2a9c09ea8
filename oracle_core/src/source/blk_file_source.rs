//! Raw `blkNNNNN.dat` files as written by a full node.
//!
//! Each record is the network magic, a little-endian block size and the block
//! itself. Newer nodes obfuscate the files with the 8-byte key in `xor.dat`;
//! byte `i` of a file is stored XOR `key[i % 8]`.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use memmap2::Mmap;
use tracing::{debug, info};

use super::block_source::{BlockRef, BlockSource};
use crate::common::enums::Network;
use crate::common::oracle_error::OracleError;
use crate::common::utils::{reversed, sha256d};
use crate::decoder::block::HEADER_SIZE;

const RECORD_PREFIX: usize = 8;
const XOR_KEY_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockLocation {
    file: usize,
    /// Offset of the block bytes, after magic and size
    offset: usize,
    size: usize,
}

#[derive(Debug)]
pub struct BlkFileSource {
    dir: PathBuf,
    network: Network,
    /// Sorted newest first
    files: Vec<PathBuf>,
    xor_key: Option<[u8; XOR_KEY_LEN]>,
    index: Mutex<HashMap<String, BlockLocation>>,
}

fn blk_number(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let digits = name.strip_prefix("blk")?.strip_suffix(".dat")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn map_file(path: &Path) -> Result<Mmap, OracleError> {
    let file = File::open(path)
        .map_err(|e| OracleError::ledger(format!("cannot open {}: {}", path.display(), e)))?;
    // block files are append-only while the node runs; records already written do not change
    unsafe { Mmap::map(&file) }
        .map_err(|e| OracleError::ledger(format!("cannot map {}: {}", path.display(), e)))
}

impl BlkFileSource {
    pub fn open(dir: impl Into<PathBuf>, network: Network) -> Result<Self, OracleError> {
        let dir = dir.into();
        let entries = fs::read_dir(&dir)
            .map_err(|e| OracleError::ledger(format!("cannot list {}: {}", dir.display(), e)))?;

        let mut numbered: Vec<(u32, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| blk_number(&path).map(|n| (n, path)))
            .collect();
        if numbered.is_empty() {
            return Err(OracleError::ledger(format!(
                "no blk*.dat files in {}",
                dir.display()
            )));
        }
        numbered.sort_by(|a, b| b.0.cmp(&a.0));
        let files = numbered.into_iter().map(|(_, path)| path).collect();

        let xor_key = Self::read_xor_key(&dir)?;
        info!(
            "block files in {} ({}, {})",
            dir.display(),
            network,
            if xor_key.is_some() { "obfuscated" } else { "plain" }
        );

        Ok(Self {
            dir,
            network,
            files,
            xor_key,
            index: Mutex::new(HashMap::new()),
        })
    }

    fn read_xor_key(dir: &Path) -> Result<Option<[u8; XOR_KEY_LEN]>, OracleError> {
        let path = dir.join("xor.dat");
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)
            .map_err(|e| OracleError::ledger(format!("cannot read {}: {}", path.display(), e)))?;
        if bytes.len() != XOR_KEY_LEN {
            return Err(OracleError::ledger(format!(
                "{} holds {} bytes, expected {}",
                path.display(),
                bytes.len(),
                XOR_KEY_LEN
            )));
        }
        let mut key = [0u8; XOR_KEY_LEN];
        key.copy_from_slice(&bytes);
        // an all-zero key leaves the data unchanged
        Ok(if key.iter().all(|b| *b == 0) { None } else { Some(key) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn read_at(&self, data: &[u8], offset: usize, len: usize) -> Option<Vec<u8>> {
        let end = offset.checked_add(len)?;
        let mut out = data.get(offset..end)?.to_vec();
        if let Some(key) = &self.xor_key {
            for (i, b) in out.iter_mut().enumerate() {
                *b ^= key[(offset + i) % XOR_KEY_LEN];
            }
        }
        Some(out)
    }

    /// Walk one file's records, recording the locations of `wanted` hashes
    fn scan_file(
        &self,
        file: usize,
        wanted: &mut HashSet<String>,
        index: &mut HashMap<String, BlockLocation>,
    ) -> Result<(), OracleError> {
        let path = &self.files[file];
        let data = map_file(path)?;
        let magic = self.network.magic();
        let mut pos = 0usize;
        let mut records = 0usize;

        while !wanted.is_empty() {
            let Some(prefix) = self.read_at(&data, pos, RECORD_PREFIX) else {
                break;
            };
            if prefix[..4] != magic {
                // resynchronize one byte at a time
                pos += 1;
                continue;
            }
            let size = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]) as usize;
            let offset = pos + RECORD_PREFIX;
            let Some(header) = self.read_at(&data, offset, HEADER_SIZE) else {
                break;
            };
            records += 1;

            let hash = hex::encode(reversed(sha256d(&header)));
            if wanted.remove(&hash) {
                index.insert(hash, BlockLocation { file, offset, size });
            }
            pos = offset + size.max(HEADER_SIZE);
        }

        debug!("scanned {} records in {}", records, path.display());
        Ok(())
    }

    fn locate(&self, hashes: &[String]) -> Result<(), OracleError> {
        let mut index = self
            .index
            .lock()
            .map_err(|_| OracleError::ledger("block index lock poisoned"))?;
        let mut wanted: HashSet<String> = hashes
            .iter()
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !index.contains_key(h))
            .collect();

        for file in 0..self.files.len() {
            if wanted.is_empty() {
                break;
            }
            self.scan_file(file, &mut wanted, &mut index)?;
        }
        if !wanted.is_empty() {
            let mut missing: Vec<&String> = wanted.iter().collect();
            missing.sort();
            return Err(OracleError::ledger(format!(
                "{} block(s) not found in {}, first {}",
                missing.len(),
                self.dir.display(),
                missing[0]
            )));
        }
        Ok(())
    }

    fn location(&self, hash: &str) -> Result<Option<BlockLocation>, OracleError> {
        let index = self
            .index
            .lock()
            .map_err(|_| OracleError::ledger("block index lock poisoned"))?;
        Ok(index.get(hash).copied())
    }
}

impl BlockSource for BlkFileSource {
    fn block_bytes(&self, block: &BlockRef) -> Result<Vec<u8>, OracleError> {
        let hash = block.hash.trim().to_lowercase();
        let location = match self.location(&hash)? {
            Some(location) => location,
            None => {
                self.locate(std::slice::from_ref(&hash))?;
                self.location(&hash)?.ok_or_else(|| {
                    OracleError::ledger(format!("block {} not indexed", block.hash))
                })?
            }
        };

        let path = &self.files[location.file];
        let data = map_file(path)?;
        self.read_at(&data, location.offset, location.size)
            .ok_or_else(|| {
                OracleError::ledger(format!(
                    "block {} runs past the end of {}",
                    block.hash,
                    path.display()
                ))
            })
    }

    fn name(&self) -> &str {
        "blk-files"
    }

    fn prepare(&self, blocks: &[BlockRef]) -> Result<(), OracleError> {
        let hashes: Vec<String> = blocks.iter().map(|b| b.hash.clone()).collect();
        self.locate(&hashes)
    }
}
