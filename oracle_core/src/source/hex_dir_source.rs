use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::block_source::{BlockRef, BlockSource};
use crate::common::{
    enums::Stage,
    oracle_error::{ErrCode, OracleError},
};

/// A directory of block dumps named `<hash>.hex` (hex text) or `<hash>.bin` (raw bytes)
#[derive(Debug, Clone)]
pub struct HexDirSource {
    dir: PathBuf,
}

impl HexDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, OracleError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(OracleError::ledger(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(path: &Path) -> Result<Option<Vec<u8>>, OracleError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(OracleError::ledger(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

impl BlockSource for HexDirSource {
    fn block_bytes(&self, block: &BlockRef) -> Result<Vec<u8>, OracleError> {
        let stem = block.hash.trim().to_lowercase();

        let hex_path = self.dir.join(format!("{}.hex", stem));
        if let Some(text) = Self::read(&hex_path)? {
            let text = String::from_utf8_lossy(&text);
            let compact: String = text.split_whitespace().collect();
            return hex::decode(compact).map_err(|e| {
                OracleError::new(
                    Stage::Source,
                    ErrCode::DecodeError,
                    format!("{} is not valid hex: {}", hex_path.display(), e),
                )
            });
        }

        let bin_path = self.dir.join(format!("{}.bin", stem));
        if let Some(bytes) = Self::read(&bin_path)? {
            return Ok(bytes);
        }

        Err(OracleError::ledger(format!(
            "no dump for block {} (height {}) in {}",
            block.hash,
            block.height,
            self.dir.display()
        )))
    }

    fn name(&self) -> &str {
        "hex-dir"
    }
}
