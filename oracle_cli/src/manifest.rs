use std::path::Path;

use anyhow::{bail, Context};
use oracle_core::BlockRef;

/// Reads a `height,hash,time` CSV into block references ordered by height
pub fn load_manifest(path: &Path) -> anyhow::Result<Vec<BlockRef>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("cannot open manifest {}", path.display()))?;

    let mut blocks = Vec::new();
    for (row, record) in reader.deserialize::<BlockRef>().enumerate() {
        let block = record
            .with_context(|| format!("bad manifest row {} in {}", row + 1, path.display()))?;
        blocks.push(block);
    }
    if blocks.is_empty() {
        bail!("manifest {} has no blocks", path.display());
    }

    blocks.sort_by_key(|b| b.height);
    if let Some(pair) = blocks.windows(2).find(|w| w[0].height == w[1].height) {
        bail!("manifest lists height {} twice", pair[0].height);
    }
    Ok(blocks)
}
