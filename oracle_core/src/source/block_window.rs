use chrono::NaiveDate;
use serde::Serialize;

use super::block_source::BlockRef;
use crate::calibration::Calibration;
use crate::common::{
    enums::Stage,
    oracle_error::OracleError,
    time::{parse_date, utc_date_of, utc_day_bounds},
};

/// How a window was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowKind {
    UtcDay { date: NaiveDate },
    Recent { count: usize },
}

/// Ordered blocks for one oracle run
#[derive(Debug, Clone, PartialEq)]
pub struct BlockWindow {
    pub kind: WindowKind,
    pub blocks: Vec<BlockRef>,
}

fn check_ordered(manifest: &[BlockRef]) -> Result<(), OracleError> {
    if let Some(pair) = manifest.windows(2).find(|w| w[0].height >= w[1].height) {
        return Err(OracleError::para(format!(
            "manifest must be ordered by height: {} is followed by {}",
            pair[0].height, pair[1].height
        )));
    }
    Ok(())
}

impl BlockWindow {
    /// Blocks whose header time falls inside the UTC day `date`.
    ///
    /// The manifest must extend past the end of the day, so the day is complete.
    pub fn utc_day(
        manifest: &[BlockRef],
        date: NaiveDate,
        calibration: &Calibration,
    ) -> Result<Self, OracleError> {
        let supported_since = parse_date(calibration.supported_since)?;
        if date < supported_since {
            return Err(OracleError::para(format!(
                "{} is before {}, the earliest date calibration {} supports",
                date, supported_since, calibration.version
            )));
        }
        check_ordered(manifest)?;

        let (_, end) = utc_day_bounds(date);
        if !manifest.iter().any(|b| b.time >= end) {
            return Err(OracleError::insufficient(
                Stage::Source,
                format!("{} is not complete in the manifest", date),
            ));
        }
        let blocks: Vec<BlockRef> = manifest
            .iter()
            .filter(|b| utc_date_of(b.time) == Some(date))
            .cloned()
            .collect();
        if blocks.is_empty() {
            return Err(OracleError::insufficient(
                Stage::Source,
                format!("no blocks on {}", date),
            ));
        }
        Ok(Self {
            kind: WindowKind::UtcDay { date },
            blocks,
        })
    }

    /// The last `count` blocks of the manifest
    pub fn recent(manifest: &[BlockRef], count: usize) -> Result<Self, OracleError> {
        if count == 0 {
            return Err(OracleError::para("block count must be positive"));
        }
        check_ordered(manifest)?;
        if manifest.is_empty() {
            return Err(OracleError::insufficient(Stage::Source, "manifest is empty"));
        }
        let blocks = manifest[manifest.len().saturating_sub(count)..].to_vec();
        Ok(Self {
            kind: WindowKind::Recent { count },
            blocks,
        })
    }

    pub fn first_height(&self) -> Option<u32> {
        self.blocks.first().map(|b| b.height)
    }

    pub fn last_height(&self) -> Option<u32> {
        self.blocks.last().map(|b| b.height)
    }

    pub fn label(&self) -> String {
        match &self.kind {
            WindowKind::UtcDay { date } => date.to_string(),
            WindowKind::Recent { .. } => format!(
                "blocks {}-{}",
                self.first_height().unwrap_or_default(),
                self.last_height().unwrap_or_default()
            ),
        }
    }
}
