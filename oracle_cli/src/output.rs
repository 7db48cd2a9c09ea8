use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use oracle_core::common::time::format_block_time;
use oracle_core::{OracleReport, PricePoint};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PointRow {
    block_height: u32,
    block_time: u64,
    utc_time: String,
    implied_price: f64,
}

impl From<&PricePoint> for PointRow {
    fn from(p: &PricePoint) -> Self {
        PointRow {
            block_height: p.block_height,
            block_time: p.block_time,
            utc_time: format_block_time(p.block_time),
            implied_price: p.implied_price,
        }
    }
}

/// Writes one CSV row per price point
pub fn write_points(path: &Path, points: &[PricePoint]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for point in points {
        writer.serialize(PointRow::from(point))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_report(path: &Path, report: &OracleReport) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}

/// Whole dollars with thousands separators, e.g. `$100,241`
pub fn format_usd(price: f64) -> String {
    let digits = format!("{:.0}", price.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}${}", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::decoder::ScanStats;
    use oracle_core::{Oracle, OracleConfig, RawOutput};

    fn report() -> OracleReport {
        const USD: [f64; 14] = [
            5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 100.0, 150.0, 200.0, 300.0, 500.0,
            1000.0,
        ];
        let mut outputs = Vec::new();
        for usd in USD {
            for f in [0.9925f64, 0.9975, 1.0025, 1.0075] {
                let amount = (usd * 1000.0 * f).round() / 1e8;
                outputs.extend(
                    (0..10).map(|i| RawOutput::new(amount, 830_000 + i, 1_710_000_000)),
                );
            }
        }
        let oracle = Oracle::new(OracleConfig::default()).unwrap();
        let estimate = oracle.estimate_from_outputs(&outputs).unwrap();
        let stats = ScanStats::default();
        OracleReport::new("2024-03-10", (830_000, 830_009), stats, estimate, "test")
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(100241.0), "$100,241");
        assert_eq!(format_usd(999.0), "$999");
        assert_eq!(format_usd(1234567.0), "$1,234,567");
    }

    #[test]
    fn test_write_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        let points = vec![
            PricePoint::new(65000.5, 830000, 1710028800),
            PricePoint::new(64990.0, 830001, 1710029400),
        ];
        write_points(&path, &points).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("block_height,block_time,utc_time,implied_price"));
        assert!(lines.next().unwrap().starts_with("830000,1710028800,"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = report();
        write_report(&path, &report).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["window"], "2024-03-10");
        assert_eq!(json["final_price"].as_f64(), Some(report.final_price));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_report_surfaces_write_errors() {
        assert!(write_report(Path::new("/dev/full"), &report()).is_err());
    }
}
