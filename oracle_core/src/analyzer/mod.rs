pub mod oracle;
pub mod report;

pub use oracle::{Oracle, PriceEstimate};
pub use report::{OracleReport, PresentationBounds};
