pub mod analyzer;
pub mod calibration;
pub mod common;
pub mod config;
pub mod decoder;
pub mod histogram;
pub mod mapper;
pub mod solver;
pub mod source;
pub mod stencil;

pub use analyzer::oracle::{Oracle, PriceEstimate};
pub use analyzer::report::{OracleReport, PresentationBounds};
pub use common::enums::{Network, Stage};
pub use common::oracle_error::{ErrCode, OracleError};
pub use config::oracle_config::OracleConfig;
pub use decoder::raw_output::RawOutput;
pub use mapper::price_point::PricePoint;
pub use source::block_source::{BlockRef, BlockSource};
pub use source::block_window::BlockWindow;
