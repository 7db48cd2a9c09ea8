use strum_macros::{Display, EnumString};
use thiserror::Error;

use super::enums::Stage;

/// Error codes for the oracle pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // Pipeline errors (0-99)
    #[strum(serialize = "_PIPELINE_ERR_BEGIN")]
    PipelineErrBegin = 0,
    #[strum(serialize = "DECODE_ERROR")]
    DecodeError = 1,
    #[strum(serialize = "INSUFFICIENT_DATA")]
    InsufficientData = 2,
    #[strum(serialize = "DEGENERATE_WEIGHTING")]
    DegenerateWeighting = 3,
    #[strum(serialize = "NO_CONVERGENCE")]
    NoConvergence = 4,
    #[strum(serialize = "_PIPELINE_ERR_END")]
    PipelineErrEnd = 99,

    // Ledger errors (100-199)
    #[strum(serialize = "_LEDGER_ERR_BEGIN")]
    LedgerErrBegin = 100,
    #[strum(serialize = "LEDGER_UNAVAILABLE")]
    LedgerUnavailable = 101,
    #[strum(serialize = "_LEDGER_ERR_END")]
    LedgerErrEnd = 199,

    // Setup errors (200-299)
    #[strum(serialize = "_SETUP_ERR_BEGIN")]
    SetupErrBegin = 200,
    #[strum(serialize = "PARA_ERROR")]
    ParaError = 201,
    #[strum(serialize = "CONFIG_ERROR")]
    ConfigError = 202,
    #[strum(serialize = "_SETUP_ERR_END")]
    SetupErrEnd = 299,
}

impl ErrCode {
    pub fn is_pipeline_err(&self) -> bool {
        let code = *self as i32;
        code > Self::PipelineErrBegin as i32 && code < Self::PipelineErrEnd as i32
    }

    pub fn is_ledger_err(&self) -> bool {
        let code = *self as i32;
        code > Self::LedgerErrBegin as i32 && code < Self::LedgerErrEnd as i32
    }

    pub fn is_setup_err(&self) -> bool {
        let code = *self as i32;
        code > Self::SetupErrBegin as i32 && code < Self::SetupErrEnd as i32
    }
}

/// A fatal pipeline failure, tagged with the stage that raised it.
#[derive(Debug, Clone, Error)]
#[error("[{stage}] {errcode}: {msg}")]
pub struct OracleError {
    pub stage: Stage,
    pub errcode: ErrCode,
    pub msg: String,
}

impl OracleError {
    pub fn new(stage: Stage, code: ErrCode, message: impl Into<String>) -> Self {
        Self {
            stage,
            errcode: code,
            msg: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(Stage::Decode, ErrCode::DecodeError, message)
    }

    pub fn insufficient(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(stage, ErrCode::InsufficientData, message)
    }

    pub fn ledger(message: impl Into<String>) -> Self {
        Self::new(Stage::Source, ErrCode::LedgerUnavailable, message)
    }

    pub fn para(message: impl Into<String>) -> Self {
        Self::new(Stage::Config, ErrCode::ParaError, message)
    }

    pub fn is_ledger_err(&self) -> bool {
        self.errcode.is_ledger_err()
    }

    pub fn is_pipeline_err(&self) -> bool {
        self.errcode.is_pipeline_err()
    }
}
