pub mod stencil_config;
pub mod stencil_matcher;

pub use stencil_config::StencilConfig;
pub use stencil_matcher::{RoughEstimate, Stencil, StencilMatcher};
