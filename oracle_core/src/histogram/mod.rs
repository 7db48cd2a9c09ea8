pub mod bins;
pub mod histogram_config;
pub mod output_histogram;

pub use bins::BinEdges;
pub use histogram_config::HistogramConfig;
pub use output_histogram::OutputHistogram;
