pub mod intraday_mapper;
pub mod mapper_config;
pub mod price_point;
pub mod round_amounts;

pub use intraday_mapper::IntradayMapper;
pub use mapper_config::MapperConfig;
pub use price_point::PricePoint;
pub use round_amounts::RoundAmounts;
