pub mod enums;
pub mod oracle_error;
pub mod time;
pub mod utils;
