pub mod blk_file_source;
pub mod block_source;
pub mod block_window;
pub mod hex_dir_source;
pub mod memory_source;
pub mod retrying_source;

pub use blk_file_source::BlkFileSource;
pub use block_source::{BlockRef, BlockSource};
pub use block_window::BlockWindow;
pub use hex_dir_source::HexDirSource;
pub use memory_source::MemoryBlockSource;
pub use retrying_source::RetryingSource;
