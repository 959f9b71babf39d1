pub mod codec;
pub mod file_lock;
pub mod handle;
