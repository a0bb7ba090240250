//! Repository implementations.

pub mod file;

pub use file::FileNicknameRepository;
