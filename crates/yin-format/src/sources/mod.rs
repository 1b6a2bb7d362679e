//! 输入源实现.

pub mod flac;

pub use flac::FlacSource;
