//! # yin-core
//!
//! Yin 核心库, 提供基础类型定义、错误处理和位流工具.
//!
//! 上层的 codec 与 format crate 共用这里的错误类型、音频格式、标签与章节模型.

pub mod audio_format;
pub mod bitreader;
pub mod bitwriter;
pub mod chapter;
pub mod error;
pub mod gapless;
pub mod tag;

// 重导出常用类型
pub use audio_format::AudioFormat;
pub use chapter::Chapter;
pub use error::{YinError, YinResult};
pub use gapless::{GaplessInfo, GaplessMode};
pub use tag::{FourCc, TagKey, TagSet};
