//! # yin-codec
//!
//! Yin 编解码配置库.
//!
//! - **magic cookie**: 从编码器输出的 AAC esds / ALAC cookie 中提取轨道配置
//! - **AudioSpecificConfig**: 解析采样率索引、采样率与声道配置
//! - **FLAC**: 外部流解码器的调用约定与元数据块类型
//!
//! ## 使用示例
//!
//! ```rust
//! use yin_codec::{DecoderSpecificConfig, parse_aac_cookie};
//!
//! let cookie = [0x05, 0x02, 0x12, 0x10];
//! let config = DecoderSpecificConfig::parse(parse_aac_cookie(&cookie).unwrap()).unwrap();
//! assert_eq!(config.sampling_rate, 44100);
//! assert_eq!(config.channel_config, 2);
//! ```

pub mod alac_config;
pub mod audio_config;
pub mod flac;
pub mod magic_cookie;

// 重导出常用类型
pub use alac_config::AlacSpecificConfig;
pub use audio_config::DecoderSpecificConfig;
pub use flac::{FlacDecoderCallbacks, FlacStreamDecoder, StreamInfo};
pub use magic_cookie::{AlacMagicCookie, parse_aac_cookie, parse_alac_cookie};
