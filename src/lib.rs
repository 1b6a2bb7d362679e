//! # Yin (音)
//!
//! 音频转封装核心: 把 FLAC 解码为带标签的 PCM 采样流,
//! 再把 AAC/ALAC 编码结果连同标签、章节和 gapless 信息写入 M4A 或 ADTS.
//!
//! FLAC 解码器与 MP4 写入库由调用方以 trait 实现注入,
//! 本库只负责配置解析、数据流转与元数据映射.
//!
//! # 快速开始
//!
//! ```rust
//! use yin::codec::{DecoderSpecificConfig, parse_aac_cookie};
//! use yin::format::sinks::adts::adts_header;
//!
//! let cookie = [0x05, 0x02, 0x12, 0x10];
//! let config = DecoderSpecificConfig::parse(parse_aac_cookie(&cookie).unwrap()).unwrap();
//! let header = adts_header(config.sampling_rate_index, config.channel_config, 500).unwrap();
//! assert_eq!(header[..2], [0xFF, 0xF1]);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `yin-core` | 错误、位流读写、音频格式、标签与章节 |
//! | `yin-codec` | magic cookie 与解码器配置解析, FLAC 解码器接口 |
//! | `yin-format` | FLAC 输入源, M4A / ADTS 输出 |

/// 核心类型与工具
pub use yin_core as core;

/// 编解码配置
pub use yin_codec as codec;

/// 容器输入输出
pub use yin_format as format;

pub mod config;
pub mod logging;

pub use config::{GaplessSetting, YinConfig};
pub use logging::LoggingConfig;

/// 获取 Yin 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
