//! 无缝播放 (gapless) 元数据.
//!
//! 编码器前置延迟 (priming) 与尾部填充既可写成 `iTunSMPB` 标签,
//! 也可写成容器原生的 edit list, 两种方式可同时启用.

use bitflags::bitflags;

bitflags! {
    /// gapless 信息的写入方式
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GaplessMode: u32 {
        /// `iTunSMPB` free-form 标签
        const ITUNSMPB = 1 << 0;
        /// edit list + 采样分组描述
        const EDTS     = 1 << 1;
    }
}

impl Default for GaplessMode {
    fn default() -> Self {
        Self::ITUNSMPB
    }
}

/// `iTunSMPB` 标签名
pub const ITUNSMPB_TAG: &str = "iTunSMPB";

/// 前置延迟与有效时长 (采样数)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GaplessInfo {
    /// 编码器前置延迟
    pub edit_start: u64,
    /// 有效音频长度
    pub edit_duration: u64,
}

impl GaplessInfo {
    pub const fn new(edit_start: u64, edit_duration: u64) -> Self {
        Self {
            edit_start,
            edit_duration,
        }
    }

    /// 尾部填充 = 总时长 - 前置延迟 - 有效时长
    ///
    /// 结果按 32 位截断, 与 `iTunSMPB` 字段宽度一致.
    pub fn trailing_padding(&self, total_duration: u64) -> u32 {
        total_duration
            .wrapping_sub(self.edit_start)
            .wrapping_sub(self.edit_duration) as u32
    }

    /// 生成 `iTunSMPB` 标签值
    ///
    /// 12 个十六进制字段, 第 2-4 个为前置延迟、尾部填充、有效时长 (高低 32 位拼接).
    pub fn itunsmpb_value(&self, total_duration: u64) -> String {
        format!(
            " 00000000 {:08X} {:08X} {:08X}{:08X} 00000000 00000000 00000000 00000000 00000000 00000000 00000000 00000000",
            self.edit_start as u32,
            self.trailing_padding(total_duration),
            (self.edit_duration >> 32) as u32,
            (self.edit_duration & 0xFFFF_FFFF) as u32,
        )
    }
}
