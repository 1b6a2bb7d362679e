//! 线性 PCM 音频格式描述.
//!
//! FLAC 源统一输出 32 位有符号整数容器, 有效位对齐到高位 (MSB 位于 bit 31),
//! `valid_bits` 记录原始位深.

use std::fmt;

/// 交错 PCM 音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AudioFormat {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数
    pub channels: u32,
    /// 有效位深 (原始码流的位深)
    pub valid_bits: u32,
    /// 每个采样点的容器位数
    pub container_bits: u32,
}

impl AudioFormat {
    /// 构造 32 位容器、高位对齐的有符号整数格式
    pub const fn aligned_high_s32(sample_rate: u32, channels: u32, valid_bits: u32) -> Self {
        Self {
            sample_rate,
            channels,
            valid_bits,
            container_bits: 32,
        }
    }

    /// 将原始位深的采样左移到高位对齐所需的位数
    pub const fn alignment_shift(&self) -> u32 {
        self.container_bits.saturating_sub(self.valid_bits)
    }

    /// 格式是否已确定
    pub const fn is_valid(&self) -> bool {
        self.sample_rate > 0 && self.channels > 0 && self.valid_bits > 0
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Hz {}ch {}bit (容器 {}bit)",
            self.sample_rate, self.channels, self.valid_bits, self.container_bits
        )
    }
}
