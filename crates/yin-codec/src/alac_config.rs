//! ALACSpecificConfig 字段视图.
//!
//! ```text
//! frameLength        u32
//! compatibleVersion  u8
//! bitDepth           u8
//! pb / mb / kb       u8 ×3
//! numChannels        u8
//! maxRun             u16
//! maxFrameBytes      u32
//! avgBitRate         u32
//! sampleRate         u32
//! ```
//! 全部为大端.

use byteorder::{BigEndian, ByteOrder};
use yin_core::{YinError, YinResult};

use crate::magic_cookie::ALAC_CONFIG_SIZE;

/// ALACSpecificConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlacSpecificConfig {
    pub frame_length: u32,
    pub compatible_version: u8,
    pub bit_depth: u8,
    pub pb: u8,
    pub mb: u8,
    pub kb: u8,
    pub num_channels: u8,
    pub max_run: u16,
    pub max_frame_bytes: u32,
    pub avg_bit_rate: u32,
    pub sample_rate: u32,
}

impl AlacSpecificConfig {
    /// 解析 24 字节配置
    pub fn parse(data: &[u8]) -> YinResult<Self> {
        if data.len() != ALAC_CONFIG_SIZE {
            return Err(YinError::Format(format!(
                "无效的 ALACSpecificConfig: 长度 {} != {}",
                data.len(),
                ALAC_CONFIG_SIZE,
            )));
        }
        Ok(Self {
            frame_length: BigEndian::read_u32(&data[0..4]),
            compatible_version: data[4],
            bit_depth: data[5],
            pb: data[6],
            mb: data[7],
            kb: data[8],
            num_channels: data[9],
            max_run: BigEndian::read_u16(&data[10..12]),
            max_frame_bytes: BigEndian::read_u32(&data[12..16]),
            avg_bit_rate: BigEndian::read_u32(&data[16..20]),
            sample_rate: BigEndian::read_u32(&data[20..24]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_解析字段() {
        let mut data = vec![0u8; ALAC_CONFIG_SIZE];
        BigEndian::write_u32(&mut data[0..4], 4096);
        data[5] = 16;
        data[6] = 40;
        data[7] = 10;
        data[8] = 14;
        data[9] = 2;
        BigEndian::write_u16(&mut data[10..12], 255);
        BigEndian::write_u32(&mut data[20..24], 44100);

        let cfg = AlacSpecificConfig::parse(&data).unwrap();
        assert_eq!(cfg.frame_length, 4096);
        assert_eq!(cfg.bit_depth, 16);
        assert_eq!(cfg.num_channels, 2);
        assert_eq!(cfg.max_run, 255);
        assert_eq!(cfg.sample_rate, 44100);
    }

    #[test]
    fn test_长度错误() {
        assert!(AlacSpecificConfig::parse(&[0u8; 23]).is_err());
    }
}
