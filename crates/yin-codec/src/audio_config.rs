//! MPEG-4 AudioSpecificConfig (DecoderSpecificInfo) 解析.
//!
//! ```text
//! audioObjectType         5 bits  (31 不展开, 原值保留)
//! samplingFrequencyIndex  4 bits  (15 表示后跟 24 bits 显式采样率)
//! channelConfiguration    4 bits
//! ```

use bytes::Bytes;
use yin_core::bitreader::BitReader;
use yin_core::{YinError, YinResult};

/// 采样率索引对应的采样率 (Hz), 索引 13/14 保留
pub const SAMPLE_RATE_TABLE: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// 显式采样率的转义索引
const EXPLICIT_RATE_INDEX: u8 = 15;

/// 解析后的 DecoderSpecificConfig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderSpecificConfig {
    /// audioObjectType (2 = AAC-LC, 5 = SBR, 29 = PS ...)
    pub object_type: u8,
    /// 采样率索引
    pub sampling_rate_index: u8,
    /// 采样率 (Hz)
    pub sampling_rate: u32,
    /// 声道配置
    pub channel_config: u8,
    /// 原始配置字节, 原样写入轨道
    pub raw: Bytes,
}

impl DecoderSpecificConfig {
    /// 从 DecoderSpecificInfo 字节解析
    pub fn parse(raw: Bytes) -> YinResult<Self> {
        let mut br = BitReader::new(&raw);
        let truncated = |_| YinError::Format("DecoderSpecificConfig 数据不足".into());

        let object_type = br.read_bits(5).map_err(truncated)? as u8;

        let sampling_rate_index = br.read_bits(4).map_err(truncated)? as u8;
        let sampling_rate = if sampling_rate_index == EXPLICIT_RATE_INDEX {
            br.read_bits(24).map_err(truncated)?
        } else {
            *SAMPLE_RATE_TABLE
                .get(usize::from(sampling_rate_index))
                .ok_or_else(|| {
                    YinError::Format(format!("保留的采样率索引: {}", sampling_rate_index))
                })?
        };

        let channel_config = br.read_bits(4).map_err(truncated)? as u8;

        Ok(Self {
            object_type,
            sampling_rate_index,
            sampling_rate,
            channel_config,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yin_core::bitwriter::BitWriter;

    fn build(object_type: u32, index: u32, explicit: Option<u32>, channels: u32) -> Bytes {
        let mut bw = BitWriter::new();
        bw.write_bits(object_type, 5);
        bw.write_bits(index, 4);
        if let Some(rate) = explicit {
            bw.write_bits(rate, 24);
        }
        bw.write_bits(channels, 4);
        Bytes::from(bw.finish())
    }

    #[test]
    fn test_aac_lc_44100_立体声() {
        // 0x12 0x10: AAC-LC, 44100 Hz, 2 声道
        let cfg = DecoderSpecificConfig::parse(Bytes::from_static(&[0x12, 0x10])).unwrap();
        assert_eq!(cfg.object_type, 2);
        assert_eq!(cfg.sampling_rate_index, 4);
        assert_eq!(cfg.sampling_rate, 44100);
        assert_eq!(cfg.channel_config, 2);
        assert_eq!(&cfg.raw[..], &[0x12, 0x10]);
    }

    #[test]
    fn test_显式采样率() {
        let cfg = DecoderSpecificConfig::parse(build(2, 15, Some(44056), 1)).unwrap();
        assert_eq!(cfg.sampling_rate_index, 15);
        assert_eq!(cfg.sampling_rate, 44056);
        assert_eq!(cfg.channel_config, 1);
    }

    #[test]
    fn test_object_type_31_不展开() {
        // 31 | 索引 4 | 2 声道, 索引紧跟 5 位 object type
        let cfg = DecoderSpecificConfig::parse(Bytes::from_static(&[0xFA, 0x10])).unwrap();
        assert_eq!(cfg.object_type, 31);
        assert_eq!(cfg.sampling_rate_index, 4);
        assert_eq!(cfg.sampling_rate, 44100);
        assert_eq!(cfg.channel_config, 2);
    }

    #[test]
    fn test_保留索引() {
        assert!(matches!(
            DecoderSpecificConfig::parse(build(2, 13, None, 2)),
            Err(YinError::Format(_))
        ));
    }

    #[test]
    fn test_数据不足() {
        assert!(matches!(
            DecoderSpecificConfig::parse(Bytes::from_static(&[0x12])),
            Err(YinError::Format(_))
        ));
    }
}
