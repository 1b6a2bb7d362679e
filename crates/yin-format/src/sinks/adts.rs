//! 裸 ADTS 码流输出.
//!
//! 每个 AAC 帧前写入 7 字节 ADTS 头 (无 CRC):
//! ```text
//! syncword                 12  0xFFF
//! ID                        1  0 (MPEG-4)
//! layer                     2  0
//! protection_absent         1  1
//! profile                   2  1 (AAC-LC)
//! sampling_frequency_index  4
//! private_bit               1  0
//! channel_configuration     3
//! original/home/copyright   4  0
//! frame_length             13  负载长度 + 7
//! buffer_fullness          11  0x7FF (VBR)
//! number_of_raw_blocks      2  0
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;
use yin_codec::audio_config::SAMPLE_RATE_TABLE;
use yin_codec::{DecoderSpecificConfig, parse_aac_cookie};
use yin_core::bitwriter::BitWriter;
use yin_core::{YinError, YinResult};

use super::Sink;

/// ADTS 头长度 (无 CRC)
pub const ADTS_HEADER_SIZE: usize = 7;
/// frame_length 字段上限 (13 bits)
const MAX_FRAME_LENGTH: usize = (1 << 13) - 1;

/// 生成一个 ADTS 头
pub fn adts_header(
    sample_rate_index: u8,
    channel_config: u8,
    payload_len: usize,
) -> YinResult<[u8; ADTS_HEADER_SIZE]> {
    let frame_length = payload_len + ADTS_HEADER_SIZE;
    if frame_length > MAX_FRAME_LENGTH {
        return Err(YinError::InvalidArgument(format!(
            "AAC 帧长度超出 ADTS 限制: {}",
            frame_length
        )));
    }

    let mut bw = BitWriter::with_capacity(ADTS_HEADER_SIZE);
    bw.write_bits(0xFFF, 12);
    bw.write_bits(0, 1);
    bw.write_bits(0, 2);
    bw.write_bits(1, 1);
    bw.write_bits(1, 2);
    bw.write_bits(u32::from(sample_rate_index), 4);
    bw.write_bits(0, 1);
    bw.write_bits(u32::from(channel_config), 3);
    bw.write_bits(0, 4);
    bw.write_bits(frame_length as u32, 13);
    bw.write_bits(0x7FF, 11);
    bw.write_bits(0, 2);

    let mut header = [0u8; ADTS_HEADER_SIZE];
    header.copy_from_slice(&bw.finish());
    Ok(header)
}

/// ADTS 输出
pub struct AdtsSink<W: Write> {
    out: W,
    sample_rate_index: u8,
    channel_config: u8,
    frames_written: u64,
}

impl AdtsSink<File> {
    /// 创建 (截断) 输出文件
    pub fn create(path: impl AsRef<Path>, cookie: &[u8]) -> YinResult<Self> {
        let file = File::create(path.as_ref())?;
        debug!("已创建 ADTS 输出: {}", path.as_ref().display());
        Self::new(file, cookie)
    }
}

impl<W: Write> AdtsSink<W> {
    /// 从 magic cookie 确定采样率索引与声道配置
    pub fn new(out: W, cookie: &[u8]) -> YinResult<Self> {
        let config = DecoderSpecificConfig::parse(parse_aac_cookie(cookie)?)?;
        if usize::from(config.sampling_rate_index) >= SAMPLE_RATE_TABLE.len() {
            return Err(YinError::InvalidArgument(format!(
                "ADTS 无法表示显式采样率 {} Hz",
                config.sampling_rate
            )));
        }
        if config.channel_config > 7 {
            return Err(YinError::InvalidArgument(format!(
                "ADTS 不支持的声道配置: {}",
                config.channel_config
            )));
        }
        Ok(Self {
            out,
            sample_rate_index: config.sampling_rate_index,
            channel_config: config.channel_config,
            frames_written: 0,
        })
    }

    pub fn sample_rate_index(&self) -> u8 {
        self.sample_rate_index
    }

    pub fn channel_config(&self) -> u8 {
        self.channel_config
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn flush(&mut self) -> YinResult<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for AdtsSink<W> {
    /// 写入失败时返回携带平台错误码的 [`YinError::Io`]
    fn write_samples(&mut self, data: &[u8], _nsamples: u64) -> YinResult<()> {
        let header = adts_header(self.sample_rate_index, self.channel_config, data.len())?;
        self.out.write_all(&header)?;
        self.out.write_all(data)?;
        self.frames_written += 1;
        Ok(())
    }
}
