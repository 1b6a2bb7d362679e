//! 编码器 magic cookie 解析.
//!
//! AAC 的 magic cookie 就是一个 esds 描述符序列:
//! ```text
//! ES_Descriptor            (tag=0x03)  ES_ID(16) + flags(8), 标志全 0 时无可选字段
//! DecoderConfigDescriptor  (tag=0x04)  objectType(8) + streamType(6) + upStream(1)
//!                                      + reserved(1) + bufferSizeDB(24)
//!                                      + maxBitrate(32) + avgBitrate(32)
//! DecoderSpecificInfo      (tag=0x05)  AudioSpecificConfig
//! ```
//! 只提取 DecoderSpecificInfo, 其余字段由容器写入库根据实际数据重新计算.
//!
//! ALAC 的 magic cookie 可能带 24 字节的 `frma`/`alac` 包装头,
//! 之后是 24 字节 ALACSpecificConfig 与可选的 `chan` atom.

use bytes::Bytes;
use log::trace;
use yin_core::bitreader::BitReader;
use yin_core::{YinError, YinResult};

/// ES_Descriptor 标签
const TAG_ES_DESCRIPTOR: u8 = 0x03;
/// DecoderConfigDescriptor 标签
const TAG_DECODER_CONFIG: u8 = 0x04;
/// DecoderSpecificInfo 标签
const TAG_DECODER_SPECIFIC_INFO: u8 = 0x05;

/// ES_Descriptor 固定头部: ES_ID(2) + flags(1)
const ES_DESCRIPTOR_FIXED: usize = 3;
/// DecoderConfigDescriptor 固定头部
const DECODER_CONFIG_FIXED: usize = 13;

/// ALACSpecificConfig 长度
pub const ALAC_CONFIG_SIZE: usize = 24;
/// ALACChannelLayout 长度
pub const ALAC_CHANNEL_LAYOUT_SIZE: usize = 12;
/// 包装头 / chan atom 的最小长度
const ALAC_ATOM_HEADER_SIZE: usize = 24;

/// 读取描述符头部: tag + 可变长度
///
/// 长度每字节低 7 位有效, 最高位为续标志.
/// 数据在头部中途结束时返回 `None`.
fn read_descriptor_header(br: &mut BitReader<'_>) -> Option<(u8, usize)> {
    let tag = br.read_u8().ok()?;
    let mut size = 0usize;
    loop {
        let b = br.read_u8().ok()?;
        size = (size << 7) | usize::from(b & 0x7F);
        if b & 0x80 == 0 {
            return Some((tag, size));
        }
    }
}

/// 从 AAC magic cookie 中提取 DecoderSpecificInfo
pub fn parse_aac_cookie(cookie: &[u8]) -> YinResult<Bytes> {
    let mut br = BitReader::new(cookie);

    while let Some((tag, size)) = read_descriptor_header(&mut br) {
        trace!("esds 描述符: tag=0x{:02X}, size={}", tag, size);
        let skipped = match tag {
            // 只跳过固定部分, 子描述符紧随其后
            TAG_ES_DESCRIPTOR => br.skip_bytes(ES_DESCRIPTOR_FIXED),
            TAG_DECODER_CONFIG => br.skip_bytes(DECODER_CONFIG_FIXED),
            TAG_DECODER_SPECIFIC_INFO => {
                let payload = br.read_bytes(size).map_err(|_| {
                    YinError::Format(format!(
                        "DecoderSpecificInfo 长度越界: 声明 {} 字节, 剩余 {} 字节",
                        size,
                        br.bytes_left(),
                    ))
                })?;
                return Ok(Bytes::copy_from_slice(payload));
            }
            _ => br.skip_bytes(size),
        };
        if skipped.is_err() {
            break;
        }
    }

    Err(YinError::Format(
        "magic cookie 中缺少 DecoderSpecificInfo 描述符".into(),
    ))
}

/// ALAC magic cookie 解析结果
///
/// 数据不足时对应字段为空, 长度校验由调用方完成.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlacMagicCookie {
    /// ALACSpecificConfig (有效时为 24 字节)
    pub config: Vec<u8>,
    /// ALACChannelLayout (存在时为 12 字节)
    pub channel_layout: Vec<u8>,
}

/// 解析 ALAC magic cookie
pub fn parse_alac_cookie(cookie: &[u8]) -> AlacMagicCookie {
    let mut rest = cookie;
    if rest.len() >= 12 && &rest[4..12] == b"frmaalac" {
        rest = rest.get(ALAC_ATOM_HEADER_SIZE..).unwrap_or(&[]);
    }

    let mut parsed = AlacMagicCookie::default();
    if rest.len() < ALAC_CONFIG_SIZE {
        return parsed;
    }
    parsed.config = rest[..ALAC_CONFIG_SIZE].to_vec();
    rest = &rest[ALAC_CONFIG_SIZE..];

    if rest.len() >= ALAC_ATOM_HEADER_SIZE && &rest[4..8] == b"chan" {
        parsed.channel_layout = rest[12..12 + ALAC_CHANNEL_LAYOUT_SIZE].to_vec();
    }
    parsed
}
