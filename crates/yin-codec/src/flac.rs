//! FLAC 流解码器接口.
//!
//! 流解码器本身 (帧同步、子帧、Rice 解码等) 由外部库提供, 这里只定义调用约定:
//! 解码器在 `process_*` / `seek_absolute` 期间回调 [`FlacDecoderCallbacks`],
//! 由回调方提供字节数据并接收元数据块与解码后的音频块.
//!
//! STREAMINFO 块 (34 bytes):
//! ```text
//! min_block_size:  16 bits
//! max_block_size:  16 bits
//! min_frame_size:  24 bits
//! max_frame_size:  24 bits
//! sample_rate:     20 bits
//! channels:        3 bits  (channels - 1)
//! bits_per_sample: 5 bits  (bits - 1)
//! total_samples:   36 bits
//! md5:             128 bits
//! ```

use byteorder::{ByteOrder, LittleEndian};
use yin_core::bitreader::BitReader;
use yin_core::{AudioFormat, YinError, YinResult};

/// STREAMINFO 块长度
pub const STREAM_INFO_SIZE: usize = 34;

/// FLAC 码流的外层封装
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlacContainer {
    /// 原生 `fLaC` 文件
    Native,
    /// Ogg FLAC
    Ogg,
}

/// FLAC 元数据块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MetadataType {
    StreamInfo = 0,
    Padding = 1,
    Application = 2,
    SeekTable = 3,
    VorbisComment = 4,
    CueSheet = 5,
    Picture = 6,
}


/// FLAC STREAMINFO
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamInfo {
    pub min_block_size: u16,
    pub max_block_size: u16,
    pub min_frame_size: u32,
    pub max_frame_size: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
    /// 总采样帧数, 0 表示未知
    pub total_samples: u64,
    pub md5: [u8; 16],
}

impl StreamInfo {
    /// 解析 34 字节 STREAMINFO 块
    pub fn parse(data: &[u8]) -> YinResult<Self> {
        if data.len() < STREAM_INFO_SIZE {
            return Err(YinError::Format(format!(
                "STREAMINFO 块大小不足: {} < {}",
                data.len(),
                STREAM_INFO_SIZE,
            )));
        }

        let mut br = BitReader::new(data);
        let mut info = StreamInfo {
            min_block_size: br.read_bits(16)? as u16,
            max_block_size: br.read_bits(16)? as u16,
            min_frame_size: br.read_bits(24)?,
            max_frame_size: br.read_bits(24)?,
            sample_rate: br.read_bits(20)?,
            channels: br.read_bits(3)? + 1,
            bits_per_sample: br.read_bits(5)? + 1,
            ..Default::default()
        };
        let total_hi = u64::from(br.read_bits(4)?);
        let total_lo = u64::from(br.read_bits(32)?);
        info.total_samples = (total_hi << 32) | total_lo;
        info.md5.copy_from_slice(br.read_bytes(16)?);
        Ok(info)
    }

    /// 检查参数是否在可接受范围内
    ///
    /// 采样率 > 0, 声道 1..=8, 位深 8..=32.
    pub fn validate(&self) -> YinResult<()> {
        if self.sample_rate == 0
            || !(1..=8).contains(&self.channels)
            || !(8..=32).contains(&self.bits_per_sample)
        {
            return Err(YinError::Format(format!(
                "不支持的 FLAC 参数: {}Hz {}ch {}bit",
                self.sample_rate, self.channels, self.bits_per_sample,
            )));
        }
        Ok(())
    }

    /// 对应的 32 位高位对齐输出格式
    pub fn audio_format(&self) -> AudioFormat {
        AudioFormat::aligned_high_s32(self.sample_rate, self.channels, self.bits_per_sample)
    }
}

/// VORBIS_COMMENT 块
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VorbisComment {
    pub vendor: Vec<u8>,
    /// 原始 `KEY=value` 条目 (UTF-8, 不保证合法)
    pub comments: Vec<Vec<u8>>,
}

impl VorbisComment {
    /// 解析 VORBIS_COMMENT 块 (长度字段为小端)
    pub fn parse(data: &[u8]) -> YinResult<Self> {
        let mut pos = 0usize;
        let vendor_len = LittleEndian::read_u32(take(data, &mut pos, 4)?) as usize;
        let vendor = take(data, &mut pos, vendor_len)?.to_vec();
        let count = LittleEndian::read_u32(take(data, &mut pos, 4)?) as usize;
        let mut comments = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let len = LittleEndian::read_u32(take(data, &mut pos, 4)?) as usize;
            comments.push(take(data, &mut pos, len)?.to_vec());
        }
        Ok(Self { vendor, comments })
    }
}

/// 从 `pos` 处取出 `len` 字节并前移
fn take<'a>(data: &'a [u8], pos: &mut usize, len: usize) -> YinResult<&'a [u8]> {
    let end = pos
        .checked_add(len)
        .filter(|&e| e <= data.len())
        .ok_or_else(|| YinError::Format("VORBIS_COMMENT 块被截断".into()))?;
    let slice = &data[*pos..end];
    *pos = end;
    Ok(slice)
}

/// 交给回调的元数据块
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataBlock {
    StreamInfo(StreamInfo),
    VorbisComment(VorbisComment),
    /// 其他类型, 回调方不关心内容
    Other(MetadataType),
}

/// 解码后音频块的帧头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// 每声道采样数
    pub blocksize: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
    /// 块内第一个采样的序号
    pub sample_number: u64,
}

/// 读回调结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// 读到了 N 字节
    Continue(usize),
    EndOfStream,
    Abort,
}

/// 写回调结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Continue,
    /// 中止解码, 当前 `process_*` 调用失败
    Abort,
}

/// seek / tell / length 回调失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackError {
    Error,
    Unsupported,
}

/// 解码器报告的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    LostSync,
    BadHeader,
    FrameCrcMismatch,
    UnparseableStream,
}

/// 解码器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Uninitialized,
    SearchForMetadata,
    ReadMetadata,
    SearchForFrameSync,
    ReadFrame,
    EndOfStream,
    OggError,
    SeekError,
    Aborted,
}

/// 解码器回调
///
/// 由持有输入文件的一方实现. 解码器只在 `FlacStreamDecoder` 的方法执行期间调用它们.
pub trait FlacDecoderCallbacks {
    /// 读取字节到 `buf`
    fn read(&mut self, buf: &mut [u8]) -> ReadStatus;
    /// 定位到绝对字节偏移
    fn seek(&mut self, offset: u64) -> Result<(), CallbackError>;
    /// 当前字节偏移
    fn tell(&mut self) -> Result<u64, CallbackError>;
    /// 输入总字节数
    fn length(&mut self) -> Result<u64, CallbackError>;
    /// 输入是否已结束
    fn eof(&mut self) -> bool;
    /// 接收一个解码后的音频块, `channels[c][i]` 为低位对齐的采样值
    fn write(&mut self, header: &FrameHeader, channels: &[&[i32]]) -> WriteStatus;
    /// 接收一个元数据块
    fn metadata(&mut self, block: &MetadataBlock);
    /// 解码器遇到错误
    fn error(&mut self, status: ErrorStatus);
}

/// FLAC 流解码器
pub trait FlacStreamDecoder {
    /// 要求解码器把指定类型的元数据块交给 `metadata` 回调
    ///
    /// STREAMINFO 总是会被回调.
    fn set_metadata_respond(&mut self, kind: MetadataType) -> YinResult<()>;

    /// 按封装类型初始化
    fn init(&mut self, container: FlacContainer) -> YinResult<()>;

    /// 处理全部元数据块
    fn process_until_end_of_metadata(
        &mut self,
        callbacks: &mut dyn FlacDecoderCallbacks,
    ) -> YinResult<()>;

    /// 处理一个单元 (一个元数据块或一个音频帧)
    fn process_single(&mut self, callbacks: &mut dyn FlacDecoderCallbacks) -> YinResult<()>;

    /// 定位到绝对采样位置, 目标之后的采样通过 `write` 回调交付
    fn seek_absolute(
        &mut self,
        sample: u64,
        callbacks: &mut dyn FlacDecoderCallbacks,
    ) -> YinResult<()>;

    fn state(&self) -> DecoderState;
}
