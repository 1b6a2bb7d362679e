//! MP4 容器写入库接口.
//!
//! box 级别的写入 (moov/trak/stbl/udta 等) 由外部库完成, 这里只定义 sink 需要的操作.
//! 库报告的错误类型 [`Mp4Error`] 只在 sink 边界出现, 随即转换为
//! [`YinError::Container`].

use std::path::Path;

use thiserror::Error;
use yin_core::{FourCc, YinError};

/// 轨道 ID
pub type TrackId = u32;

/// MPEG-4 音频的 objectTypeIndication
pub const MPEG4_AUDIO_TYPE: u8 = 0x40;

/// free-form 元数据的命名空间
pub const ITUNES_NAMESPACE: &str = "com.apple.iTunes";

/// 容器写入库报告的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{function}: {message}")]
pub struct Mp4Error {
    /// 出错的库函数
    pub function: String,
    pub message: String,
}

impl Mp4Error {
    pub fn new(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            message: message.into(),
        }
    }
}

impl From<Mp4Error> for YinError {
    fn from(err: Mp4Error) -> Self {
        YinError::Container {
            function: err.function,
            message: err.message,
        }
    }
}

pub type Mp4Result<T> = Result<T, Mp4Error>;

/// 文件创建参数 (ftyp)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    pub major_brand: FourCc,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCc>,
    /// 写入临时文件, 完成后由调用方重新封装
    pub temporary: bool,
}

impl FileOptions {
    /// M4A 音频文件: `M4A ` / 0 / [`M4A `, `mp42`, `isom`]
    pub fn m4a(temporary: bool) -> Self {
        Self {
            major_brand: FourCc(*b"M4A "),
            minor_version: 0,
            compatible_brands: vec![FourCc(*b"M4A "), FourCc(*b"mp42"), FourCc(*b"isom")],
            temporary,
        }
    }
}

/// MP4 容器写入器
///
/// 所有方法失败时返回 [`Mp4Error`]. 同一实例只由一个 sink 独占使用.
pub trait Mp4Writer {
    /// 创建输出文件
    fn create(&mut self, path: &Path, options: &FileOptions) -> Mp4Result<()>;

    /// 影片时间刻度 (moov.mvhd.timeScale)
    fn timescale(&self) -> Mp4Result<u32>;

    fn set_timescale(&mut self, timescale: u32) -> Mp4Result<()>;

    /// 添加 MPEG-4 音频轨道 (`mp4a`)
    fn add_audio_track(
        &mut self,
        timescale: u32,
        sample_duration: u32,
        audio_type: u8,
    ) -> Mp4Result<TrackId>;

    /// 添加 ALAC 音频轨道 (`alac`, 可选 `chan`)
    fn add_alac_audio_track(
        &mut self,
        config: &[u8; 24],
        channel_layout: Option<&[u8; 12]>,
    ) -> Mp4Result<TrackId>;

    /// sample entry 中的声道数
    fn set_audio_channels(&mut self, track: TrackId, channels: u32) -> Mp4Result<()>;

    /// sample entry 中的时间刻度
    fn set_sample_entry_timescale(&mut self, track: TrackId, timescale: u64) -> Mp4Result<()>;

    /// 写入 DecoderSpecificInfo
    fn set_es_configuration(&mut self, track: TrackId, config: &[u8]) -> Mp4Result<()>;

    /// 追加一个采样, `duration` 以轨道时间刻度计
    fn write_sample(&mut self, track: TrackId, data: &[u8], duration: u64) -> Mp4Result<()>;

    fn track_sample_count(&self, track: TrackId) -> Mp4Result<u32>;

    /// 轨道媒体时长 (轨道时间刻度)
    fn track_duration(&self, track: TrackId) -> Mp4Result<u64>;

    /// 添加 edit list 条目
    fn add_track_edit(&mut self, track: TrackId, media_start: u64, duration: u64)
    -> Mp4Result<()>;

    /// 为全部采样创建音频采样分组描述 (`sgpd`/`sbgp` roll)
    fn create_audio_sample_group_description(
        &mut self,
        track: TrackId,
        sample_count: u32,
    ) -> Mp4Result<()>;

    /// 添加 QuickTime 章节文本轨道, 引用 `reference` 轨道
    fn add_chapter_text_track(&mut self, reference: TrackId) -> Mp4Result<TrackId>;

    /// QuickTime 章节 (基于时长, 影片时间刻度)
    fn add_chapter(&mut self, chapter_track: TrackId, duration: u64, title: &str)
    -> Mp4Result<()>;

    /// Nero 章节 (基于起始时间, 100ns 单位)
    fn add_nero_chapter(&mut self, start: u64, title: &str) -> Mp4Result<()>;

    fn set_metadata_string(&mut self, code: FourCc, value: &str) -> Mp4Result<()>;
    fn set_metadata_u8(&mut self, code: FourCc, value: u8) -> Mp4Result<()>;
    fn set_metadata_u16(&mut self, code: FourCc, value: u16) -> Mp4Result<()>;
    fn set_metadata_u32(&mut self, code: FourCc, value: u32) -> Mp4Result<()>;
    fn set_metadata_u64(&mut self, code: FourCc, value: u64) -> Mp4Result<()>;

    /// free-form (`----`) 元数据
    fn set_metadata_freeform(&mut self, name: &str, namespace: &str, value: &[u8])
    -> Mp4Result<()>;

    /// 追加一张封面
    fn set_metadata_artwork(&mut self, code: FourCc, data: &[u8]) -> Mp4Result<()>;

    /// ID3 流派编号 (从 1 开始)
    fn set_metadata_genre(&mut self, code: FourCc, genre: u16) -> Mp4Result<()>;

    fn set_metadata_track(&mut self, number: u16, total: u16) -> Mp4Result<()>;
    fn set_metadata_disk(&mut self, number: u16, total: u16) -> Mp4Result<()>;

    /// 完成写入并关闭文件
    fn close(&mut self) -> Mp4Result<()>;
}
