//! # yin-format
//!
//! Yin 容器格式库.
//!
//! - **输入**: [`FlacSource`] 驱动外部 FLAC 解码器, 输出 32 位高位对齐 PCM、标签与章节
//! - **输出**: [`AacMp4Sink`] / [`AlacMp4Sink`] 通过外部 MP4 写入库生成 M4A,
//!   [`AdtsSink`] 直接写出 ADTS 码流
//! - **标签**: Vorbis comment、cue sheet 与 iTunes 元数据之间的转换

pub mod convention;
pub mod mp4_writer;
pub mod sample_buffer;
pub mod sinks;
pub mod source;
pub mod sources;
pub mod tag_table;

// 重导出常用类型
pub use convention::{StandardConvention, TagConvention};
pub use mp4_writer::{FileOptions, Mp4Error, Mp4Writer, TrackId};
pub use sample_buffer::SampleBuffer;
pub use sinks::{AacMp4Sink, AdtsSink, AlacMp4Sink, Mp4SinkBase, Sink};
pub use source::SampleSource;
pub use sources::FlacSource;
