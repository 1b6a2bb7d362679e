//! 输出端 (sink) 实现.
//!
//! - [`Mp4SinkBase`]: MP4 文件、标签、章节与关闭流程
//! - [`AacMp4Sink`]: AAC 轨道与 gapless 信息
//! - [`AlacMp4Sink`]: ALAC 轨道
//! - [`AdtsSink`]: 裸 ADTS 码流

pub mod aac;
pub mod adts;
pub mod alac;
pub mod mp4;

#[cfg(test)]
pub(crate) mod testing;

pub use aac::AacMp4Sink;
pub use adts::AdtsSink;
pub use alac::AlacMp4Sink;
pub use mp4::Mp4SinkBase;

use yin_core::YinResult;

/// 编码后数据的输出端
pub trait Sink {
    /// 写入一个编码帧, `nsamples` 为该帧解码后的采样帧数
    fn write_samples(&mut self, data: &[u8], nsamples: u64) -> YinResult<()>;
}
