//! 采样源 (SampleSource) trait 定义.
//!
//! 解码后的 PCM 以交错、高位对齐的 32 位整数交付, 同时携带标签与章节.

use yin_core::{AudioFormat, Chapter, TagSet, YinResult};

/// 采样源 trait
///
/// 使用流程:
/// 1. 打开源 (由具体实现提供构造函数)
/// 2. 通过 `format()` 获取输出格式
/// 3. 循环调用 `read_samples()` 直到返回 0
pub trait SampleSource {
    /// 输出格式
    fn format(&self) -> &AudioFormat;

    /// 读取最多 `nframes` 帧到 `buf` (交错), 返回实际帧数, 0 表示结束
    ///
    /// `buf` 至少需要 `nframes * channels` 个元素.
    fn read_samples(&mut self, buf: &mut [i32], nframes: usize) -> YinResult<usize>;

    /// 定位到绝对帧位置
    fn seek(&mut self, frame: u64) -> YinResult<()>;

    /// 已读取的帧数
    fn samples_read(&self) -> u64;

    /// 总帧数, 0 表示未知
    fn duration(&self) -> u64;

    /// 源携带的标签
    fn tags(&self) -> &TagSet;

    /// 源携带的章节
    fn chapters(&self) -> &[Chapter];
}
