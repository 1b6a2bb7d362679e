//! 交错采样缓冲.
//!
//! 解码器写回调整块写入 (先 `reserve` 再 `commit`), 读取方按 FIFO 顺序取出.
//! 单线程使用, 写入与读取不会交错进行.
//!
//! 不变量: `read_pos <= end <= capacity` (以采样帧计).

/// 32 位交错采样缓冲
#[derive(Debug, Default)]
pub struct SampleBuffer {
    /// 交错采样数据
    data: Vec<i32>,
    /// 声道数
    channels: usize,
    /// 读取位置 (帧)
    read_pos: usize,
    /// 已提交的帧数
    end: usize,
}

impl SampleBuffer {
    pub fn new(channels: usize) -> Self {
        Self {
            data: Vec::new(),
            channels,
            read_pos: 0,
            end: 0,
        }
    }

    /// 设置声道数, 丢弃已缓冲的数据
    pub fn set_channels(&mut self, channels: usize) {
        self.channels = channels;
        self.clear();
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// 可读取的帧数
    pub fn count(&self) -> usize {
        self.end - self.read_pos
    }

    /// 容量 (帧)
    pub fn capacity(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.data.len() / self.channels
        }
    }

    /// 丢弃所有数据
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.end = 0;
    }

    /// 为 `frames` 帧预留写入空间, 返回待填充的切片
    ///
    /// 未读数据会被移到缓冲区开头. 写入完成后必须调用 [`commit`](Self::commit).
    pub fn reserve(&mut self, frames: usize) -> &mut [i32] {
        let ch = self.channels;
        if self.read_pos > 0 {
            self.data.copy_within(self.read_pos * ch..self.end * ch, 0);
            self.end -= self.read_pos;
            self.read_pos = 0;
        }
        let needed = (self.end + frames) * ch;
        if self.data.len() < needed {
            self.data.resize(needed, 0);
        }
        &mut self.data[self.end * ch..needed]
    }

    /// 提交通过 `reserve` 写入的帧
    pub fn commit(&mut self, frames: usize) {
        debug_assert!(self.end + frames <= self.capacity());
        self.end = (self.end + frames).min(self.capacity());
    }

    /// 可读取的交错数据
    pub fn readable(&self) -> &[i32] {
        &self.data[self.read_pos * self.channels..self.end * self.channels]
    }

    /// 标记 `frames` 帧已读取
    pub fn advance(&mut self, frames: usize) {
        self.read_pos = (self.read_pos + frames).min(self.end);
        if self.read_pos == self.end {
            self.clear();
        }
    }

    /// 取出最多 `frames` 帧到 `out`, 返回实际帧数
    ///
    /// 同时受 `out` 能容纳的整帧数限制.
    pub fn drain_into(&mut self, out: &mut [i32], frames: usize) -> usize {
        let fits = out.len().checked_div(self.channels).unwrap_or(0);
        let n = frames.min(self.count()).min(fits);
        let len = n * self.channels;
        out[..len].copy_from_slice(&self.readable()[..len]);
        self.advance(n);
        n
    }
}
