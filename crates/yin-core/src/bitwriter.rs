//! 比特流写入器.
//!
//! 按大端位序 (MSB first) 向字节缓冲区写入位字段, 与 [`BitReader`](crate::bitreader::BitReader) 对应.
//! ADTS 帧头等定长位结构由此合成.

/// 比特流写入器
///
/// # 示例
/// ```
/// use yin_core::bitwriter::BitWriter;
///
/// let mut bw = BitWriter::with_capacity(2);
/// bw.write_bits(0xFFF, 12);
/// bw.write_bits(0b0001, 4);
/// assert_eq!(bw.finish(), vec![0xFF, 0xF1]);
/// ```
#[derive(Debug, Default)]
pub struct BitWriter {
    /// 已完成的字节
    data: Vec<u8>,
    /// 正在填充的字节
    current_byte: u8,
    /// 当前字节中已填充的位数 (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// 创建新的比特流写入器
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定字节容量创建
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// 已写入的总位数
    pub fn bits_written(&self) -> usize {
        self.data.len() * 8 + self.bit_count as usize
    }

    /// 写入值的低 N 位 (最多 32 位), 高位在前
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32, "write_bits: n={} 超过 32 位", n);

        let mut remaining = n;
        while remaining > 0 {
            let available = 8 - u32::from(self.bit_count);
            let take = remaining.min(available);
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u32 << take) - 1)) as u8;

            // take == 8 时 bit_count 必为 0, 直接整字节赋值
            self.current_byte = if take == 8 {
                bits
            } else {
                (self.current_byte << take) | bits
            };
            self.bit_count += take as u8;
            if self.bit_count == 8 {
                self.data.push(self.current_byte);
                self.current_byte = 0;
                self.bit_count = 0;
            }
            remaining -= take;
        }
    }

    /// 用 0 填充到下一个字节边界
    pub fn align_to_byte(&mut self) {
        if self.bit_count > 0 {
            let pad = 8 - self.bit_count;
            self.data.push(self.current_byte << pad);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// 完成写入, 不足一字节的部分补 0
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.data
    }
}
