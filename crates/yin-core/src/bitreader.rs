//! 比特流读取游标.
//!
//! 在字节切片上维护一个显式的读取偏移, 按大端位序 (MSB first) 读取.
//! 所有读取都做边界检查, 越界时返回 [`YinError::Eof`] 而不移动偏移.
//!
//! magic cookie 的描述符遍历与 AudioSpecificConfig 的位字段解析都基于此游标.

use crate::{YinError, YinResult};

/// 比特流读取游标
///
/// # 示例
/// ```
/// use yin_core::bitreader::BitReader;
///
/// let data = [0b0001_0010, 0b0001_0000];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(5).unwrap(), 2);
/// assert_eq!(br.read_bits(4).unwrap(), 4);
/// assert_eq!(br.read_bits(4).unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 当前位偏移 (从数据开头算起)
    bit_offset: usize,
}

impl<'a> BitReader<'a> {
    /// 创建新的读取游标
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_offset: 0,
        }
    }

    /// 剩余可读位数
    pub fn bits_left(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_offset)
    }

    /// 剩余可读的完整字节数
    pub fn bytes_left(&self) -> usize {
        self.bits_left() / 8
    }

    /// 是否已到达末尾
    pub fn is_eof(&self) -> bool {
        self.bits_left() == 0
    }

    /// 读取 N 个位 (最多 32 位), 返回值的低 N 位有效
    pub fn read_bits(&mut self, n: u32) -> YinResult<u32> {
        if n > 32 {
            return Err(YinError::InvalidArgument(format!(
                "read_bits: n={} 超过 32 位",
                n,
            )));
        }
        if n as usize > self.bits_left() {
            return Err(YinError::Eof);
        }

        let mut result: u32 = 0;
        let mut remaining = n;
        while remaining > 0 {
            let byte = self.data[self.bit_offset / 8];
            let used = (self.bit_offset % 8) as u32;
            let available = 8 - used;
            let take = remaining.min(available);

            let shift = available - take;
            let mask = ((1u32 << take) - 1) as u8;
            let bits = (byte >> shift) & mask;

            result = (result << take) | u32::from(bits);
            self.bit_offset += take as usize;
            remaining -= take;
        }

        Ok(result)
    }

    /// 读取 1 个字节 (不要求字节对齐)
    pub fn read_u8(&mut self) -> YinResult<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    /// 跳过 N 个字节
    pub fn skip_bytes(&mut self, n: usize) -> YinResult<()> {
        let bits = n.checked_mul(8).ok_or(YinError::Eof)?;
        if bits > self.bits_left() {
            return Err(YinError::Eof);
        }
        self.bit_offset += bits;
        Ok(())
    }

    /// 读取 N 个原始字节, 仅在字节对齐时可用
    pub fn read_bytes(&mut self, n: usize) -> YinResult<&'a [u8]> {
        if self.bit_offset % 8 != 0 {
            return Err(YinError::InvalidArgument("read_bytes 需要字节对齐".into()));
        }
        let start = self.bit_offset / 8;
        let end = start.checked_add(n).ok_or(YinError::Eof)?;
        if end > self.data.len() {
            return Err(YinError::Eof);
        }
        self.bit_offset = end * 8;
        Ok(&self.data[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_basic() {
        let data = [0b10110001, 0b01010101];
        let mut br = BitReader::new(&data);

        assert_eq!(br.read_bits(1).unwrap(), 1);
        assert_eq!(br.read_bits(1).unwrap(), 0);
        assert_eq!(br.read_bits(2).unwrap(), 0b11);
        assert_eq!(br.read_bits(4).unwrap(), 0b0001);
        assert_eq!(br.read_bits(8).unwrap(), 0b01010101);
        assert!(br.is_eof());
    }

    #[test]
    fn test_read_bits_跨字节_24位() {
        // 5 位前缀之后紧跟 24 位显式采样率
        let data = [0b0001_0000, 0x00, 0x00, 0x00];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(4).unwrap(), 1);
        assert_eq!(br.read_bits(24).unwrap(), 0);
        assert_eq!(br.bits_left(), 4);
    }

    #[test]
    fn test_越界不移动偏移() {
        let data = [0xFF];
        let mut br = BitReader::new(&data);
        br.read_bits(6).unwrap();
        assert!(matches!(br.read_bits(3), Err(YinError::Eof)));
        assert_eq!(br.read_bits(2).unwrap(), 0b11);
    }

    #[test]
    fn test_skip_与_read_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut br = BitReader::new(&data);

        br.skip_bytes(2).unwrap();
        assert_eq!(br.read_bytes(2).unwrap(), &[0x03, 0x04]);
        assert_eq!(br.bytes_left(), 1);
        assert!(br.skip_bytes(2).is_err());
        assert!(br.read_bytes(2).is_err());
        assert_eq!(br.read_u8().unwrap(), 0x05);
    }

    #[test]
    fn test_read_bytes_需要对齐() {
        let data = [0x00, 0x00];
        let mut br = BitReader::new(&data);
        br.read_bits(3).unwrap();
        assert!(matches!(
            br.read_bytes(1),
            Err(YinError::InvalidArgument(_))
        ));
    }
}
