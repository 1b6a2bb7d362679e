//! 统一错误类型定义.
//!
//! 所有 Yin crate 共用的错误类型, 支持跨模块传播.
//! 容器写入库的错误在 sink 边界处转换为 [`YinError::Container`],
//! 其余模块不依赖该库的错误类型.

use thiserror::Error;

/// Yin 统一错误类型
#[derive(Debug, Error)]
pub enum YinError {
    /// 格式错误 (文件签名不符、STREAMINFO 越界、magic cookie 结构异常等)
    #[error("格式错误: {0}")]
    Format(String),

    /// 解码错误 (解码步骤失败或此前已记录解码器错误)
    #[error("解码错误: {0}")]
    Decode(String),

    /// 定位失败
    #[error("定位失败: {0}")]
    Seek(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 容器写入库报告的错误
    #[error("容器错误: {function}: {message}")]
    Container {
        /// 出错的容器操作
        function: String,
        /// 错误描述
        message: String,
    },

    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 位流读取越界
    #[error("已到达数据末尾")]
    Eof,
}

impl YinError {
    /// 底层 I/O 错误携带的平台错误码
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            Self::Io(err) => err.raw_os_error(),
            _ => None,
        }
    }
}

/// Yin 统一 Result 类型
pub type YinResult<T> = Result<T, YinError>;
