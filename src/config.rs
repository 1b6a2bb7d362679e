//! 运行配置.
//!
//! JSON 格式, 所有字段均有默认值:
//!
//! ```json
//! {
//!   "logging": { "level": "info", "directory": "logs" },
//!   "gapless": "both",
//!   "temporary_output": false
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use yin_core::GaplessMode;

use crate::logging::LoggingConfig;

/// gapless 写入方式的配置取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaplessSetting {
    #[default]
    Itunsmpb,
    Edts,
    Both,
    None,
}

impl From<GaplessSetting> for GaplessMode {
    fn from(setting: GaplessSetting) -> Self {
        match setting {
            GaplessSetting::Itunsmpb => GaplessMode::ITUNSMPB,
            GaplessSetting::Edts => GaplessMode::EDTS,
            GaplessSetting::Both => GaplessMode::ITUNSMPB | GaplessMode::EDTS,
            GaplessSetting::None => GaplessMode::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct YinConfig {
    pub logging: LoggingConfig,
    pub gapless: GaplessSetting,
    /// 输出到临时文件 (写完后由调用方改名)
    ///
    /// 作为 `AacMp4Sink::create` / `AlacMp4Sink::create` 的 `temporary` 参数传入.
    pub temporary_output: bool,
}

impl YinConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("解析配置失败")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn gapless_mode(&self) -> GaplessMode {
        self.gapless.into()
    }
}
