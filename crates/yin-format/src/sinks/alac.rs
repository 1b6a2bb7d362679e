//! ALAC → MP4 输出.

use std::path::Path;

use log::debug;
use yin_codec::magic_cookie::{ALAC_CHANNEL_LAYOUT_SIZE, ALAC_CONFIG_SIZE};
use yin_codec::{AlacSpecificConfig, parse_alac_cookie};
use yin_core::{YinError, YinResult};

use super::Sink;
use super::mp4::Mp4SinkBase;
use crate::mp4_writer::Mp4Writer;

/// ALAC MP4 输出
pub struct AlacMp4Sink<W: Mp4Writer> {
    base: Mp4SinkBase<W>,
    config: AlacSpecificConfig,
}

impl<W: Mp4Writer> AlacMp4Sink<W> {
    /// 创建文件并按 magic cookie 添加 ALAC 轨道
    ///
    /// cookie 中的配置必须为 24 字节, 声道布局存在时必须为 12 字节.
    pub fn create(
        writer: W,
        path: impl AsRef<Path>,
        cookie: &[u8],
        temporary: bool,
    ) -> YinResult<Self> {
        let mut base = Mp4SinkBase::create(writer, path, temporary)?;
        let parsed = parse_alac_cookie(cookie);

        let config: &[u8; ALAC_CONFIG_SIZE] = parsed
            .config
            .as_slice()
            .try_into()
            .map_err(|_| YinError::Format("无效的 ALACSpecificConfig".into()))?;
        let layout: Option<&[u8; ALAC_CHANNEL_LAYOUT_SIZE]> = if parsed.channel_layout.is_empty()
        {
            None
        } else {
            Some(
                parsed
                    .channel_layout
                    .as_slice()
                    .try_into()
                    .map_err(|_| YinError::Format("无效的 ALACChannelLayout".into()))?,
            )
        };

        let track = base.writer_mut().add_alac_audio_track(config, layout)?;
        base.set_track(track);

        let config = AlacSpecificConfig::parse(config)?;
        debug!(
            "ALAC 轨道: {}Hz, {} 声道, {}bit, 帧长 {}, 声道布局 {}",
            config.sample_rate,
            config.num_channels,
            config.bit_depth,
            config.frame_length,
            layout.is_some(),
        );
        Ok(Self { base, config })
    }

    pub fn base(&self) -> &Mp4SinkBase<W> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Mp4SinkBase<W> {
        &mut self.base
    }

    pub fn config(&self) -> &AlacSpecificConfig {
        &self.config
    }

    pub fn write_tags(&mut self) -> YinResult<()> {
        self.base.write_tags()
    }

    pub fn close(&mut self) -> YinResult<()> {
        self.base.close()
    }
}

impl<W: Mp4Writer> Sink for AlacMp4Sink<W> {
    fn write_samples(&mut self, data: &[u8], nsamples: u64) -> YinResult<()> {
        self.base.write_samples(data, nsamples)
    }
}
