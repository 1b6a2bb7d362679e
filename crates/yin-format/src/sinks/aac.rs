//! AAC → MP4 输出.
//!
//! 轨道参数来自编码器给出的 esds magic cookie. 关闭前按 [`GaplessMode`]
//! 写入 `iTunSMPB` 标签和/或 edit list.

use std::path::Path;

use log::debug;
use yin_codec::{DecoderSpecificConfig, parse_aac_cookie};
use yin_core::gapless::ITUNSMPB_TAG;
use yin_core::{FourCc, GaplessMode, YinResult};

use super::Sink;
use super::mp4::Mp4SinkBase;
use crate::mp4_writer::{MPEG4_AUDIO_TYPE, Mp4Writer};

/// 每个 AAC 帧的采样数
pub const AAC_FRAME_SIZE: u32 = 1024;

/// HE-AAC 编码器的格式代码, 其 sample entry 使用上采样后的时间刻度
pub const HE_AAC_FORMAT: FourCc = FourCc(*b"aach");

/// AAC MP4 输出
pub struct AacMp4Sink<W: Mp4Writer> {
    base: Mp4SinkBase<W>,
    config: DecoderSpecificConfig,
    gapless_mode: GaplessMode,
}

impl<W: Mp4Writer> AacMp4Sink<W> {
    /// 创建文件并按 magic cookie 配置音频轨道
    ///
    /// `format` 为编码器的输出格式代码, 例如 `aac ` 或 `aach`.
    pub fn create(
        writer: W,
        path: impl AsRef<Path>,
        cookie: &[u8],
        format: FourCc,
        temporary: bool,
    ) -> YinResult<Self> {
        let mut base = Mp4SinkBase::create(writer, path, temporary)?;
        let config = DecoderSpecificConfig::parse(parse_aac_cookie(cookie)?)?;
        let rate = config.sampling_rate;

        let writer = base.writer_mut();
        writer.set_timescale(rate)?;
        let track = writer.add_audio_track(rate, AAC_FRAME_SIZE, MPEG4_AUDIO_TYPE)?;
        // AudioSampleEntry 的 ChannelCount 只能是 1 或 2
        let channels = if config.channel_config == 1 { 1 } else { 2 };
        writer.set_audio_channels(track, channels)?;
        if format == HE_AAC_FORMAT {
            writer.set_sample_entry_timescale(track, u64::from(rate) << 17)?;
        }
        writer.set_es_configuration(track, &config.raw)?;
        base.set_track(track);

        debug!(
            "AAC 轨道: {}Hz, 声道配置 {}, object type {}",
            rate, config.channel_config, config.object_type
        );
        Ok(Self {
            base,
            config,
            gapless_mode: GaplessMode::default(),
        })
    }

    pub fn base(&self) -> &Mp4SinkBase<W> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Mp4SinkBase<W> {
        &mut self.base
    }

    pub fn config(&self) -> &DecoderSpecificConfig {
        &self.config
    }

    pub fn gapless_mode(&self) -> GaplessMode {
        self.gapless_mode
    }

    pub fn set_gapless_mode(&mut self, mode: GaplessMode) {
        self.gapless_mode = mode;
    }

    /// 写入 gapless 信息后写入章节与标签
    pub fn write_tags(&mut self) -> YinResult<()> {
        let track = self.base.require_track()?;
        let nframes = self.base.writer().track_sample_count(track)?;
        if nframes > 0 {
            let duration = self.base.writer().track_duration(track)?;
            let info = self.base.gapless_info();
            if self.gapless_mode.contains(GaplessMode::ITUNSMPB) {
                let value = info.itunsmpb_value(duration);
                debug!("{}:{}", ITUNSMPB_TAG, value);
                self.base.tags_mut().insert(ITUNSMPB_TAG, value);
            }
            if self.gapless_mode.contains(GaplessMode::EDTS) {
                let writer = self.base.writer_mut();
                writer.add_track_edit(track, info.edit_start, info.edit_duration)?;
                writer.create_audio_sample_group_description(track, nframes)?;
            }
        }
        self.base.write_tags()
    }

    pub fn close(&mut self) -> YinResult<()> {
        self.base.close()
    }
}

impl<W: Mp4Writer> Sink for AacMp4Sink<W> {
    fn write_samples(&mut self, data: &[u8], nsamples: u64) -> YinResult<()> {
        self.base.write_samples(data, nsamples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4_writer::ITUNES_NAMESPACE;
    use crate::sinks::testing::{Call, RecordingWriter};
    use yin_core::{GaplessInfo, YinError};

    /// esds: ES_Descriptor(3) → DecoderConfig(4) → DecoderSpecificInfo(5)
    fn cookie(config: &[u8]) -> Vec<u8> {
        let mut data = vec![0x03, 0x19, 0x00, 0x00, 0x00];
        data.push(0x04);
        data.push(0x11);
        data.extend_from_slice(&[0x40, 0x15, 0, 0x18, 0, 0, 0x01, 0xF4, 0, 0, 0x01, 0xF4, 0]);
        data.push(0x05);
        data.push(config.len() as u8);
        data.extend_from_slice(config);
        data.extend_from_slice(&[0x06, 0x01, 0x02]);
        data
    }

    fn create(config: &[u8], format: &[u8; 4]) -> AacMp4Sink<RecordingWriter> {
        AacMp4Sink::create(
            RecordingWriter::default(),
            "out.m4a",
            &cookie(config),
            FourCc(*format),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_轨道配置() {
        let sink = create(&[0x12, 0x10], b"aac ");
        let calls = &sink.base().writer().calls;
        assert_eq!(calls[1], Call::SetTimescale(44100));
        assert_eq!(calls[2], Call::AddAudioTrack(44100, 1024, 0x40));
        assert_eq!(calls[3], Call::AudioChannels(1, 2));
        assert_eq!(calls[4], Call::EsConfiguration(1, vec![0x12, 0x10]));
        assert_eq!(sink.config().sampling_rate_index, 4);
    }

    #[test]
    fn test_单声道与多声道() {
        // 48000 Hz, 声道配置 1
        let sink = create(&[0x11, 0x88], b"aac ");
        assert!(sink.base().writer().calls.contains(&Call::AudioChannels(1, 1)));
        // 48000 Hz, 声道配置 6 → 2
        let sink = create(&[0x11, 0xB0], b"aac ");
        assert_eq!(sink.config().channel_config, 6);
        assert!(sink.base().writer().calls.contains(&Call::AudioChannels(1, 2)));
    }

    #[test]
    fn test_he_aac_上采样时间刻度() {
        let sink = create(&[0x13, 0x90], b"aach");
        assert!(
            sink.base()
                .writer()
                .calls
                .contains(&Call::SampleEntryTimescale(1, 22050u64 << 17))
        );
    }

    #[test]
    fn test_缺少配置描述符() {
        let result = AacMp4Sink::create(
            RecordingWriter::default(),
            "out.m4a",
            &[0x06, 0x01, 0x02],
            FourCc(*b"aac "),
            false,
        );
        assert!(matches!(result, Err(YinError::Format(_))));
    }

    fn write_frames(sink: &mut AacMp4Sink<RecordingWriter>, total: u64) {
        let mut left = total;
        while left > 0 {
            let n = left.min(1024);
            sink.write_samples(&[0u8; 16], n).unwrap();
            left -= n;
        }
    }

    #[test]
    fn test_gapless_itunsmpb() {
        let mut sink = create(&[0x12, 0x10], b"aac ");
        write_frames(&mut sink, 180000);
        sink.base_mut().set_gapless_info(GaplessInfo::new(2112, 176400));
        sink.write_tags().unwrap();

        let expected = GaplessInfo::new(2112, 176400).itunsmpb_value(180000);
        assert!(expected.contains("000005D0"));
        assert!(sink.base().writer().metadata_calls().contains(&Call::FreeForm(
            ITUNSMPB_TAG.into(),
            ITUNES_NAMESPACE.into(),
            expected.into_bytes()
        )));
        assert!(
            !sink
                .base()
                .writer()
                .calls
                .iter()
                .any(|c| matches!(c, Call::Edit(..)))
        );
    }

    #[test]
    fn test_gapless_edts() {
        let mut sink = create(&[0x12, 0x10], b"aac ");
        sink.set_gapless_mode(GaplessMode::EDTS);
        write_frames(&mut sink, 4096);
        sink.base_mut().set_gapless_info(GaplessInfo::new(2112, 1000));
        sink.write_tags().unwrap();

        let calls = &sink.base().writer().calls;
        assert!(calls.contains(&Call::Edit(1, 2112, 1000)));
        assert!(calls.contains(&Call::SampleGroup(1, 4)));
        assert!(sink.base().tags().is_empty());
    }

    #[test]
    fn test_gapless_两种方式() {
        let mut sink = create(&[0x12, 0x10], b"aac ");
        sink.set_gapless_mode(GaplessMode::all());
        write_frames(&mut sink, 2048);
        sink.write_tags().unwrap();
        assert!(sink.base().writer().calls.iter().any(|c| matches!(c, Call::Edit(..))));
        assert!(sink.base().tags().get(&ITUNSMPB_TAG.into()).is_some());
    }

    #[test]
    fn test_无采样时不写_gapless() {
        let mut sink = create(&[0x12, 0x10], b"aac ");
        sink.set_gapless_mode(GaplessMode::all());
        sink.write_tags().unwrap();
        assert!(sink.base().tags().is_empty());
        assert!(!sink.base().writer().calls.iter().any(|c| matches!(c, Call::Edit(..))));
    }
}
