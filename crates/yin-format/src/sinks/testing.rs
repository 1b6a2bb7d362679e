//! 记录调用的 [`Mp4Writer`], 供 sink 单元测试使用.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use yin_core::FourCc;

use crate::mp4_writer::{FileOptions, Mp4Error, Mp4Result, Mp4Writer, TrackId};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(PathBuf, FileOptions),
    SetTimescale(u32),
    AddAudioTrack(u32, u32, u8),
    AddAlacTrack(Vec<u8>, Option<Vec<u8>>),
    AudioChannels(TrackId, u32),
    SampleEntryTimescale(TrackId, u64),
    EsConfiguration(TrackId, Vec<u8>),
    Sample(TrackId, usize, u64),
    Edit(TrackId, u64, u64),
    SampleGroup(TrackId, u32),
    ChapterTrack(TrackId),
    Chapter(TrackId, u64, String),
    NeroChapter(u64, String),
    String(FourCc, String),
    U8(FourCc, u8),
    U16(FourCc, u16),
    U32(FourCc, u32),
    U64(FourCc, u64),
    FreeForm(String, String, Vec<u8>),
    Artwork(FourCc, Vec<u8>),
    Genre(FourCc, u16),
    Track(u16, u16),
    Disk(u16, u16),
    Close,
}

#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub calls: Vec<Call>,
    pub timescale: u32,
    /// 名称与此相同的操作返回错误
    pub fail_on: Option<&'static str>,
    pub(crate) next_track: TrackId,
    /// 轨道 → (采样数, 时长)
    pub(crate) samples: BTreeMap<TrackId, (u32, u64)>,
}

impl RecordingWriter {
    pub fn failing(function: &'static str) -> Self {
        Self {
            fail_on: Some(function),
            ..Default::default()
        }
    }

    fn check(&self, function: &'static str) -> Mp4Result<()> {
        if self.fail_on == Some(function) {
            return Err(Mp4Error::new(function, "模拟失败"));
        }
        Ok(())
    }

    fn record(&mut self, function: &'static str, call: Call) -> Mp4Result<()> {
        self.check(function)?;
        self.calls.push(call);
        Ok(())
    }

    fn new_track(&mut self) -> TrackId {
        self.next_track += 1;
        self.next_track
    }

    /// 元数据相关的调用
    pub fn metadata_calls(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::String(..)
                        | Call::U8(..)
                        | Call::U16(..)
                        | Call::U32(..)
                        | Call::U64(..)
                        | Call::FreeForm(..)
                        | Call::Artwork(..)
                        | Call::Genre(..)
                        | Call::Track(..)
                        | Call::Disk(..)
                )
            })
            .cloned()
            .collect()
    }
}

impl Mp4Writer for RecordingWriter {
    fn create(&mut self, path: &Path, options: &FileOptions) -> Mp4Result<()> {
        self.record("create", Call::Create(path.to_path_buf(), options.clone()))
    }

    fn timescale(&self) -> Mp4Result<u32> {
        self.check("timescale")?;
        Ok(self.timescale)
    }

    fn set_timescale(&mut self, timescale: u32) -> Mp4Result<()> {
        self.record("set_timescale", Call::SetTimescale(timescale))?;
        self.timescale = timescale;
        Ok(())
    }

    fn add_audio_track(
        &mut self,
        timescale: u32,
        sample_duration: u32,
        audio_type: u8,
    ) -> Mp4Result<TrackId> {
        self.record(
            "add_audio_track",
            Call::AddAudioTrack(timescale, sample_duration, audio_type),
        )?;
        Ok(self.new_track())
    }

    fn add_alac_audio_track(
        &mut self,
        config: &[u8; 24],
        channel_layout: Option<&[u8; 12]>,
    ) -> Mp4Result<TrackId> {
        self.record(
            "add_alac_audio_track",
            Call::AddAlacTrack(config.to_vec(), channel_layout.map(|c| c.to_vec())),
        )?;
        Ok(self.new_track())
    }

    fn set_audio_channels(&mut self, track: TrackId, channels: u32) -> Mp4Result<()> {
        self.record("set_audio_channels", Call::AudioChannels(track, channels))
    }

    fn set_sample_entry_timescale(&mut self, track: TrackId, timescale: u64) -> Mp4Result<()> {
        self.record(
            "set_sample_entry_timescale",
            Call::SampleEntryTimescale(track, timescale),
        )
    }

    fn set_es_configuration(&mut self, track: TrackId, config: &[u8]) -> Mp4Result<()> {
        self.record(
            "set_es_configuration",
            Call::EsConfiguration(track, config.to_vec()),
        )
    }

    fn write_sample(&mut self, track: TrackId, data: &[u8], duration: u64) -> Mp4Result<()> {
        self.record("write_sample", Call::Sample(track, data.len(), duration))?;
        let entry = self.samples.entry(track).or_default();
        entry.0 += 1;
        entry.1 += duration;
        Ok(())
    }

    fn track_sample_count(&self, track: TrackId) -> Mp4Result<u32> {
        self.check("track_sample_count")?;
        Ok(self.samples.get(&track).map_or(0, |s| s.0))
    }

    fn track_duration(&self, track: TrackId) -> Mp4Result<u64> {
        self.check("track_duration")?;
        Ok(self.samples.get(&track).map_or(0, |s| s.1))
    }

    fn add_track_edit(&mut self, track: TrackId, media_start: u64, duration: u64) -> Mp4Result<()> {
        self.record("add_track_edit", Call::Edit(track, media_start, duration))
    }

    fn create_audio_sample_group_description(
        &mut self,
        track: TrackId,
        sample_count: u32,
    ) -> Mp4Result<()> {
        self.record(
            "create_audio_sample_group_description",
            Call::SampleGroup(track, sample_count),
        )
    }

    fn add_chapter_text_track(&mut self, reference: TrackId) -> Mp4Result<TrackId> {
        self.record("add_chapter_text_track", Call::ChapterTrack(reference))?;
        Ok(self.new_track())
    }

    fn add_chapter(&mut self, chapter_track: TrackId, duration: u64, title: &str) -> Mp4Result<()> {
        self.record(
            "add_chapter",
            Call::Chapter(chapter_track, duration, title.to_string()),
        )
    }

    fn add_nero_chapter(&mut self, start: u64, title: &str) -> Mp4Result<()> {
        self.record("add_nero_chapter", Call::NeroChapter(start, title.to_string()))
    }

    fn set_metadata_string(&mut self, code: FourCc, value: &str) -> Mp4Result<()> {
        self.record("set_metadata_string", Call::String(code, value.to_string()))
    }

    fn set_metadata_u8(&mut self, code: FourCc, value: u8) -> Mp4Result<()> {
        self.record("set_metadata_u8", Call::U8(code, value))
    }

    fn set_metadata_u16(&mut self, code: FourCc, value: u16) -> Mp4Result<()> {
        self.record("set_metadata_u16", Call::U16(code, value))
    }

    fn set_metadata_u32(&mut self, code: FourCc, value: u32) -> Mp4Result<()> {
        self.record("set_metadata_u32", Call::U32(code, value))
    }

    fn set_metadata_u64(&mut self, code: FourCc, value: u64) -> Mp4Result<()> {
        self.record("set_metadata_u64", Call::U64(code, value))
    }

    fn set_metadata_freeform(&mut self, name: &str, namespace: &str, value: &[u8]) -> Mp4Result<()> {
        self.record(
            "set_metadata_freeform",
            Call::FreeForm(name.to_string(), namespace.to_string(), value.to_vec()),
        )
    }

    fn set_metadata_artwork(&mut self, code: FourCc, data: &[u8]) -> Mp4Result<()> {
        self.record("set_metadata_artwork", Call::Artwork(code, data.to_vec()))
    }

    fn set_metadata_genre(&mut self, code: FourCc, genre: u16) -> Mp4Result<()> {
        self.record("set_metadata_genre", Call::Genre(code, genre))
    }

    fn set_metadata_track(&mut self, number: u16, total: u16) -> Mp4Result<()> {
        self.record("set_metadata_track", Call::Track(number, total))
    }

    fn set_metadata_disk(&mut self, number: u16, total: u16) -> Mp4Result<()> {
        self.record("set_metadata_disk", Call::Disk(number, total))
    }

    fn close(&mut self) -> Mp4Result<()> {
        self.record("close", Call::Close)
    }
}
