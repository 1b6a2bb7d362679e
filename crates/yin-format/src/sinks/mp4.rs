//! MP4 (M4A) 输出的公共部分.
//!
//! 负责创建文件、写入章节与标签、关闭文件. 具体的音频轨道由
//! [`AacMp4Sink`](super::AacMp4Sink) / [`AlacMp4Sink`](super::AlacMp4Sink) 创建.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use yin_core::chapter::start_offsets;
use yin_core::tag::codes;
use yin_core::{Chapter, GaplessInfo, TagSet, YinError, YinResult};

use crate::convention::{StandardConvention, TagConvention};
use crate::mp4_writer::{FileOptions, ITUNES_NAMESPACE, Mp4Writer, TrackId};
use crate::tag_table;

/// Nero 章节时间单位 (100ns)
const NERO_UNITS_PER_SECOND: f64 = 10_000_000.0;

/// MP4 输出基类
pub struct Mp4SinkBase<W: Mp4Writer> {
    writer: W,
    path: PathBuf,
    track: Option<TrackId>,
    closed: bool,
    gapless: GaplessInfo,
    tags: TagSet,
    chapters: Vec<Chapter>,
    artworks: Vec<Vec<u8>>,
    convention: Box<dyn TagConvention>,
}

impl<W: Mp4Writer> Mp4SinkBase<W> {
    /// 创建 M4A 文件
    ///
    /// `temporary` 为真时写入临时文件, 由调用方完成后再重新封装.
    pub fn create(mut writer: W, path: impl AsRef<Path>, temporary: bool) -> YinResult<Self> {
        let path = path.as_ref().to_path_buf();
        writer.create(&path, &FileOptions::m4a(temporary))?;
        debug!("已创建 MP4 输出: {}", path.display());
        Ok(Self {
            writer,
            path,
            track: None,
            closed: false,
            gapless: GaplessInfo::default(),
            tags: TagSet::new(),
            chapters: Vec::new(),
            artworks: Vec::new(),
            convention: Box::new(StandardConvention),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// 音频轨道, 尚未创建时为 `None`
    pub fn track(&self) -> Option<TrackId> {
        self.track
    }

    pub(crate) fn set_track(&mut self, track: TrackId) {
        self.track = Some(track);
    }

    pub(crate) fn require_track(&self) -> YinResult<TrackId> {
        self.track
            .ok_or_else(|| YinError::InvalidArgument("MP4 输出尚未创建音频轨道".into()))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 替换标签转换约定
    pub fn set_convention(&mut self, convention: Box<dyn TagConvention>) {
        self.convention = convention;
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.tags
    }

    pub fn set_tags(&mut self, tags: TagSet) {
        self.tags = tags;
    }

    pub fn set_chapters(&mut self, chapters: Vec<Chapter>) {
        self.chapters = chapters;
    }

    /// 追加一张封面, 按追加顺序写入
    pub fn add_artwork(&mut self, data: Vec<u8>) {
        self.artworks.push(data);
    }

    pub fn gapless_info(&self) -> GaplessInfo {
        self.gapless
    }

    pub fn set_gapless_info(&mut self, info: GaplessInfo) {
        self.gapless = info;
    }

    /// 追加一个编码帧
    pub fn write_samples(&mut self, data: &[u8], nsamples: u64) -> YinResult<()> {
        let track = self.require_track()?;
        self.writer.write_sample(track, data, nsamples)?;
        Ok(())
    }

    /// 写入章节、标签与封面
    pub fn write_tags(&mut self) -> YinResult<()> {
        if !self.chapters.is_empty() {
            self.write_chapters()?;
        }

        let (short_tags, long_tags) = self.convention.split_m4a_tags(&self.tags);
        for (code, value) in short_tags.iter().filter(|(_, v)| !v.is_empty()) {
            match tag_table::lookup(*code) {
                Some(kind) => kind.apply(&mut self.writer, *code, value)?,
                None => debug!("忽略未知标签 {code}"),
            }
        }
        for (name, value) in long_tags.iter().filter(|(_, v)| !v.is_empty()) {
            self.writer
                .set_metadata_freeform(name, ITUNES_NAMESPACE, value.as_bytes())?;
        }
        for artwork in &self.artworks {
            self.writer.set_metadata_artwork(codes::ARTWORK, artwork)?;
        }
        Ok(())
    }

    /// QuickTime 章节基于时长, 第一个章节总是从轨道开头开始.
    /// Nero 章节基于起始时间, 第一个章节推迟 edit_start, 最后一个章节在轨道末尾结束.
    fn write_chapters(&mut self) -> YinResult<()> {
        let reference = self.require_track()?;
        let timescale = f64::from(self.writer.timescale()?);
        let chapter_track = self.writer.add_chapter_text_track(reference)?;

        let origin = if timescale > 0.0 {
            self.gapless.edit_start as f64 / timescale
        } else {
            0.0
        };
        let starts = start_offsets(&self.chapters, origin);
        for (chapter, start) in self.chapters.iter().zip(starts) {
            let duration = (chapter.duration * timescale + 0.5) as u64;
            self.writer.add_chapter(chapter_track, duration, &chapter.title)?;
            let stamp = (start * NERO_UNITS_PER_SECOND + 0.5) as u64;
            self.writer.add_nero_chapter(stamp, &chapter.title)?;
        }
        debug!("已写入 {} 个章节", self.chapters.len());
        Ok(())
    }

    /// 完成并关闭文件, 重复调用无效果
    pub fn close(&mut self) -> YinResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.close()?;
        debug!("已关闭 MP4 输出: {}", self.path.display());
        Ok(())
    }
}

impl<W: Mp4Writer> Drop for Mp4SinkBase<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("关闭 MP4 输出失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::testing::{Call, RecordingWriter};
    use yin_core::FourCc;

    fn open() -> Mp4SinkBase<RecordingWriter> {
        let writer = RecordingWriter {
            timescale: 44100,
            ..Default::default()
        };
        let mut sink = Mp4SinkBase::create(writer, "out.m4a", false).unwrap();
        let track = sink.writer_mut().add_audio_track(44100, 1024, 0x40).unwrap();
        sink.set_track(track);
        sink
    }

    #[test]
    fn test_创建文件() {
        let sink = open();
        assert_eq!(
            sink.writer().calls[0],
            Call::Create(PathBuf::from("out.m4a"), FileOptions::m4a(false))
        );
        assert_eq!(sink.path(), Path::new("out.m4a"));
    }

    #[test]
    fn test_创建失败转换为容器错误() {
        let result = Mp4SinkBase::create(RecordingWriter::failing("create"), "x.m4a", true);
        match result {
            Err(YinError::Container { function, .. }) => assert_eq!(function, "create"),
            _ => panic!("期望容器错误"),
        }
    }

    #[test]
    fn test_章节() {
        let mut sink = open();
        sink.set_chapters(vec![Chapter::new("一", 5.0), Chapter::new("二", 3.0)]);
        sink.write_tags().unwrap();

        let calls = &sink.writer().calls;
        assert!(calls.contains(&Call::ChapterTrack(1)));
        let chapters: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, Call::Chapter(..) | Call::NeroChapter(..)))
            .cloned()
            .collect();
        assert_eq!(
            chapters,
            vec![
                Call::Chapter(2, 220_500, "一".into()),
                Call::NeroChapter(0, "一".into()),
                Call::Chapter(2, 132_300, "二".into()),
                Call::NeroChapter(50_000_000, "二".into()),
            ]
        );
    }

    #[test]
    fn test_nero_章节推迟_edit_start() {
        let mut sink = open();
        sink.set_gapless_info(GaplessInfo::new(2205, 0));
        sink.set_chapters(vec![Chapter::new("a", 1.0), Chapter::new("b", 1.0)]);
        sink.write_tags().unwrap();

        let nero: Vec<_> = sink
            .writer()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::NeroChapter(stamp, _) => Some(*stamp),
                _ => None,
            })
            .collect();
        assert_eq!(nero, vec![500_000, 10_500_000]);
    }

    #[test]
    fn test_标签分发() {
        let mut sink = open();
        let mut tags = TagSet::new();
        tags.insert(codes::TITLE, "歌名");
        tags.insert(codes::TRACK, "2/10");
        tags.insert(codes::ARTIST, "");
        tags.insert(FourCc(*b"zzzz"), "未知");
        tags.insert("REPLAYGAIN_TRACK_GAIN", "-3.2 dB");
        sink.set_tags(tags);
        sink.add_artwork(vec![1, 2]);
        sink.add_artwork(vec![3]);
        sink.write_tags().unwrap();

        assert_eq!(
            sink.writer().metadata_calls(),
            vec![
                Call::Track(2, 10),
                Call::String(codes::TITLE, "歌名".into()),
                Call::FreeForm(
                    "REPLAYGAIN_TRACK_GAIN".into(),
                    ITUNES_NAMESPACE.into(),
                    b"-3.2 dB".to_vec()
                ),
                Call::Artwork(codes::ARTWORK, vec![1, 2]),
                Call::Artwork(codes::ARTWORK, vec![3]),
            ]
        );
    }

    #[test]
    fn test_写入失败转换为容器错误() {
        let writer = RecordingWriter {
            fail_on: Some("set_metadata_string"),
            ..Default::default()
        };
        let mut sink = Mp4SinkBase::create(writer, "out.m4a", false).unwrap();
        sink.tags_mut().insert(codes::TITLE, "x");
        assert!(matches!(
            sink.write_tags(),
            Err(YinError::Container { .. })
        ));
    }

    #[test]
    fn test_close_幂等() {
        let mut sink = open();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        let closes = sink
            .writer()
            .calls
            .iter()
            .filter(|c| **c == Call::Close)
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn test_close_失败只报告一次() {
        let mut sink = Mp4SinkBase::create(RecordingWriter::failing("close"), "o.m4a", false)
            .unwrap();
        assert!(matches!(sink.close(), Err(YinError::Container { .. })));
        assert!(sink.close().is_ok());
    }

    #[test]
    fn test_无轨道时写入采样() {
        let mut sink = Mp4SinkBase::create(RecordingWriter::default(), "o.m4a", false).unwrap();
        assert!(matches!(
            sink.write_samples(&[0; 4], 1024),
            Err(YinError::InvalidArgument(_))
        ));
    }
}
