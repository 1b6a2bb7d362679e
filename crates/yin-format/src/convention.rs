//! 标签约定: Vorbis comment、通用标签与 MP4 元数据之间的转换.
//!
//! - Vorbis comment (`KEY=value`) → [`TagSet`]
//! - [`TagSet`] → (4 字节代码标签, free-form 标签)
//! - cue sheet → 章节列表 + 补充标签

use std::collections::BTreeMap;

use log::{debug, warn};
use yin_core::tag::codes;
use yin_core::{Chapter, FourCc, TagKey, TagSet};

/// cue sheet 时间码的帧率 (每秒 75 帧)
const CUE_FRAMES_PER_SECOND: f64 = 75.0;

/// 标签约定
///
/// 三个转换都是纯函数, 调用方只使用其输出.
pub trait TagConvention {
    /// Vorbis comment (键已转为大写) → 通用标签
    fn vorbis_to_tags(&self, comments: &BTreeMap<String, String>) -> TagSet;

    /// 通用标签 → (4 字节代码标签, free-form 标签)
    fn split_m4a_tags(&self, tags: &TagSet)
    -> (BTreeMap<FourCc, String>, BTreeMap<String, String>);

    /// cue sheet → (章节, 补充标签)
    ///
    /// `duration` 为音轨总长 (秒), 最后一个章节在此结束.
    fn cue_sheet_to_chapters(&self, cue_sheet: &str, duration: f64) -> (Vec<Chapter>, TagSet);
}

/// Vorbis comment 键与 iTunes 代码的对应表
static VORBIS_KEYS: &[(&str, FourCc)] = &[
    ("TITLE", codes::TITLE),
    ("ARTIST", codes::ARTIST),
    ("ALBUM", codes::ALBUM),
    ("ALBUMARTIST", codes::ALBUM_ARTIST),
    ("ALBUM ARTIST", codes::ALBUM_ARTIST),
    ("COMMENT", codes::COMMENT),
    ("DESCRIPTION", codes::COMMENT),
    ("COMPOSER", codes::COMPOSER),
    ("GENRE", codes::GENRE),
    ("DATE", codes::DATE),
    ("YEAR", codes::DATE),
    ("COPYRIGHT", codes::COPYRIGHT),
    ("LYRICS", codes::LYRICS),
    ("UNSYNCEDLYRICS", codes::LYRICS),
    ("ENCODER", codes::TOOL),
    ("ENCODEDBY", codes::ENCODED_BY),
    ("GROUPING", codes::GROUPING),
    ("BPM", codes::TEMPO),
    ("COMPILATION", codes::COMPILATION),
];

/// 默认标签约定
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConvention;

impl StandardConvention {
    /// `N` 与总数拼成 `N/M`, 值中已含 `/` 时原样保留
    fn number_pair(number: Option<&String>, total: Option<&String>) -> Option<String> {
        let number = number?.trim();
        if number.is_empty() {
            return None;
        }
        match total.map(|t| t.trim()) {
            Some(total) if !total.is_empty() && !number.contains('/') => {
                Some(format!("{number}/{total}"))
            }
            _ => Some(number.to_string()),
        }
    }
}

impl TagConvention for StandardConvention {
    fn vorbis_to_tags(&self, comments: &BTreeMap<String, String>) -> TagSet {
        let mut tags = TagSet::new();
        for (key, value) in comments {
            match key.as_str() {
                "TRACKNUMBER" | "TRACKTOTAL" | "TOTALTRACKS" | "DISCNUMBER" | "DISCTOTAL"
                | "TOTALDISCS" => continue,
                _ => {}
            }
            match VORBIS_KEYS.iter().find(|(name, _)| *name == key.as_str()) {
                Some(&(_, code)) => tags.insert(code, value.as_str()),
                None => tags.insert(key.as_str(), value.as_str()),
            }
        }

        let total = comments
            .get("TRACKTOTAL")
            .or_else(|| comments.get("TOTALTRACKS"));
        if let Some(track) = Self::number_pair(comments.get("TRACKNUMBER"), total) {
            tags.insert(codes::TRACK, track);
        }
        let total = comments
            .get("DISCTOTAL")
            .or_else(|| comments.get("TOTALDISCS"));
        if let Some(disk) = Self::number_pair(comments.get("DISCNUMBER"), total) {
            tags.insert(codes::DISK, disk);
        }
        tags
    }

    fn split_m4a_tags(
        &self,
        tags: &TagSet,
    ) -> (BTreeMap<FourCc, String>, BTreeMap<String, String>) {
        let mut short = BTreeMap::new();
        let mut long = BTreeMap::new();
        for (key, value) in tags.iter() {
            match key {
                TagKey::Code(code) => {
                    short.insert(*code, value.to_string());
                }
                TagKey::Name(name) => {
                    long.insert(name.clone(), value.to_string());
                }
            }
        }
        (short, long)
    }

    fn cue_sheet_to_chapters(&self, cue_sheet: &str, duration: f64) -> (Vec<Chapter>, TagSet) {
        let sheet = CueSheet::parse(cue_sheet);
        let mut tags = TagSet::new();
        if let Some(title) = sheet.title {
            tags.insert(codes::ALBUM, title);
        }
        if let Some(performer) = sheet.performer {
            tags.insert(codes::ALBUM_ARTIST, performer);
        }
        if let Some(genre) = sheet.genre {
            tags.insert(codes::GENRE, genre);
        }
        if let Some(date) = sheet.date {
            tags.insert(codes::DATE, date);
        }

        let tracks: Vec<&CueTrack> = sheet
            .tracks
            .iter()
            .filter(|t| t.start.is_some())
            .collect();
        let mut chapters = Vec::with_capacity(tracks.len());
        for (i, track) in tracks.iter().enumerate() {
            // 第一个章节从 0 开始, 覆盖 pregap
            let start = if i == 0 { 0.0 } else { track.start.unwrap_or(0.0) };
            let end = tracks
                .get(i + 1)
                .and_then(|t| t.start)
                .unwrap_or(duration);
            let title = track
                .title
                .clone()
                .unwrap_or_else(|| format!("Track {:02}", track.number));
            chapters.push(Chapter::new(title, (end - start).max(0.0)));
        }
        debug!("cue sheet: {} 个章节, {} 个标签", chapters.len(), tags.len());
        (chapters, tags)
    }
}

/// cue sheet 中的一条音轨
#[derive(Debug, Default)]
struct CueTrack {
    number: u32,
    title: Option<String>,
    /// INDEX 01 的位置 (秒)
    start: Option<f64>,
}

/// 解析后的 cue sheet
#[derive(Debug, Default)]
struct CueSheet {
    title: Option<String>,
    performer: Option<String>,
    genre: Option<String>,
    date: Option<String>,
    tracks: Vec<CueTrack>,
}

impl CueSheet {
    fn parse(text: &str) -> Self {
        let mut sheet = CueSheet::default();
        for line in text.lines() {
            let line = line.trim();
            let (command, rest) = split_word(line);
            match command.to_ascii_uppercase().as_str() {
                "TITLE" => {
                    let value = unquote(rest);
                    match sheet.tracks.last_mut() {
                        Some(track) => track.title = Some(value),
                        None => sheet.title = Some(value),
                    }
                }
                "PERFORMER" if sheet.tracks.is_empty() => {
                    sheet.performer = Some(unquote(rest));
                }
                "REM" => {
                    let (name, value) = split_word(rest);
                    match name.to_ascii_uppercase().as_str() {
                        "GENRE" => sheet.genre = Some(unquote(value)),
                        "DATE" => sheet.date = Some(unquote(value)),
                        _ => {}
                    }
                }
                "TRACK" => {
                    let (number, _) = split_word(rest);
                    sheet.tracks.push(CueTrack {
                        number: number.parse().unwrap_or(0),
                        ..Default::default()
                    });
                }
                "INDEX" => {
                    let (index, time) = split_word(rest);
                    if index.parse::<u32>().ok() != Some(1) {
                        continue;
                    }
                    let Some(track) = sheet.tracks.last_mut() else {
                        continue;
                    };
                    match parse_cue_time(time.trim()) {
                        Some(t) => track.start = Some(t),
                        None => warn!("cue sheet: 无法解析时间码 {:?}", time),
                    }
                }
                _ => {}
            }
        }
        sheet
    }
}

/// 切出第一个空白分隔的单词
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, ""),
    }
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
        .to_string()
}

/// `mm:ss:ff` → 秒
fn parse_cue_time(s: &str) -> Option<f64> {
    let mut parts = s.split(':');
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = parts.next()?.parse().ok()?;
    let frames: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(f64::from(minutes * 60 + seconds) + f64::from(frames) / CUE_FRAMES_PER_SECOND)
}
