//! 通用标签集合.
//!
//! 标签以 4 字节代码 (iTunes 元数据 atom 名) 或任意字符串名称为键.
//! 字符串名称的标签最终写为 MP4 free-form 元数据.

use std::collections::BTreeMap;
use std::fmt;

/// 4 字节代码 (FourCC)
///
/// `©` 以 Latin-1 字节 0xA9 存储, 与 MP4 atom 名一致.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FourCc(pub [u8; 4]);

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Latin-1 到 Unicode 是逐字节映射
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc('{}')", self)
    }
}

/// 常用 iTunes 元数据代码
pub mod codes {
    use super::FourCc;

    pub const ALBUM: FourCc = FourCc(*b"\xa9alb");
    pub const ALBUM_ARTIST: FourCc = FourCc(*b"aART");
    pub const ARTIST: FourCc = FourCc(*b"\xa9ART");
    pub const COMMENT: FourCc = FourCc(*b"\xa9cmt");
    pub const COMPOSER: FourCc = FourCc(*b"\xa9wrt");
    pub const COPYRIGHT: FourCc = FourCc(*b"cprt");
    pub const DATE: FourCc = FourCc(*b"\xa9day");
    pub const DESCRIPTION: FourCc = FourCc(*b"desc");
    pub const GROUPING: FourCc = FourCc(*b"\xa9grp");
    pub const LONG_DESCRIPTION: FourCc = FourCc(*b"ldes");
    pub const LYRICS: FourCc = FourCc(*b"\xa9lyr");
    pub const TITLE: FourCc = FourCc(*b"\xa9nam");
    pub const TOOL: FourCc = FourCc(*b"\xa9too");
    pub const ENCODED_BY: FourCc = FourCc(*b"\xa9enc");
    pub const TRACK: FourCc = FourCc(*b"trkn");
    pub const DISK: FourCc = FourCc(*b"disk");
    pub const GENRE: FourCc = FourCc(*b"\xa9gen");
    pub const GENRE_ID3: FourCc = FourCc(*b"gnre");
    pub const COMPILATION: FourCc = FourCc(*b"cpil");
    pub const TEMPO: FourCc = FourCc(*b"tmpo");
    pub const TV_SEASON: FourCc = FourCc(*b"tvsn");
    pub const TV_EPISODE: FourCc = FourCc(*b"tves");
    pub const PODCAST: FourCc = FourCc(*b"pcst");
    pub const HD_VIDEO: FourCc = FourCc(*b"hdvd");
    pub const MEDIA_TYPE: FourCc = FourCc(*b"stik");
    pub const CONTENT_RATING: FourCc = FourCc(*b"rtng");
    pub const GAPLESS: FourCc = FourCc(*b"pgap");
    pub const ACCOUNT_TYPE: FourCc = FourCc(*b"akID");
    pub const COUNTRY: FourCc = FourCc(*b"sfID");
    pub const CONTENT_ID: FourCc = FourCc(*b"cnID");
    pub const ARTIST_ID: FourCc = FourCc(*b"atID");
    pub const PLAYLIST_ID: FourCc = FourCc(*b"plID");
    pub const GENRE_ID: FourCc = FourCc(*b"geID");
    pub const COMPOSER_ID: FourCc = FourCc(*b"cmID");
    pub const ARTWORK: FourCc = FourCc(*b"covr");
}

/// 标签键
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    /// 4 字节代码
    Code(FourCc),
    /// 任意名称 (free-form)
    Name(String),
}

impl From<FourCc> for TagKey {
    fn from(code: FourCc) -> Self {
        Self::Code(code)
    }
}

impl From<&str> for TagKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// 有序标签集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    entries: BTreeMap<TagKey, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖一个标签
    pub fn insert(&mut self, key: impl Into<TagKey>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &TagKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// 按代码查询
    pub fn get_code(&self, code: FourCc) -> Option<&str> {
        self.get(&TagKey::Code(code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 用另一个集合的条目覆盖本集合
    pub fn merge(&mut self, other: TagSet) {
        self.entries.extend(other.entries);
    }

    /// 按键序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&TagKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }
}
