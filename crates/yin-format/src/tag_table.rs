//! iTunes 短标签分发表.
//!
//! 每个已知的 4 字节代码对应一种 [`TagKind`], 由它决定值的解析方式与写入的元数据类型.
//! 表之外的代码不写入.

use log::{debug, warn};
use yin_core::FourCc;
use yin_core::tag::codes;

use crate::mp4_writer::{Mp4Result, Mp4Writer};

/// 受控词表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// ID3v1 流派 (编号 = 索引 + 1)
    Genre,
    /// `stik`
    MediaKind,
    /// `rtng`
    ContentRating,
    /// `akID`
    AccountType,
    /// `sfID`
    Country,
}

/// ID3v1 (含 Winamp 扩展) 流派名称
static ID3_GENRES: &[&str] = &[
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge", "Hip-Hop", "Jazz",
    "Metal", "New Age", "Oldies", "Other", "Pop", "R&B", "Rap", "Reggae", "Rock", "Techno",
    "Industrial", "Alternative", "Ska", "Death Metal", "Pranks", "Soundtrack", "Euro-Techno",
    "Ambient", "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance", "Classical",
    "Instrumental", "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise", "AlternRock",
    "Bass", "Soul", "Punk", "Space", "Meditative", "Instrumental Pop", "Instrumental Rock",
    "Ethnic", "Gothic", "Darkwave", "Techno-Industrial", "Electronic", "Pop-Folk", "Eurodance",
    "Dream", "Southern Rock", "Comedy", "Cult", "Gangsta", "Top 40", "Christian Rap",
    "Pop/Funk", "Jungle", "Native American", "Cabaret", "New Wave", "Psychadelic", "Rave",
    "Showtunes", "Trailer", "Lo-Fi", "Tribal", "Acid Punk", "Acid Jazz", "Polka", "Retro",
    "Musical", "Rock & Roll", "Hard Rock", "Folk", "Folk-Rock", "National Folk", "Swing",
    "Fast Fusion", "Bebob", "Latin", "Revival", "Celtic", "Bluegrass", "Avantgarde",
    "Gothic Rock", "Progressive Rock", "Psychedelic Rock", "Symphonic Rock", "Slow Rock",
    "Big Band", "Chorus", "Easy Listening", "Acoustic", "Humour", "Speech", "Chanson", "Opera",
    "Chamber Music", "Sonata", "Symphony", "Booty Bass", "Primus", "Porn Groove", "Satire",
    "Slow Jam", "Club", "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul",
    "Freestyle", "Duet", "Punk Rock", "Drum Solo", "A capella", "Euro-House", "Dance Hall",
];

/// (值, 简称, 正式名称)
type VocabularyEntry = (u32, &'static str, &'static str);

static MEDIA_KINDS: &[VocabularyEntry] = &[
    (0, "oldmovie", "Movie (Old)"),
    (1, "normal", "Normal"),
    (2, "audiobook", "Audio Book"),
    (6, "musicvideo", "Music Video"),
    (9, "movie", "Movie"),
    (10, "tvshow", "TV Show"),
    (11, "booklet", "Booklet"),
    (14, "ringtone", "Ringtone"),
];

static CONTENT_RATINGS: &[VocabularyEntry] = &[
    (0, "none", "None"),
    (2, "clean", "Clean"),
    (4, "explicit", "Explicit"),
];

static ACCOUNT_TYPES: &[VocabularyEntry] = &[(0, "itunes", "iTunes"), (1, "aol", "AOL")];

static COUNTRIES: &[VocabularyEntry] = &[
    (143441, "USA", "United States"),
    (143442, "FRA", "France"),
    (143443, "DEU", "Germany"),
    (143444, "GBR", "United Kingdom"),
    (143445, "AUT", "Austria"),
    (143446, "BEL", "Belgium"),
    (143447, "FIN", "Finland"),
    (143448, "GRC", "Greece"),
    (143449, "IRL", "Ireland"),
    (143450, "ITA", "Italy"),
    (143451, "LUX", "Luxembourg"),
    (143452, "NLD", "Netherlands"),
    (143453, "PRT", "Portugal"),
    (143454, "ESP", "Spain"),
    (143455, "CAN", "Canada"),
    (143456, "SWE", "Sweden"),
    (143457, "NOR", "Norway"),
    (143458, "DNK", "Denmark"),
    (143459, "CHE", "Switzerland"),
    (143460, "AUS", "Australia"),
    (143461, "NZL", "New Zealand"),
    (143462, "JPN", "Japan"),
];

/// 比较用的名称形式: 只保留字母数字并转为小写
fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl Vocabulary {
    /// 按名称查找取值, 简称与正式名称均可, 不区分大小写
    pub fn lookup(self, name: &str) -> Option<u32> {
        let key = fold(name);
        if key.is_empty() {
            return None;
        }
        let entries = match self {
            Self::Genre => {
                return ID3_GENRES
                    .iter()
                    .position(|g| fold(g) == key)
                    .map(|i| i as u32 + 1);
            }
            Self::MediaKind => MEDIA_KINDS,
            Self::ContentRating => CONTENT_RATINGS,
            Self::AccountType => ACCOUNT_TYPES,
            Self::Country => COUNTRIES,
        };
        entries
            .iter()
            .find(|(_, compact, formal)| fold(compact) == key || fold(formal) == key)
            .map(|&(value, _, _)| value)
    }
}

/// 短标签的写入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// 字符串, 换行统一为 CRLF
    PlainString,
    /// `N` 或 `N/M`
    TrackNumber,
    /// `N` 或 `N/M`
    DiskNumber,
    /// 数字编号, 否则按流派名查找, 再否则写为自由文本 `©gen`
    Genre,
    /// 数字或词表名称, 写为 8 位
    SmallEnum(Vocabulary),
    /// 数字或词表名称, 写为 32 位
    LargeEnum(Vocabulary),
    Int8,
    Int16,
    Int32,
    Int64,
}

/// 短标签分发表
pub static TAG_TABLE: &[(FourCc, TagKind)] = &[
    (codes::ALBUM, TagKind::PlainString),
    (codes::ALBUM_ARTIST, TagKind::PlainString),
    (codes::ARTIST, TagKind::PlainString),
    (codes::COMMENT, TagKind::PlainString),
    (codes::COMPOSER, TagKind::PlainString),
    (codes::COPYRIGHT, TagKind::PlainString),
    (codes::DATE, TagKind::PlainString),
    (codes::DESCRIPTION, TagKind::PlainString),
    (codes::GROUPING, TagKind::PlainString),
    (codes::LONG_DESCRIPTION, TagKind::PlainString),
    (codes::LYRICS, TagKind::PlainString),
    (codes::TITLE, TagKind::PlainString),
    (codes::TOOL, TagKind::PlainString),
    (codes::TRACK, TagKind::TrackNumber),
    (codes::DISK, TagKind::DiskNumber),
    (codes::GENRE, TagKind::Genre),
    (codes::GENRE_ID3, TagKind::Genre),
    (codes::COMPILATION, TagKind::Int8),
    (codes::TEMPO, TagKind::Int16),
    (codes::TV_SEASON, TagKind::Int32),
    (codes::TV_EPISODE, TagKind::Int32),
    (codes::PODCAST, TagKind::Int8),
    (codes::HD_VIDEO, TagKind::Int8),
    (codes::MEDIA_TYPE, TagKind::SmallEnum(Vocabulary::MediaKind)),
    (codes::CONTENT_RATING, TagKind::SmallEnum(Vocabulary::ContentRating)),
    (codes::GAPLESS, TagKind::Int8),
    (codes::ACCOUNT_TYPE, TagKind::SmallEnum(Vocabulary::AccountType)),
    (codes::COUNTRY, TagKind::LargeEnum(Vocabulary::Country)),
    (codes::CONTENT_ID, TagKind::Int32),
    (codes::ARTIST_ID, TagKind::Int32),
    (codes::PLAYLIST_ID, TagKind::Int64),
    (codes::GENRE_ID, TagKind::Int32),
    (codes::COMPOSER_ID, TagKind::Int32),
    (FourCc(*b"apID"), TagKind::PlainString),
    (FourCc(*b"catg"), TagKind::PlainString),
    (FourCc(*b"keyw"), TagKind::PlainString),
    (FourCc(*b"purd"), TagKind::PlainString),
    (FourCc(*b"purl"), TagKind::PlainString),
    (FourCc(*b"soaa"), TagKind::PlainString),
    (FourCc(*b"soal"), TagKind::PlainString),
    (FourCc(*b"soar"), TagKind::PlainString),
    (FourCc(*b"soco"), TagKind::PlainString),
    (FourCc(*b"sonm"), TagKind::PlainString),
    (FourCc(*b"sosn"), TagKind::PlainString),
    (FourCc(*b"tven"), TagKind::PlainString),
    (FourCc(*b"tvnn"), TagKind::PlainString),
    (FourCc(*b"tvsh"), TagKind::PlainString),
    (FourCc(*b"xid "), TagKind::PlainString),
    (codes::ENCODED_BY, TagKind::PlainString),
];

/// 查找代码对应的写入方式
pub fn lookup(code: FourCc) -> Option<TagKind> {
    TAG_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, kind)| kind)
}

impl TagKind {
    /// 解析 `value` 并写入 `writer`
    ///
    /// 值无法解析时跳过, 不视为错误.
    pub fn apply<W: Mp4Writer + ?Sized>(
        self,
        writer: &mut W,
        code: FourCc,
        value: &str,
    ) -> Mp4Result<()> {
        match self {
            Self::PlainString => writer.set_metadata_string(code, &normalize_newlines(value)),
            Self::TrackNumber | Self::DiskNumber => {
                let Some((number, total)) = scan_pair(value) else {
                    debug!("{code}: 无法解析编号 {value:?}");
                    return Ok(());
                };
                if self == Self::TrackNumber {
                    writer.set_metadata_track(number as u16, total as u16)
                } else {
                    writer.set_metadata_disk(number as u16, total as u16)
                }
            }
            Self::Genre => {
                let trimmed = value.trim();
                if let Ok(id) = trimmed.parse::<i64>() {
                    writer.set_metadata_genre(codes::GENRE_ID3, id as u16)
                } else if let Some(id) = Vocabulary::Genre.lookup(trimmed) {
                    writer.set_metadata_genre(codes::GENRE_ID3, id as u16)
                } else {
                    writer.set_metadata_string(codes::GENRE, value)
                }
            }
            Self::SmallEnum(vocabulary) => match enum_value(vocabulary, value) {
                Some(n) => writer.set_metadata_u8(code, n as u8),
                None => {
                    warn!("{code}: 未知的取值 {value:?}, 已跳过");
                    Ok(())
                }
            },
            Self::LargeEnum(vocabulary) => match enum_value(vocabulary, value) {
                Some(n) => writer.set_metadata_u32(code, n),
                None => {
                    warn!("{code}: 未知的取值 {value:?}, 已跳过");
                    Ok(())
                }
            },
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => {
                let Some((n, _)) = scan_int(value) else {
                    debug!("{code}: 不是整数 {value:?}");
                    return Ok(());
                };
                match self {
                    Self::Int8 => writer.set_metadata_u8(code, n as u8),
                    Self::Int16 => writer.set_metadata_u16(code, n as u16),
                    Self::Int32 => writer.set_metadata_u32(code, n as u32),
                    _ => writer.set_metadata_u64(code, n as u64),
                }
            }
        }
    }
}

/// 数字优先, 否则查词表
fn enum_value(vocabulary: Vocabulary, value: &str) -> Option<u32> {
    match scan_int(value) {
        Some((n, _)) => Some(n as u32),
        None => vocabulary.lookup(value),
    }
}

/// 读取开头的十进制整数 (允许前导空白与符号), 返回数值与剩余部分
pub fn scan_int(s: &str) -> Option<(i64, &str)> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let sign_len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = bytes[sign_len..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let end = sign_len + digits;
    let n = s[..end].parse::<i64>().ok()?;
    Some((n, &s[end..]))
}

/// `N` 或 `N/M`, 缺少总数时为 0
fn scan_pair(s: &str) -> Option<(i64, i64)> {
    let (number, rest) = scan_int(s)?;
    let total = rest
        .strip_prefix('/')
        .and_then(scan_int)
        .map_or(0, |(t, _)| t);
    Some((number, total))
}

/// 换行统一为 CRLF
pub fn normalize_newlines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            _ => out.push(c),
        }
    }
    out
}
