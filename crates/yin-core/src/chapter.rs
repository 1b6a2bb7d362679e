//! 章节列表.

/// 单个章节: 标题与持续时间 (秒)
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub title: String,
    pub duration: f64,
}

impl Chapter {
    pub fn new(title: impl Into<String>, duration: f64) -> Self {
        Self {
            title: title.into(),
            duration,
        }
    }
}

/// 章节起始时间 (秒), 第一个章节从 `origin` 开始
pub fn start_offsets(chapters: &[Chapter], origin: f64) -> Vec<f64> {
    chapters
        .iter()
        .scan(origin, |off, chap| {
            let start = *off;
            *off += chap.duration;
            Some(start)
        })
        .collect()
}
