//! 日志初始化.
//!
//! 控制台 + 按日期命名的日志文件 (`<prefix>.<YYYY-MM-DD>.log`).
//! 库 crate 使用 `log` 宏, 记录经 `tracing-log` 桥接进入同一个订阅器.
//! 过期文件在初始化时和跨日时清理, 历史文件按配置压缩为 `.gz`.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::error;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

mod maintenance;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 文件日志的过滤规则 (`EnvFilter` 语法)
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_directory")]
    pub directory: String,
    #[serde(default = "default_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_true")]
    pub compress_history: bool,
    /// 是否同时输出到控制台
    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: default_directory(),
            file_prefix: default_prefix(),
            retention_days: default_retention_days(),
            compress_history: true,
            console: true,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_directory() -> String {
    "logs".to_string()
}

fn default_prefix() -> String {
    "yin".to_string()
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> i64 {
    30
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 安装全局日志订阅器, 进程内只能调用一次
pub fn init(config: LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("创建日志目录失败, path={}", config.directory))?;
    maintenance::run(&config)?;

    let file_writer = CurrentFileWriter::new(config.clone())?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_writer);
    LOG_GUARD.set(guard).ok();

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(LineFormatter { console: false })
        .with_filter(EnvFilter::new(&config.level));

    let console_layer = config.console.then(|| {
        fmt::Layer::default()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .event_format(LineFormatter { console: true })
            .with_filter(EnvFilter::new(&config.level))
    });

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志订阅器已初始化")?;
    Ok(())
}

/// 写入当天日志文件, 日期变化时切换到新文件并整理历史文件
struct CurrentFileWriter {
    config: LoggingConfig,
    date: NaiveDate,
    file: File,
}

impl CurrentFileWriter {
    fn new(config: LoggingConfig) -> Result<Self> {
        let date = Local::now().date_naive();
        let file = open_append_file(&build_current_log_path(
            Path::new(&config.directory),
            &config.file_prefix,
            date,
        ))?;
        Ok(Self { config, date, file })
    }

    fn rollover(&mut self, today: NaiveDate) -> std::io::Result<()> {
        let path = build_current_log_path(
            Path::new(&self.config.directory),
            &self.config.file_prefix,
            today,
        );
        self.file = open_append_file(&path).map_err(std::io::Error::other)?;
        self.date = today;
        if let Err(err) = maintenance::run(&self.config) {
            error!("整理历史日志失败: {}", err);
        }
        Ok(())
    }
}

impl Write for CurrentFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let today = Local::now().date_naive();
        if today != self.date {
            self.rollover(today)?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

fn open_append_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开日志文件失败, path={}", path.display()))
}

pub(crate) fn build_current_log_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}.{}.log", prefix, date.format("%Y-%m-%d")))
}

/// 单行事件格式: `[时间] 级别 target > 字段`
///
/// 控制台只显示月日并为级别着色, 文件写完整日期.
struct LineFormatter {
    console: bool,
}

impl LineFormatter {
    fn level_color(level: tracing::Level) -> &'static str {
        match level {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let meta = event.metadata();
        let level = meta.level().to_string();
        if self.console {
            write!(
                writer,
                "[{}] {}{:5}\x1b[0m ",
                now.format("%m-%d %H:%M:%S%.3f"),
                Self::level_color(*meta.level()),
                level
            )?;
        } else {
            write!(writer, "[{}] {:5} ", now.format("%Y-%m-%d %H:%M:%S%.3f"), level)?;
        }
        write!(writer, "{} > ", meta.target())?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
