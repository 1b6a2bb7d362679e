//! FLAC 输入源.
//!
//! 驱动外部 FLAC 流解码器: 通过回调向解码器提供文件字节, 从写回调接收解码后的音频块,
//! 转换为 32 位高位对齐采样存入 [`SampleBuffer`].
//!
//! 识别的文件签名 (可选的 ID3v2 前缀之后):
//! ```text
//! "fLaC"                         原生 FLAC
//! "OggS" ... [28..33] "\x7FFLAC"  Ogg FLAC
//! ```
//!
//! 解码器报告的错误先被记录, 在下一次读取时才返回, 已缓冲的采样仍可读出.

use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom};

use log::{debug, warn};
use yin_codec::flac::{
    CallbackError, DecoderState, ErrorStatus, FlacContainer, FlacDecoderCallbacks,
    FlacStreamDecoder, FrameHeader, MetadataBlock, MetadataType, ReadStatus, StreamInfo,
    VorbisComment, WriteStatus,
};
use yin_core::{AudioFormat, Chapter, TagSet, YinError, YinResult};

use crate::convention::{StandardConvention, TagConvention};
use crate::sample_buffer::SampleBuffer;
use crate::source::SampleSource;

/// 签名检查读取的字节数
const SIGNATURE_SIZE: usize = 33;
/// ID3v2 头长度
const ID3_HEADER_SIZE: u64 = 10;
/// Ogg 页中 FLAC 映射头的位置
const OGG_FLAC_OFFSET: usize = 28;
/// cue sheet 所在的 Vorbis comment 键
const CUESHEET_KEY: &str = "CUESHEET";

/// 解码器回调的接收方, 持有输入文件与解码状态
struct FlacHandler<R> {
    file: R,
    buffer: SampleBuffer,
    format: AudioFormat,
    total_samples: u64,
    /// 输入已读完
    eof: bool,
    /// 解码器报告过错误或 STREAMINFO 不可接受
    giveup: bool,
    tags: TagSet,
    chapters: Vec<Chapter>,
    convention: Box<dyn TagConvention>,
}

impl<R: Read + Seek> FlacHandler<R> {
    fn handle_stream_info(&mut self, info: &StreamInfo) {
        if let Err(e) = info.validate() {
            warn!("{}", e);
            self.giveup = true;
            return;
        }
        self.total_samples = info.total_samples;
        self.format = info.audio_format();
        debug!(
            "FLAC STREAMINFO: {}, 总采样数 {}",
            self.format, self.total_samples
        );
    }

    fn handle_vorbis_comment(&mut self, vc: &VorbisComment) {
        let mut comments = BTreeMap::new();
        let mut cue_sheet = None;
        for entry in &vc.comments {
            let entry = String::from_utf8_lossy(entry);
            let Some((key, value)) = entry.split_once('=') else {
                continue;
            };
            let key = key.to_ascii_uppercase();
            if key == CUESHEET_KEY {
                cue_sheet = Some(value.to_string());
            } else {
                comments.insert(key, value.to_string());
            }
        }

        let mut tags = self.convention.vorbis_to_tags(&comments);
        if let Some(cue_sheet) = cue_sheet {
            let duration = if self.format.sample_rate > 0 {
                self.total_samples as f64 / f64::from(self.format.sample_rate)
            } else {
                0.0
            };
            let (chapters, cue_tags) = self.convention.cue_sheet_to_chapters(&cue_sheet, duration);
            tags.merge(cue_tags);
            self.chapters = chapters;
        }
        debug!(
            "Vorbis comment: {} 个标签, {} 个章节",
            tags.len(),
            self.chapters.len()
        );
        self.tags = tags;
    }
}

impl<R: Read + Seek> FlacDecoderCallbacks for FlacHandler<R> {
    fn read(&mut self, buf: &mut [u8]) -> ReadStatus {
        loop {
            match self.file.read(buf) {
                Ok(0) => {
                    self.eof = true;
                    return ReadStatus::EndOfStream;
                }
                Ok(n) => return ReadStatus::Continue(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("FLAC 输入读取失败: {}", e);
                    return ReadStatus::Abort;
                }
            }
        }
    }

    fn seek(&mut self, offset: u64) -> Result<(), CallbackError> {
        self.eof = false;
        match self.file.seek(SeekFrom::Start(offset)) {
            Ok(pos) if pos == offset => Ok(()),
            _ => Err(CallbackError::Error),
        }
    }

    fn tell(&mut self) -> Result<u64, CallbackError> {
        self.file.stream_position().map_err(|_| CallbackError::Error)
    }

    fn length(&mut self) -> Result<u64, CallbackError> {
        let measure = |file: &mut R| -> io::Result<u64> {
            let pos = file.stream_position()?;
            let len = file.seek(SeekFrom::End(0))?;
            file.seek(SeekFrom::Start(pos))?;
            Ok(len)
        };
        measure(&mut self.file).map_err(|_| CallbackError::Error)
    }

    fn eof(&mut self) -> bool {
        self.eof
    }

    fn write(&mut self, header: &FrameHeader, channels: &[&[i32]]) -> WriteStatus {
        if header.channels != self.format.channels
            || header.sample_rate != self.format.sample_rate
            || header.bits_per_sample != self.format.valid_bits
        {
            warn!(
                "FLAC 帧参数变化 ({}Hz {}ch {}bit), 不支持",
                header.sample_rate, header.channels, header.bits_per_sample
            );
            return WriteStatus::Abort;
        }

        let nch = header.channels as usize;
        let blocksize = header.blocksize as usize;
        if channels.len() < nch || channels[..nch].iter().any(|c| c.len() < blocksize) {
            warn!("FLAC 写回调的声道数据不足");
            return WriteStatus::Abort;
        }

        // FLAC 采样低位对齐, 左移到 MSB
        let shift = self.format.alignment_shift();
        let dst = self.buffer.reserve(blocksize);
        for (i, frame) in dst.chunks_exact_mut(nch).enumerate() {
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = channels[c][i] << shift;
            }
        }
        self.buffer.commit(blocksize);
        WriteStatus::Continue
    }

    fn metadata(&mut self, block: &MetadataBlock) {
        match block {
            MetadataBlock::StreamInfo(info) => self.handle_stream_info(info),
            MetadataBlock::VorbisComment(vc) => self.handle_vorbis_comment(vc),
            MetadataBlock::Other(_) => {}
        }
    }

    fn error(&mut self, status: ErrorStatus) {
        warn!("FLAC 解码器错误: {:?}", status);
        self.giveup = true;
    }
}

/// FLAC 输入源
pub struct FlacSource<R: Read + Seek, D: FlacStreamDecoder> {
    decoder: D,
    handler: FlacHandler<R>,
    container: FlacContainer,
    samples_read: u64,
}

impl<R: Read + Seek, D: FlacStreamDecoder> FlacSource<R, D> {
    /// 打开 FLAC 输入, 使用默认标签约定
    pub fn open(file: R, decoder: D) -> YinResult<Self> {
        Self::open_with_convention(file, decoder, Box::new(StandardConvention))
    }

    /// 打开 FLAC 输入
    ///
    /// 检查文件签名并处理全部元数据块. 签名不符、STREAMINFO 不可接受时返回
    /// [`YinError::Format`].
    pub fn open_with_convention(
        mut file: R,
        mut decoder: D,
        convention: Box<dyn TagConvention>,
    ) -> YinResult<Self> {
        let container = detect_container(&mut file)?;
        file.seek(SeekFrom::Start(0))?;

        let mut handler = FlacHandler {
            file,
            buffer: SampleBuffer::default(),
            format: AudioFormat::default(),
            total_samples: 0,
            eof: false,
            giveup: false,
            tags: TagSet::new(),
            chapters: Vec::new(),
            convention,
        };

        decoder.set_metadata_respond(MetadataType::VorbisComment)?;
        decoder.init(container)?;
        decoder.process_until_end_of_metadata(&mut handler)?;
        if handler.giveup || !handler.format.is_valid() {
            return Err(YinError::Format("不支持的 FLAC 格式".into()));
        }
        handler.buffer.set_channels(handler.format.channels as usize);

        debug!("已打开 FLAC 输入 ({:?}): {}", container, handler.format);
        Ok(Self {
            decoder,
            handler,
            container,
            samples_read: 0,
        })
    }

    pub fn container(&self) -> FlacContainer {
        self.container
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// 按缓冲区容量与剩余长度限制本次读取的帧数
    fn adjust_frames_to_read(&self, nframes: usize, buf_len: usize) -> usize {
        let channels = self.handler.format.channels as usize;
        let mut n = nframes.min(buf_len / channels.max(1));
        let total = self.handler.total_samples;
        if total > 0 {
            let left = total.saturating_sub(self.samples_read);
            n = n.min(usize::try_from(left).unwrap_or(usize::MAX));
        }
        n
    }
}

/// 检查文件签名, 跳过可选的 ID3v2 标签
fn detect_container<R: Read + Seek>(file: &mut R) -> YinResult<FlacContainer> {
    let mut head = [0u8; SIGNATURE_SIZE];
    read_head(file, &mut head)?;

    if &head[0..3] == b"ID3" {
        // synchsafe 整数: 每字节低 7 位
        let size = head[6..10]
            .iter()
            .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F));
        debug!("跳过 ID3v2 标签: {} 字节", ID3_HEADER_SIZE + size);
        file.seek(SeekFrom::Start(ID3_HEADER_SIZE + size))?;
        read_head(file, &mut head)?;
    }

    match &head[0..4] {
        b"fLaC" => Ok(FlacContainer::Native),
        b"OggS" if &head[OGG_FLAC_OFFSET..OGG_FLAC_OFFSET + 5] == b"\x7fFLAC" => {
            Ok(FlacContainer::Ogg)
        }
        _ => Err(YinError::Format("不是 FLAC 文件".into())),
    }
}

fn read_head<R: Read>(file: &mut R, head: &mut [u8; SIGNATURE_SIZE]) -> YinResult<()> {
    file.read_exact(head).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            YinError::Format("文件过短, 不是 FLAC 文件".into())
        } else {
            YinError::Io(e)
        }
    })
}

impl<R: Read + Seek, D: FlacStreamDecoder> SampleSource for FlacSource<R, D> {
    fn format(&self) -> &AudioFormat {
        &self.handler.format
    }

    fn read_samples(&mut self, buf: &mut [i32], nframes: usize) -> YinResult<usize> {
        let nframes = self.adjust_frames_to_read(nframes, buf.len());
        let channels = self.handler.format.channels as usize;
        let mut done = 0usize;

        while done < nframes {
            if self.handler.buffer.count() > 0 {
                let out = &mut buf[done * channels..];
                done += self.handler.buffer.drain_into(out, nframes - done);
                continue;
            }
            if self.handler.giveup {
                // 先交付已读出的采样, 错误留到下一次读取
                if done > 0 {
                    break;
                }
                return Err(YinError::Decode("FLAC 解码器报告错误".into()));
            }
            if self.decoder.state() == DecoderState::EndOfStream {
                break;
            }
            self.decoder
                .process_single(&mut self.handler)
                .map_err(|e| YinError::Decode(format!("FLAC 解码失败: {}", e)))?;
        }

        self.samples_read += done as u64;
        Ok(done)
    }

    fn seek(&mut self, frame: u64) -> YinResult<()> {
        self.handler.buffer.clear();
        self.decoder
            .seek_absolute(frame, &mut self.handler)
            .map_err(|e| YinError::Seek(format!("FLAC 定位到 {} 失败: {}", frame, e)))?;
        self.samples_read = frame;
        Ok(())
    }

    fn samples_read(&self) -> u64 {
        self.samples_read
    }

    fn duration(&self) -> u64 {
        self.handler.total_samples
    }

    fn tags(&self) -> &TagSet {
        &self.handler.tags
    }

    fn chapters(&self) -> &[Chapter] {
        &self.handler.chapters
    }
}
