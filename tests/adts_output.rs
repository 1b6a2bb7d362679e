use yin::core::YinError;
use yin::format::{AdtsSink, Sink};

/// 逐帧解析 ADTS 码流, 返回 (采样率索引, 声道配置, 负载)
fn split_frames(data: &[u8]) -> Vec<(u8, u8, Vec<u8>)> {
    let mut frames = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let header = &data[pos..pos + 7];
        assert_eq!(header[0], 0xFF);
        assert_eq!(header[1] & 0xF6, 0xF0, "syncword / layer");
        assert_eq!(header[1] & 0x01, 0x01, "protection_absent");
        let profile = header[2] >> 6;
        assert_eq!(profile, 1);
        let index = (header[2] >> 2) & 0x0F;
        let channels = ((header[2] & 0x01) << 2) | (header[3] >> 6);
        let length = (usize::from(header[3] & 0x03) << 11)
            | (usize::from(header[4]) << 3)
            | usize::from(header[5] >> 5);
        frames.push((index, channels, data[pos + 7..pos + length].to_vec()));
        pos += length;
    }
    frames
}

#[test]
fn test_adts_文件输出() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("out.aac");

    // esds 风格 cookie: ES_Descriptor -> DecoderConfigDescriptor -> DecoderSpecificInfo
    let cookie = [
        0x03, 0x80, 0x80, 0x80, 0x22, 0x00, 0x00, 0x00, //
        0x04, 0x80, 0x80, 0x80, 0x14, 0x40, 0x15, 0x00, 0x00, 0x00, 0x00, 0x01, 0xF4, 0x00,
        0x00, 0x01, 0xF4, 0x00, //
        0x05, 0x80, 0x80, 0x80, 0x02, 0x11, 0x88,
    ];
    let mut sink = AdtsSink::create(&path, &cookie).expect("创建 ADTS 输出失败");
    assert_eq!(sink.sample_rate_index(), 3);
    assert_eq!(sink.channel_config(), 1);

    let payloads: Vec<Vec<u8>> = vec![vec![0x11; 200], vec![0x22; 1], vec![0x33; 8000]];
    for payload in &payloads {
        sink.write_samples(payload, 1024).expect("写入帧失败");
    }
    assert_eq!(sink.frames_written(), 3);
    sink.flush().expect("刷新失败");
    drop(sink);

    let data = std::fs::read(&path).expect("读取输出失败");
    assert_eq!(data.len(), 3 * 7 + 200 + 1 + 8000);
    let frames = split_frames(&data);
    assert_eq!(frames.len(), 3);
    for ((index, channels, payload), expected) in frames.iter().zip(&payloads) {
        assert_eq!(*index, 3);
        assert_eq!(*channels, 1);
        assert_eq!(payload, expected);
    }
}

#[test]
fn test_adts_超长帧() {
    let mut sink = AdtsSink::new(Vec::new(), &[0x05, 0x02, 0x12, 0x10]).expect("创建失败");
    let err = sink.write_samples(&vec![0; 8185], 1024).unwrap_err();
    assert!(matches!(err, YinError::InvalidArgument(_)));
    assert_eq!(sink.frames_written(), 0);
    assert!(sink.into_inner().is_empty());
}

#[test]
fn test_adts_缺少解码器配置() {
    let result = AdtsSink::new(Vec::new(), &[0x03, 0x03, 0x00, 0x00, 0x00]);
    assert!(matches!(result, Err(YinError::Format(_))));
}
