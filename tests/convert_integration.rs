//! End-to-end conversion tests
//!
//! These drive `convert` over real temp files, from Platinum ADPCM
//! input bytes down to the PCM bytes on disk.

use std::fs;
use std::fs::File;
use std::path::Path;

use tempfile::tempdir;

use ptadpcm::convert::{convert, ConvertError, ConvertOptions};
use ptadpcm::wave::{FormatError, HistoryMode};

/// Builds a mono Platinum ADPCM file with 4 samples per frame
/// (block align 6: two seeds, index byte, one nibble byte).
fn mono_adpcm_file(frames: &[[u8; 6]], declared_total: Option<u32>) -> Vec<u8> {
    let data_len = (frames.len() * 6) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    let total = declared_total.unwrap_or(4 + (8 + 16) + 8 + data_len);
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&0x8311u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // channels
    out.extend_from_slice(&22050u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // byte rate, ignored
    out.extend_from_slice(&6u16.to_le_bytes()); // block align
    out.extend_from_slice(&4u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for frame in frames {
        out.extend_from_slice(frame);
    }
    out
}

/// Frame with seeds 0 and 10, index 3, nibbles 8 then 15.
/// Decodes to 0, 10, 24, 94 (see the decoder unit tests).
const GENTLE_FRAME: [u8; 6] = [0, 0, 10, 0, 3, 0xF8];

fn pcm_samples(path: &Path) -> Vec<i16> {
    let bytes = fs::read(path).expect("read output");
    assert!(bytes.len() >= 44, "output shorter than a WAV header");
    bytes[44..]
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect()
}

#[test]
fn test_converts_adpcm_to_pcm16() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    fs::write(&input, mono_adpcm_file(&[GENTLE_FRAME], None)).unwrap();

    let report = convert(&input, &output, &ConvertOptions::default()).expect("convert failed");
    assert_eq!(report.channel_count, 1);
    assert_eq!(report.sample_rate, 22050);
    assert_eq!(report.stats.frames, 1);
    assert_eq!(report.stats.samples, 4);

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    // PCM id, 1 channel, source rate, 16 bits.
    assert_eq!(u16::from_le_bytes(bytes[20..22].try_into().unwrap()), 1);
    assert_eq!(u16::from_le_bytes(bytes[22..24].try_into().unwrap()), 1);
    assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 22050);
    assert_eq!(u16::from_le_bytes(bytes[34..36].try_into().unwrap()), 16);
    // 4 samples of 16-bit mono.
    assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 8);
    assert_eq!(pcm_samples(&output), vec![0, 10, 24, 94]);
}

#[test]
fn test_decode_is_byte_identical_across_runs() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    fs::write(
        &input,
        mono_adpcm_file(&[GENTLE_FRAME, [0x34, 0x12, 0x78, 0x56, 7, 0xA5]], None),
    )
    .unwrap();

    let out_a = dir.path().join("a.wav");
    let out_b = dir.path().join("b.wav");
    convert(&input, &out_a, &ConvertOptions::default()).unwrap();
    convert(&input, &out_b, &ConvertOptions::default()).unwrap();
    assert_eq!(fs::read(&out_a).unwrap(), fs::read(&out_b).unwrap());
}

#[test]
fn test_wrong_total_size_field_is_not_fatal() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    fs::write(&input, mono_adpcm_file(&[GENTLE_FRAME], Some(9999))).unwrap();

    convert(&input, &output, &ConvertOptions::default())
        .expect("a lying total-size field must only warn");
    assert_eq!(pcm_samples(&output), vec![0, 10, 24, 94]);
}

#[test]
fn test_same_path_refused_before_output_io() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("both.wav");
    fs::write(&path, mono_adpcm_file(&[GENTLE_FRAME], None)).unwrap();
    let before = fs::read(&path).unwrap();

    let err = convert(&path, &path, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::SameFile));
    assert_eq!(err.exit_code(), 5);
    // The input was never opened for writing, let alone truncated.
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_pcm_input_rejected_as_unsupported() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("pcm.wav");
    let output = dir.path().join("out.wav");
    let mut bytes = mono_adpcm_file(&[GENTLE_FRAME], None);
    bytes[20..22].copy_from_slice(&0x0001u16.to_le_bytes());
    fs::write(&input, bytes).unwrap();

    let err = convert(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Format(FormatError::UnsupportedEncoding(0x0001))
    ));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_truncated_data_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cut.wav");
    let output = dir.path().join("out.wav");
    let mut bytes = mono_adpcm_file(&[GENTLE_FRAME], None);
    bytes.truncate(bytes.len() - 2);
    fs::write(&input, bytes).unwrap();

    let err = convert(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Format(FormatError::TruncatedStream)
    ));
}

#[test]
fn test_locked_output_is_refused() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("busy.wav");
    fs::write(&input, mono_adpcm_file(&[GENTLE_FRAME], None)).unwrap();
    fs::write(&output, b"").unwrap();

    let holder = File::open(&output).unwrap();
    holder.try_lock().expect("test setup: lock the output");

    let err = convert(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::AlreadyLocked(_)));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_history_modes_differ_on_clipping_input() {
    // Seeds at the positive rail, one maximal upward delta, then a
    // maximal downward one. Full-precision history carries the
    // overshoot into the next prediction; clamped history does not.
    let clip_frame: [u8; 6] = [0x00, 0x7F, 0xF0, 0x7F, 11, 0x0F];
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    fs::write(&input, mono_adpcm_file(&[clip_frame], None)).unwrap();

    let out_full = dir.path().join("full.wav");
    let out_clamped = dir.path().join("clamped.wav");
    let full_report = convert(&input, &out_full, &ConvertOptions::default()).unwrap();
    convert(
        &input,
        &out_clamped,
        &ConvertOptions {
            history_mode: HistoryMode::Clamped,
        },
    )
    .unwrap();

    assert!(full_report.stats.clipped > 0);
    let full = pcm_samples(&out_full);
    let clamped = pcm_samples(&out_clamped);
    assert_eq!(full[..3], clamped[..3]);
    assert_eq!(full[3], 0x7FFF); // overshoot still pins the output
    assert_eq!(clamped[3], 4110); // 2*32767 - 32752 - 28672
    assert_ne!(full, clamped);
}
