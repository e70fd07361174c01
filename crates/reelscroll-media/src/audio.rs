// crates/reelscroll-media/src/audio.rs
//
// Audio extraction (WAV for rodio playback) and temp file cleanup.
//
// Each feed item's soundtrack is decoded once, resampled to 44.1 kHz stereo
// f32, and written to a temp WAV with hound. The UI plays it in a looping
// rodio sink that is paused / resumed alongside the video.

use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context as _, Result};
use crossbeam_channel::Sender;
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::sample::{Sample, Type as SampleType};
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;

use reelscroll_core::media_types::MediaResult;

const OUT_RATE:   u32           = 44_100;
/// Packed (interleaved) f32 — what the WAV writer and rodio expect.
const OUT_FMT:    Sample        = Sample::F32(SampleType::Packed);
const OUT_LAYOUT: ChannelLayout = ChannelLayout::STEREO;

const TEMP_PREFIX: &str = "reelscroll_audio_";

pub fn temp_wav_path(id: Uuid) -> PathBuf {
    std::env::temp_dir().join(format!("{TEMP_PREFIX}{id}.wav"))
}

/// Extract the soundtrack of `url` and send its WAV path back on `tx`.
///
/// Soft-fails: a silent video or a decode error just means no AudioPath
/// result, and the item plays without sound.
pub fn extract_audio(url: &str, id: Uuid, tx: &Sender<MediaResult>) {
    let wav_path = temp_wav_path(id);
    match decode_to_wav(url, &wav_path) {
        Ok(frames) => {
            eprintln!("[media] audio WAV written ({frames} sample frames) ← {url}");
            let _ = tx.send(MediaResult::AudioPath { id, path: wav_path });
        }
        Err(e) => {
            eprintln!("[media] no audio for '{url}': {e:#}");
            let _ = std::fs::remove_file(&wav_path);
        }
    }
}

/// Delete a temp WAV written by `extract_audio`. Anything outside the temp
/// dir or not matching our naming pattern is left alone.
pub fn cleanup_audio_temp(path: &Path) -> bool {
    if !is_owned_temp_wav(path, &std::env::temp_dir()) {
        return false;
    }
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[media] cleanup_audio_temp {}: {e}", path.display());
            false
        }
    }
}

fn is_owned_temp_wav(path: &Path, temp_dir: &Path) -> bool {
    let in_temp = path.parent().map(|p| p == temp_dir).unwrap_or(false);
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    in_temp && name.starts_with(TEMP_PREFIX) && name.ends_with(".wav")
}

/// Decode all audio from `src` into a float WAV at `dst`.
/// Returns the number of stereo sample frames written.
fn decode_to_wav(src: &str, dst: &Path) -> Result<u64> {
    let mut ictx = input(src).with_context(|| format!("open {src}"))?;
    let audio_idx = ictx.streams().best(MediaType::Audio)
        .ok_or_else(|| anyhow!("no audio stream"))?
        .index();

    let dec_ctx = {
        let stream = ictx.stream(audio_idx)
            .ok_or_else(|| anyhow!("stream {audio_idx} vanished"))?;
        ffmpeg::codec::context::Context::from_parameters(stream.parameters())?
    };
    let mut decoder = dec_ctx.decoder().audio()?;

    let spec = hound::WavSpec {
        channels:        2,
        sample_rate:     OUT_RATE,
        bits_per_sample: 32,
        sample_format:   hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(dst, spec)
        .with_context(|| format!("create {}", dst.display()))?;

    let mut resampler: Option<resampling::Context> = None;
    let mut written: u64 = 0;
    let mut frame = AudioFrame::empty();

    for (stream, packet) in ictx.packets().flatten() {
        if stream.index() != audio_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }
        while decoder.receive_frame(&mut frame).is_ok() {
            written += write_resampled(&frame, &mut resampler, &mut writer)?;
        }
    }
    let _ = decoder.send_eof();
    while decoder.receive_frame(&mut frame).is_ok() {
        written += write_resampled(&frame, &mut resampler, &mut writer)?;
    }

    writer.finalize()?;
    if written == 0 {
        return Err(anyhow!("no audio samples decoded"));
    }
    Ok(written)
}

/// Convert `frame` to the output format (building the resampler on first
/// use, once the real source format is known) and append it to `writer`.
fn write_resampled<W: std::io::Write + std::io::Seek>(
    frame:     &AudioFrame,
    resampler: &mut Option<resampling::Context>,
    writer:    &mut hound::WavWriter<W>,
) -> Result<u64> {
    let channels = frame.ch_layout().channels();
    let ready = frame.format() == OUT_FMT && frame.rate() == OUT_RATE && channels == 2;
    if ready {
        return write_packed(frame, writer);
    }

    if resampler.is_none() {
        // Mono sources must be declared MONO or swr misreads the channel count.
        let src_layout = if channels >= 2 { frame.ch_layout() } else { ChannelLayout::MONO };
        *resampler = Some(resampling::Context::get2(
            frame.format(), src_layout, frame.rate(),
            OUT_FMT,        OUT_LAYOUT, OUT_RATE,
        )?);
    }
    let Some(rs) = resampler.as_mut() else { return Ok(0) };

    let mut resampled = AudioFrame::empty();
    if rs.run(frame, &mut resampled).is_ok() && resampled.samples() > 0 {
        return write_packed(&resampled, writer);
    }
    Ok(0)
}

fn write_packed<W: std::io::Write + std::io::Seek>(
    frame:  &AudioFrame,
    writer: &mut hound::WavWriter<W>,
) -> Result<u64> {
    // Packed layout: every channel lives in plane 0.
    let bytes = frame.data(0);
    let usable = frame.samples() * 2 * 4;
    for b in bytes[..usable.min(bytes.len())].chunks_exact(4) {
        writer.write_sample(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))?;
    }
    Ok(frame.samples() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_wav_names_are_recognised() {
        let tmp = std::env::temp_dir();
        let id  = Uuid::new_v4();
        assert!(is_owned_temp_wav(&temp_wav_path(id), &tmp));
    }

    #[test]
    fn foreign_files_are_never_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join(format!("{TEMP_PREFIX}x.wav"));
        std::fs::write(&wav, b"RIFF").unwrap();
        // Right name, wrong directory.
        assert!(!cleanup_audio_temp(&wav));
        assert!(wav.exists());

        let tmp = std::env::temp_dir();
        assert!(!is_owned_temp_wav(&tmp.join("holiday.wav"), &tmp));
        assert!(!is_owned_temp_wav(&tmp.join(format!("{TEMP_PREFIX}x.mp3")), &tmp));
    }

    #[test]
    fn cleanup_removes_owned_wav() {
        let path = temp_wav_path(Uuid::new_v4());
        std::fs::write(&path, b"RIFF").unwrap();
        assert!(cleanup_audio_temp(&path));
        assert!(!path.exists());
    }
}
