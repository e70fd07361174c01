// crates/reelscroll-media/src/probe.rs
//
// Metadata preload for a feed item: duration, dimensions and a poster frame.
// Anything that fails here marks the item as unloadable in the UI.

use anyhow::{anyhow, Context as _, Result};
use crossbeam_channel::Sender;
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use reelscroll_core::helpers::geometry::scaled_dims;
use reelscroll_core::media_types::MediaResult;

use crate::helpers::frame::packed_rgba;
use crate::POSTER_MAX_W;

/// Probe `url` and report the outcome on `tx`. Returns `true` when the item
/// is playable (so the caller can go on to extract audio).
pub fn probe_item(url: &str, id: Uuid, tx: &Sender<MediaResult>) -> bool {
    match probe_metadata(url, id, tx) {
        Ok(duration) => {
            eprintln!("[media] probed {duration:.2}s ← {url}");
            true
        }
        Err(e) => {
            eprintln!("[media] probe failed for '{url}': {e:#}");
            let _ = tx.send(MediaResult::Error { id, msg: format!("{e:#}") });
            false
        }
    }
}

fn probe_metadata(url: &str, id: Uuid, tx: &Sender<MediaResult>) -> Result<f64> {
    let mut ictx = input(url).with_context(|| format!("open {url}"))?;

    let video_idx = ictx.streams().best(Type::Video)
        .ok_or_else(|| anyhow!("no video stream"))?
        .index();

    let (duration, dec_ctx) = {
        let stream = ictx.stream(video_idx)
            .ok_or_else(|| anyhow!("stream {video_idx} vanished"))?;
        let container = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
        let duration = if container > 0.0 {
            container
        } else {
            // Fall back to the stream's own duration.
            let tb = stream.time_base();
            (stream.duration() as f64 * tb.numerator() as f64 / tb.denominator().max(1) as f64)
                .max(0.0)
        };
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        (duration, dec_ctx)
    };
    let mut decoder = dec_ctx.decoder().video()?;

    let (width, height) = (decoder.width(), decoder.height());
    let _ = tx.send(MediaResult::Metadata { id, duration, width, height });

    // Poster: first decodable frame, downscaled.
    let (out_w, out_h) = scaled_dims(width, height, POSTER_MAX_W);
    let mut scaler = SwsContext::get(
        decoder.format(), width, height,
        Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
    )?;

    let mut decoded = VideoFrame::empty();
    for (stream, packet) in ictx.packets().flatten() {
        if stream.index() != video_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }
        if decoder.receive_frame(&mut decoded).is_ok() {
            let mut out = VideoFrame::empty();
            scaler.run(&decoded, &mut out)?;
            let _ = tx.send(MediaResult::Poster {
                id, width: out_w, height: out_h,
                data: packed_rgba(&out, out_w, out_h),
            });
            return Ok(duration);
        }
    }

    Err(anyhow!("no decodable video frame"))
}
