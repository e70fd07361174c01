// crates/reelscroll-media/src/decode.rs
//
// LiveDecoder: stateful per-item decoder for the playback thread.
// Decodes sequentially, restarts from the top on EOF (feed videos loop), and
// stamps every frame with a presentation time that keeps increasing across
// loop restarts.

use anyhow::{anyhow, Context as _, Result};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use reelscroll_core::helpers::geometry::scaled_dims;

use crate::helpers::frame::packed_rgba;
use crate::helpers::seek::{rewind, seek_to_secs};

/// One RGBA frame out of `LiveDecoder::next_frame`.
pub struct DecodedFrame {
    pub data:       Vec<u8>,
    pub width:      u32,
    pub height:     u32,
    /// Position inside the source, seconds.
    pub source_ts:  f64,
    /// Seconds since this decoder session started (monotonic across loops).
    pub present_at: f64,
}

pub struct LiveDecoder {
    pub url:       String,
    ictx:          ffmpeg::format::context::Input,
    decoder:       ffmpeg::decoder::video::Video,
    video_idx:     usize,
    last_pts:      i64,
    tb_num:        i32,
    tb_den:        i32,
    pub out_w:     u32,
    pub out_h:     u32,
    scaler:        SwsContext,
    /// Decoded but not yet returned (left over from burn_to).
    carry:         Option<(VideoFrame, f64)>,
    /// EOF already sent to the decoder; only draining remains.
    draining:      bool,
    /// Source timestamp the current pass started at.
    pass_start:    f64,
    /// Presentation seconds accumulated by completed passes.
    loop_offset:   f64,
    last_secs:     f64,
    frame_dur:     f64,
}

impl LiveDecoder {
    /// Open `url` (file path or network URL), positioned at `timestamp` seconds.
    pub fn open(url: &str, timestamp: f64, max_w: u32) -> Result<Self> {
        let mut ictx = input(url).with_context(|| format!("open {url}"))?;
        let video_idx = ictx.streams().best(Type::Video)
            .ok_or_else(|| anyhow!("no video stream"))?.index();

        let (tb_num, tb_den, dec_ctx) = {
            let stream = ictx.stream(video_idx)
                .ok_or_else(|| anyhow!("stream {video_idx} vanished"))?;
            let tb = stream.time_base();
            let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
            (tb.numerator(), tb.denominator(), dec_ctx)
        };
        let decoder = dec_ctx.decoder().video()?;

        seek_to_secs(&mut ictx, timestamp, "LiveDecoder::open");

        let (out_w, out_h) = scaled_dims(decoder.width(), decoder.height(), max_w);
        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        let last_pts = if tb_num > 0 {
            (timestamp * tb_den as f64 / tb_num as f64) as i64
        } else {
            0
        };

        Ok(Self {
            url: url.to_string(), ictx, decoder, video_idx,
            last_pts, tb_num, tb_den, out_w, out_h, scaler,
            carry:       None,
            draining:    false,
            pass_start:  timestamp.max(0.0),
            loop_offset: 0.0,
            last_secs:   timestamp.max(0.0),
            frame_dur:   1.0 / 30.0,
        })
    }

    fn pts_to_secs(&self, pts: i64) -> f64 {
        if self.tb_den == 0 { return 0.0; }
        pts as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Pull the next decoded (unscaled) frame without looping.
    fn decode_next(&mut self) -> Option<(VideoFrame, f64)> {
        if let Some(carried) = self.carry.take() {
            return Some(carried);
        }

        let mut decoded = VideoFrame::empty();
        if self.decoder.receive_frame(&mut decoded).is_ok() {
            return Some(self.stamp(decoded));
        }
        if !self.draining {
            let mut got = false;
            for (stream, packet) in self.ictx.packets().flatten() {
                if stream.index() != self.video_idx { continue; }
                if self.decoder.send_packet(&packet).is_err() { continue; }
                if self.decoder.receive_frame(&mut decoded).is_ok() {
                    got = true;
                    break;
                }
            }
            if got {
                return Some(self.stamp(decoded));
            }
            // Demuxer exhausted — flush frames still held by the decoder.
            let _ = self.decoder.send_eof();
            self.draining = true;
        }
        if self.decoder.receive_frame(&mut decoded).is_ok() {
            return Some(self.stamp(decoded));
        }
        None
    }

    fn stamp(&mut self, frame: VideoFrame) -> (VideoFrame, f64) {
        let pts  = frame.pts().unwrap_or(self.last_pts + 1);
        let secs = self.pts_to_secs(pts);
        let step = secs - self.last_secs;
        if step > 0.0 && step < 1.0 {
            self.frame_dur = step;
        }
        self.last_pts  = pts;
        self.last_secs = secs;
        (frame, secs)
    }

    /// Restart from the top of the file. Returns false if the source cannot
    /// be rewound (live streams, broken containers).
    fn restart_pass(&mut self) -> bool {
        if !rewind(&mut self.ictx, "LiveDecoder") {
            return false;
        }
        self.decoder.flush();
        self.loop_offset += (self.last_secs + self.frame_dur - self.pass_start).max(self.frame_dur);
        self.pass_start = 0.0;
        self.last_secs  = 0.0;
        self.last_pts   = 0;
        self.draining   = false;
        true
    }

    /// Decode forward without scaling until the frame at `target_secs`,
    /// which is kept for the next `next_frame` call. Used after open() so the
    /// first frame shown is at the resume position, not the keyframe before it.
    pub fn burn_to(&mut self, target_secs: f64) {
        if target_secs <= 0.0 { return; }
        while let Some((frame, secs)) = self.decode_next() {
            if secs + self.frame_dur * 0.5 >= target_secs {
                self.carry = Some((frame, secs));
                return;
            }
        }
    }

    /// Next RGBA frame, looping back to the start on EOF. `None` only when
    /// the source yields nothing even after a restart.
    pub fn next_frame(&mut self) -> Option<DecodedFrame> {
        let (frame, secs) = match self.decode_next() {
            Some(f) => f,
            None => {
                if !self.restart_pass() { return None; }
                self.decode_next()?
            }
        };

        let mut out = VideoFrame::empty();
        if self.scaler.run(&frame, &mut out).is_err() { return None; }
        Some(DecodedFrame {
            data:       packed_rgba(&out, self.out_w, self.out_h),
            width:      self.out_w,
            height:     self.out_h,
            source_ts:  secs,
            present_at: self.loop_offset + (secs - self.pass_start).max(0.0),
        })
    }
}
