// crates/reelscroll-media/src/helpers/frame.rs
//
// Copy scaled RGBA frames out of ffmpeg's strided planes.

use ffmpeg_the_third::util::frame::video::Video as VideoFrame;

/// Remove per-row padding from a strided plane. `row_bytes` is the visible
/// width in bytes; rows shorter than that (truncated buffers) stop the copy.
pub fn strip_stride(raw: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(row_bytes * rows);
    for row in 0..rows {
        let start = row * stride;
        let Some(line) = raw.get(start..start + row_bytes) else { break };
        out.extend_from_slice(line);
    }
    out
}

/// Packed RGBA bytes of plane 0 of an already-scaled frame.
pub fn packed_rgba(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    strip_stride(frame.data(0), frame.stride(0), width as usize * 4, height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_removed() {
        // 2 rows, 3 visible bytes, stride 5
        let raw = [1, 2, 3, 0, 0, 4, 5, 6, 0, 0];
        assert_eq!(strip_stride(&raw, 5, 3, 2), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn truncated_buffer_stops_early() {
        let raw = [1, 2, 3, 0, 0, 4];
        assert_eq!(strip_stride(&raw, 5, 3, 2), vec![1, 2, 3]);
    }
}
