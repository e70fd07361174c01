// crates/reelscroll-core/src/helpers/geometry.rs
//
// Letterbox math for fitting a decoded frame inside a feed card.

/// Largest `(w, h)` with the source aspect ratio that fits in the box.
/// Degenerate sources fill the box.
///
/// ```
/// use reelscroll_core::helpers::geometry::fit_size;
/// let (w, h) = fit_size(1920.0, 1080.0, 400.0, 800.0);
/// assert!((w - 400.0).abs() < 0.01 && (h - 225.0).abs() < 0.01);
/// let (w, h) = fit_size(1080.0, 1920.0, 900.0, 800.0);
/// assert!((w - 450.0).abs() < 0.01 && (h - 800.0).abs() < 0.01);
/// ```
pub fn fit_size(src_w: f32, src_h: f32, box_w: f32, box_h: f32) -> (f32, f32) {
    if src_w <= 0.0 || src_h <= 0.0 {
        return (box_w, box_h);
    }
    let scale = (box_w / src_w).min(box_h / src_h);
    (src_w * scale, src_h * scale)
}

/// Output width for the decode scaler: native width capped at `max_w`,
/// height following the source aspect, both rounded down to even.
pub fn scaled_dims(src_w: u32, src_h: u32, max_w: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (2, 2);
    }
    let w = src_w.min(max_w).max(2) & !1;
    let h = ((w as u64 * src_h as u64 / src_w as u64) as u32).max(2) & !1;
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_dims_caps_width_and_keeps_aspect() {
        assert_eq!(scaled_dims(1920, 1080, 640), (640, 360));
        assert_eq!(scaled_dims(320, 240, 640), (320, 240));
        assert_eq!(scaled_dims(1080, 1920, 720), (720, 1280));
    }

    #[test]
    fn scaled_dims_are_even() {
        let (w, h) = scaled_dims(641, 361, 1000);
        assert_eq!(w % 2, 0);
        assert_eq!(h % 2, 0);
    }

    #[test]
    fn degenerate_source_fills_box() {
        assert_eq!(fit_size(0.0, 10.0, 50.0, 60.0), (50.0, 60.0));
    }
}
