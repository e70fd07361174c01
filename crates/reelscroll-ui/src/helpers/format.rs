// crates/reelscroll-ui/src/helpers/format.rs
//
// String fitting for labels drawn over cards and in the toolbar. Uses a
// per-character width estimate instead of egui font measurement, which needs
// `&mut Fonts`.

const ELLIPSIS: char = '…';

fn max_chars(max_px: f32, char_px: f32) -> usize {
    (max_px / char_px.max(1.0)).max(0.0) as usize
}

/// Keep the start of `text`, ending with "…" when it does not fit.
pub fn fit_head(text: &str, max_px: f32, char_px: f32) -> String {
    let budget = max_chars(max_px, char_px);
    if text.chars().count() <= budget {
        return text.to_string();
    }
    if budget == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(budget - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// Keep the end of `text` (file names, URLs), starting with "…".
pub fn fit_tail(text: &str, max_px: f32, char_px: f32) -> String {
    let budget = max_chars(max_px, char_px);
    let count  = text.chars().count();
    if count <= budget {
        return text.to_string();
    }
    if budget == 0 {
        return String::new();
    }
    let skip = count - (budget - 1);
    std::iter::once(ELLIPSIS).chain(text.chars().skip(skip)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_unchanged() {
        assert_eq!(fit_head("clip", 200.0, 7.0), "clip");
        assert_eq!(fit_tail("clip", 200.0, 7.0), "clip");
    }

    #[test]
    fn head_keeps_prefix() {
        assert_eq!(fit_head("sunset over the bay", 42.0, 7.0), "sunse…");
    }

    #[test]
    fn tail_keeps_file_name() {
        let fitted = fit_tail("/home/me/feeds/videos.json", 84.0, 7.0);
        assert_eq!(fitted, "…videos.json");
        assert_eq!(fitted.chars().count(), 12);
    }

    #[test]
    fn zero_budget_is_empty() {
        assert_eq!(fit_head("abc", 0.0, 7.0), "");
        assert_eq!(fit_tail("abc", 0.0, 7.0), "");
    }
}
