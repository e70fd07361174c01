// crates/reelscroll-ui/src/loader.rs
//
// Manifest fetch. Runs on its own thread so a slow server never blocks the
// UI; the result comes back over a one-shot channel and app.rs turns it into
// a feed (or an error message) on the next frame.

use std::thread;

use anyhow::{Context as _, Result};
use crossbeam_channel::{bounded, Receiver};
use eframe::egui;

use reelscroll_core::manifest::{parse_manifest, ManifestError, ManifestSource, VideoDescriptor};

use crate::feed_log;

/// What the loader thread hands back: descriptors, or the text to show.
pub type ManifestLoad = Result<Vec<VideoDescriptor>, String>;

/// Read and parse the manifest. Non-success HTTP statuses are errors.
pub fn load_manifest(source: &ManifestSource) -> Result<Vec<VideoDescriptor>> {
    let body = match source {
        ManifestSource::Url(url) => fetch_remote(url)?,
        ManifestSource::Path(path) => std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?,
    };
    Ok(parse_manifest(&body)?)
}

fn fetch_remote(url: &str) -> Result<String> {
    let mut resp = match ureq::get(url).call() {
        Ok(r) => r,
        Err(ureq::Error::StatusCode(code)) => {
            anyhow::bail!("could not load the manifest (HTTP {code})")
        }
        Err(e) => return Err(e).with_context(|| format!("request to {url} failed")),
    };
    resp.body_mut()
        .read_to_string()
        .with_context(|| format!("could not read response from {url}"))
}

/// User-facing text for a failed load. The empty-feed case reads as a plain
/// notice; everything else is prefixed with "Error:".
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ManifestError>() {
        Some(ManifestError::Empty) => ManifestError::Empty.to_string(),
        _ => format!("Error: {err:#}"),
    }
}

/// Load `source` on a background thread. The receiver yields exactly one
/// `ManifestLoad`; a repaint is requested when it is ready.
pub fn spawn_manifest_load(source: ManifestSource, ctx: egui::Context) -> Receiver<ManifestLoad> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let result = load_manifest(&source).map_err(|e| {
            feed_log!("[loader] {source}: {e:#}");
            failure_message(&e)
        });
        if let Ok(videos) = &result {
            feed_log!("[loader] {} videos from {source}", videos.len());
        }
        let _ = tx.send(result);
        ctx.request_repaint();
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn manifest_file(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_descriptors_from_a_file() {
        let f = manifest_file(r#"[{"title":"One","url":"1.mp4"},{"title":"Two","url":"2.mp4"}]"#);
        let videos = load_manifest(&ManifestSource::Path(f.path().to_path_buf())).unwrap();
        assert_eq!(videos.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(), ["One", "Two"]);
    }

    #[test]
    fn missing_file_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&ManifestSource::Path(dir.path().join("videos.json"))).unwrap_err();
        let msg = failure_message(&err);
        assert!(msg.starts_with("Error: could not read"), "{msg}");
    }

    #[test]
    fn empty_manifest_reads_as_no_videos() {
        let f = manifest_file("[]");
        let err = load_manifest(&ManifestSource::Path(f.path().to_path_buf())).unwrap_err();
        assert_eq!(failure_message(&err), "No videos found in the manifest");
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let f = manifest_file(r#"{"videos": []}"#);
        let err = load_manifest(&ManifestSource::Path(f.path().to_path_buf())).unwrap_err();
        assert!(failure_message(&err).starts_with("Error: invalid manifest"));
    }

    #[test]
    fn http_error_status_is_a_load_failure() {
        use std::io::{BufRead, BufReader};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            reader.get_mut()
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .unwrap();
        });

        let source = ManifestSource::Url(format!("http://{addr}/videos.json"));
        let err = load_manifest(&source).unwrap_err();
        let msg = failure_message(&err);
        assert!(msg.starts_with("Error:"), "{msg}");
    }
}
