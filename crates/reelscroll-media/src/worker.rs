// crates/reelscroll-media/src/worker.rs
//
// MediaWorker: owns the probe thread pool and the playback decode thread.
// All public API that reelscroll-ui calls lives here.

use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use uuid::Uuid;

use reelscroll_core::media_types::{MediaResult, PlaybackFrame};

use crate::audio::extract_audio;
use crate::decode::LiveDecoder;
use crate::probe::probe_item;
use crate::PLAYBACK_MAX_W;

/// Probe threads allowed to hold an ffmpeg context at the same time.
const PROBE_CONCURRENCY: u32 = 4;

#[derive(Debug, PartialEq)]
enum PlaybackCmd {
    Start { id: Uuid, url: String, ts: f64 },
    Stop,
    Shutdown,
}

/// Latest-wins command slot for the playback thread. Posting replaces any
/// command the thread has not picked up yet; only the newest target matters.
/// `Shutdown` is sticky so a late Start cannot revive the thread.
struct CmdSlot {
    cmd:  Mutex<Option<PlaybackCmd>>,
    wake: Condvar,
}

impl CmdSlot {
    fn new() -> Self {
        Self { cmd: Mutex::new(None), wake: Condvar::new() }
    }

    fn post(&self, cmd: PlaybackCmd) {
        let mut slot = self.cmd.lock();
        if *slot != Some(PlaybackCmd::Shutdown) {
            *slot = Some(cmd);
        }
        self.wake.notify_one();
    }

    fn take(&self) -> Option<PlaybackCmd> {
        self.cmd.lock().take()
    }

    fn wait(&self) -> PlaybackCmd {
        let mut slot = self.cmd.lock();
        loop {
            if let Some(cmd) = slot.take() {
                return cmd;
            }
            self.wake.wait(&mut slot);
        }
    }
}

/// Counting semaphore for probe threads.
struct ProbeGate {
    active: Mutex<u32>,
    freed:  Condvar,
}

impl ProbeGate {
    fn acquire(self: &Arc<Self>) -> ProbePermit {
        let mut active = self.active.lock();
        while *active >= PROBE_CONCURRENCY {
            self.freed.wait(&mut active);
        }
        *active += 1;
        ProbePermit(Arc::clone(self))
    }
}

/// Releases its slot and wakes the next waiter on drop.
struct ProbePermit(Arc<ProbeGate>);

impl Drop for ProbePermit {
    fn drop(&mut self) {
        *self.0.active.lock() -= 1;
        self.0.freed.notify_one();
    }
}

pub struct MediaWorker {
    /// Probe results: metadata, posters, audio paths, per-item errors.
    pub rx:    Receiver<MediaResult>,
    tx:        Sender<MediaResult>,
    /// Playback pipeline. At most one item decodes at a time.
    pb_cmd:    Arc<CmdSlot>,
    pub pb_rx: Receiver<PlaybackFrame>,
    shutdown:  Arc<AtomicBool>,
    gate:      Arc<ProbeGate>,
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(512);

        // Frame channel capacity is the decode look-ahead; a full channel
        // blocks the decode thread, which is the rate limiter.
        let pb_cmd               = Arc::new(CmdSlot::new());
        let (pb_frame_tx, pb_rx) = bounded::<PlaybackFrame>(24);

        let slot   = Arc::clone(&pb_cmd);
        let err_tx = tx.clone();
        thread::spawn(move || playback_loop(&slot, pb_frame_tx, err_tx));

        Self {
            rx, tx, pb_cmd, pb_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
            gate:     Arc::new(ProbeGate { active: Mutex::new(0), freed: Condvar::new() }),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.pb_cmd.post(PlaybackCmd::Shutdown);
    }

    /// Preload metadata + poster for one feed item, then its audio.
    pub fn probe(&self, id: Uuid, url: String) {
        let tx   = self.tx.clone();
        let sd   = self.shutdown.clone();
        let gate = self.gate.clone();

        thread::spawn(move || {
            let permit = gate.acquire();
            if sd.load(Ordering::Relaxed) { return; }
            let playable = probe_item(&url, id, &tx);

            // Audio extraction reads the whole stream and can take seconds;
            // don't keep later items' posters waiting behind it.
            drop(permit);

            if playable && !sd.load(Ordering::Relaxed) {
                extract_audio(&url, id, &tx);
            }
        });
    }

    /// Start decoding `url` from `ts` seconds. Replaces whatever was playing.
    pub fn start_playback(&self, id: Uuid, url: String, ts: f64) {
        // Frames from the previous session are stale.
        while self.pb_rx.try_recv().is_ok() {}
        self.pb_cmd.post(PlaybackCmd::Start { id, url, ts });
    }

    pub fn stop_playback(&self) {
        self.pb_cmd.post(PlaybackCmd::Stop);
        while self.pb_rx.try_recv().is_ok() {}
    }
}

impl Default for MediaWorker {
    fn default() -> Self { Self::new() }
}

/// Body of the playback decode thread. Picks up the newest command before
/// every frame; exits on `Shutdown` or when the frame receiver is gone.
/// Items that cannot be opened or decoded are reported on `err_tx`.
fn playback_loop(slot: &CmdSlot, frame_tx: Sender<PlaybackFrame>, err_tx: Sender<MediaResult>) {
    let mut current: Option<(Uuid, LiveDecoder)> = None;
    loop {
        let cmd = if current.is_some() { slot.take() } else { Some(slot.wait()) };

        match cmd {
            Some(PlaybackCmd::Start { id, url, ts }) => {
                current = match LiveDecoder::open(&url, ts, PLAYBACK_MAX_W) {
                    Ok(mut d) => {
                        d.burn_to(ts);
                        Some((id, d))
                    }
                    Err(e) => {
                        eprintln!("[pb] could not start {url}: {e:#}");
                        let _ = err_tx.send(MediaResult::Error { id, msg: format!("{e:#}") });
                        None
                    }
                };
                continue;
            }
            Some(PlaybackCmd::Stop) => {
                current = None;
                continue;
            }
            Some(PlaybackCmd::Shutdown) => return,
            None => {}
        }

        let Some((id, decoder)) = current.as_mut() else { continue };
        match decoder.next_frame() {
            Some(f) => {
                let frame = PlaybackFrame {
                    id:         *id,
                    present_at: f.present_at,
                    source_ts:  f.source_ts,
                    width:      f.width,
                    height:     f.height,
                    data:       f.data,
                };
                if frame_tx.send(frame).is_err() { return; }
            }
            None => {
                eprintln!("[pb] {} produced no frames, stopping", decoder.url);
                let _ = err_tx.send(MediaResult::Error {
                    id:  *id,
                    msg: "no decodable video frames".to_string(),
                });
                current = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(n: u128) -> PlaybackCmd {
        PlaybackCmd::Start { id: Uuid::from_u128(n), url: format!("{n}.mp4"), ts: 0.0 }
    }

    #[test]
    fn newest_command_wins_while_thread_is_busy() {
        let slot = CmdSlot::new();
        // Five target changes while the thread is stuck opening a slow source.
        for n in 1..=5 {
            slot.post(PlaybackCmd::Stop);
            slot.post(start(n));
        }
        assert_eq!(slot.take(), Some(start(5)));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn stop_after_start_cancels_it() {
        let slot = CmdSlot::new();
        slot.post(start(1));
        slot.post(PlaybackCmd::Stop);
        assert_eq!(slot.wait(), PlaybackCmd::Stop);
    }

    #[test]
    fn shutdown_is_not_overwritten() {
        let slot = CmdSlot::new();
        slot.post(PlaybackCmd::Shutdown);
        slot.post(start(2));
        assert_eq!(slot.take(), Some(PlaybackCmd::Shutdown));
    }

    #[test]
    fn unopenable_source_is_reported_as_item_error() {
        let dir = tempfile::tempdir().unwrap();
        let slot = Arc::new(CmdSlot::new());
        let (frame_tx, _frame_rx) = bounded::<PlaybackFrame>(1);
        let (err_tx, err_rx) = bounded::<MediaResult>(4);

        let thread_slot = Arc::clone(&slot);
        let handle = thread::spawn(move || playback_loop(&thread_slot, frame_tx, err_tx));

        let id = Uuid::from_u128(9);
        let url = dir.path().join("missing.mp4").to_string_lossy().into_owned();
        slot.post(PlaybackCmd::Start { id, url, ts: 0.0 });

        match err_rx.recv_timeout(std::time::Duration::from_secs(10)).unwrap() {
            MediaResult::Error { id: failed, .. } => assert_eq!(failed, id),
            _ => panic!("expected an error result"),
        }
        slot.post(PlaybackCmd::Shutdown);
        handle.join().unwrap();
    }

    #[test]
    fn wait_wakes_on_post_from_another_thread() {
        let slot = Arc::new(CmdSlot::new());
        let poster = Arc::clone(&slot);
        let handle = thread::spawn(move || poster.post(start(7)));
        assert_eq!(slot.wait(), start(7));
        handle.join().unwrap();
    }
}
