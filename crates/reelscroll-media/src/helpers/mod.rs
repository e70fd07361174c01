// crates/reelscroll-media/src/helpers/mod.rs
//
// Internal helpers for reelscroll-media. Not re-exported from lib.rs.

pub mod frame;
pub mod seek;
