//! Frame data handed in by the capture side.
//!
//! The engine does not talk to camera devices. Producers hand it:
//! - Borrowed views via [`Frame`] (NV21 camera previews or RGBA imports)
//! - Owned frames via [`OwnedFrame`] when queued across threads

mod frame_utils;
mod types;

pub use frame_utils::{frame_from_image, gradient_nv21, solid_nv21};
pub use types::{Frame, FrameError, Orientation, OwnedFrame, PixelFormat};
