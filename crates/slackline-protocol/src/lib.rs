pub mod api;
pub mod frames;

pub use api::{ImChannel, ImOpenResponse, IM_OPEN};
pub use frames::{Envelope, Frame, FrameKind};
