//! Frame sources: live capture with cpal and a synthetic tone generator

pub mod frame;
pub mod buffer;
pub mod input;
pub mod tone;

pub use frame::{Frame, FrameSource, quantize_u8};
pub use buffer::AudioRingBuffer;
pub use input::{AudioDeviceInfo, CaptureOptions, CpalFrameSource, list_input_devices};
pub use tone::ToneSource;
