//! Analysis engine: the frame loop, its mailbox, and the live monitor

pub mod mailbox;
pub mod analysis_loop;
pub mod monitor;

pub use mailbox::Mailbox;
pub use analysis_loop::{AnalysisLoop, AnalysisOutput, LoopReport, LoopState, ShutdownSignal};
pub use monitor::HarmonicMonitor;
