//! Launch flow for Forge: token form, status model, result presentation and
//! the mini-app host seam.

pub mod form;
pub mod host;
pub mod launch;
pub mod presenter;
pub mod status;

pub use form::{SupplyPreset, TokenForm, ValidationError};
pub use host::{MiniAppHost, TerminalHost};
pub use launch::{LaunchPanel, LaunchSettings, SubmitOutcome};
pub use presenter::{ArboardClipboard, Clipboard, CopyIndicator, StatusIcon, StatusView, Tone};
pub use status::{Failure, Status};
