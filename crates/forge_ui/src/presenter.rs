//! Status rendering, copy-to-clipboard and share text.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::Result;
use tracing::debug;

use crate::status::Status;

/// How long "Copied!" stays visible after a copy.
pub const COPY_ACK_WINDOW: Duration = Duration::from_millis(1_500);

pub const COPIED_LABEL: &str = "Copied!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Error,
    Success,
    /// Informational, pulsing.
    InfoPulse,
}

impl StatusIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Error => "✗",
            Self::Success => "✓",
            Self::InfoPulse => "•",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Green,
    Blue,
    Amber,
}

impl Tone {
    /// Background, border and text classes of the status box.
    pub fn class(self) -> &'static str {
        match self {
            Self::Red => "bg-red-900/20 border-red-500/30 text-red-400",
            Self::Green => "bg-green-900/20 border-green-500/30 text-green-400",
            Self::Blue => "bg-blue-900/20 border-blue-500/30 text-blue-400",
            Self::Amber => "bg-amber-900/20 border-amber-500/30 text-amber-400",
        }
    }

    /// ANSI foreground color code for terminal output.
    pub fn ansi(self) -> &'static str {
        match self {
            Self::Red => "31",
            Self::Green => "32",
            Self::Blue => "34",
            Self::Amber => "33",
        }
    }
}

/// What the status box shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub icon: StatusIcon,
    pub tone: Tone,
    pub text: String,
    pub token_address: Option<Address>,
}

impl StatusView {
    /// `None` while idle: the status box is hidden.
    pub fn from_status(status: &Status) -> Option<Self> {
        let (icon, tone) = match status {
            Status::Idle => return None,
            Status::Failed(failure) if failure.is_wallet_error() => (StatusIcon::Error, Tone::Red),
            Status::Succeeded(_) => (StatusIcon::Success, Tone::Green),
            status if status.is_in_flight() => (StatusIcon::InfoPulse, Tone::Blue),
            _ => (StatusIcon::InfoPulse, Tone::Amber),
        };
        Some(Self {
            icon,
            tone,
            text: status.text(),
            token_address: status.token_address(),
        })
    }

    /// One terminal line, colored when `color` is set.
    pub fn render_line(&self, color: bool) -> String {
        let line = format!("{} {}", self.icon.glyph(), self.text);
        if color {
            format!("\x1b[{}m{line}\x1b[0m", self.tone.ansi())
        } else {
            line
        }
    }
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// System clipboard. A new handle is opened per write.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl Clipboard for ArboardClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_owned())?;
        Ok(())
    }
}

/// The "Copied!" acknowledgement. Each copy bumps a generation counter and
/// schedules a revert; only the revert of the latest copy clears the flag,
/// so a second click restarts the window.
#[derive(Debug, Clone, Default)]
pub struct CopyIndicator {
    copied: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl CopyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_copied(&self) -> bool {
        self.copied.load(Ordering::SeqCst)
    }

    /// Write `text` to the clipboard. On failure the indicator is reset and
    /// nothing is reported. Must be called inside a tokio runtime.
    pub fn copy(&self, clipboard: &dyn Clipboard, text: &str) -> bool {
        if let Err(e) = clipboard.set_text(text) {
            debug!("clipboard write failed: {e}");
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.copied.store(false, Ordering::SeqCst);
            return false;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.copied.store(true, Ordering::SeqCst);

        let copied = Arc::clone(&self.copied);
        let current = Arc::clone(&self.generation);
        tokio::spawn(async move {
            tokio::time::sleep(COPY_ACK_WINDOW).await;
            if current.load(Ordering::SeqCst) == generation {
                copied.store(false, Ordering::SeqCst);
            }
        });
        true
    }
}

// ---------------------------------------------------------------------------
// Share
// ---------------------------------------------------------------------------

pub fn share_text(token_name: &str) -> String {
    format!(r#"I just created my token "{token_name}"! Create yours here!"#)
}

pub const SHARE_FAILED: &str = "Could not open Farcaster composer to share.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ValidationError;
    use crate::status::Failure;
    use alloy::primitives::{TxHash, U256};
    use forge_chain::TokenCreatedRecord;

    fn view(status: Status) -> StatusView {
        StatusView::from_status(&status).unwrap()
    }

    #[test]
    fn tone_mapping() {
        let wallet = view(Status::Failed(Failure::Wallet("rejected".into())));
        assert_eq!((wallet.icon, wallet.tone), (StatusIcon::Error, Tone::Red));
        assert_eq!(wallet.text, "Error: rejected");

        let record = TokenCreatedRecord {
            token_address: Address::repeat_byte(2),
            creator: Address::repeat_byte(3),
            name: "My Token".into(),
            initial_supply: U256::from(1u64),
            image_uri: String::new(),
        };
        let success = view(Status::Succeeded(record));
        assert_eq!((success.icon, success.tone), (StatusIcon::Success, Tone::Green));
        assert_eq!(success.token_address, Some(Address::repeat_byte(2)));

        assert_eq!(view(Status::Submitting).tone, Tone::Blue);
        assert_eq!(view(Status::AwaitingReceipt(TxHash::ZERO)).tone, Tone::Blue);

        let missing = view(Status::Failed(Failure::Validation(ValidationError::MissingRequired)));
        assert_eq!((missing.icon, missing.tone), (StatusIcon::InfoPulse, Tone::Amber));
        assert_eq!(view(Status::FetchingFee).tone, Tone::Amber);
        assert_eq!(view(Status::Failed(Failure::FeeUnavailable)).tone, Tone::Amber);

        assert!(StatusView::from_status(&Status::Idle).is_none());
    }

    #[test]
    fn render_line_plain_and_colored() {
        let v = view(Status::Submitting);
        assert_eq!(v.render_line(false), "• Creating token...");
        assert!(v.render_line(true).starts_with("\x1b[34m"));
    }

    #[test]
    fn share_text_quotes_name() {
        assert_eq!(
            share_text("My Token"),
            "I just created my token \"My Token\"! Create yours here!"
        );
    }
}
