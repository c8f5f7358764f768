//! The embedding mini-app host and the terminal stand-in used by the binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use forge_chain::WalletConnector;
use parking_lot::Mutex;
use tracing::info;
use url::Url;

pub const WARPCAST_COMPOSE_URL: &str = "https://warpcast.com/~/compose";

#[async_trait]
pub trait MiniAppHost: Send + Sync {
    /// Tell the host the app has loaded. Called once.
    async fn ready(&self) -> Result<()>;

    /// Open the host's post composer pre-filled with `text` and `embeds`.
    async fn compose_share(&self, text: &str, embeds: &[String]) -> Result<()>;

    /// Gates auto-connect on load.
    fn is_in_mini_app(&self) -> bool;

    /// Wallet connector the host provides, if any.
    fn connector(&self) -> Option<Arc<dyn WalletConnector>> {
        None
    }
}

/// Warpcast compose intent for `text` with URL `embeds`.
pub fn compose_intent_url(text: &str, embeds: &[String]) -> Result<Url> {
    let params = std::iter::once(("text", text))
        .chain(embeds.iter().map(|e| ("embeds[]", e.as_str())));
    Url::parse_with_params(WARPCAST_COMPOSE_URL, params).context("failed to build compose URL")
}

/// Host for a terminal session: never inside a mini app, and sharing prints
/// a compose link instead of opening a composer.
#[derive(Default)]
pub struct TerminalHost {
    last_share: Mutex<Option<Url>>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_share(&self) -> Option<Url> {
        self.last_share.lock().clone()
    }
}

#[async_trait]
impl MiniAppHost for TerminalHost {
    async fn ready(&self) -> Result<()> {
        info!("terminal host ready");
        Ok(())
    }

    async fn compose_share(&self, text: &str, embeds: &[String]) -> Result<()> {
        let url = compose_intent_url(text, embeds)?;
        println!("Share on Farcaster: {url}");
        *self.last_share.lock() = Some(url);
        Ok(())
    }

    fn is_in_mini_app(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_url_encodes_text_and_embeds() {
        let url = compose_intent_url(
            r#"I just created my token "My Token"! Create yours here!"#,
            &["https://forge-chi.vercel.app/".to_string()],
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0].0, "text");
        assert_eq!(pairs[0].1, r#"I just created my token "My Token"! Create yours here!"#);
        assert_eq!(pairs[1], ("embeds[]".into(), "https://forge-chi.vercel.app/".into()));
        assert!(url.as_str().starts_with(WARPCAST_COMPOSE_URL));
    }

    #[tokio::test]
    async fn terminal_host_records_share() {
        let host = TerminalHost::new();
        assert!(!host.is_in_mini_app());
        assert!(host.connector().is_none());
        host.ready().await.unwrap();
        host.compose_share("hi", &[]).await.unwrap();
        assert!(host.last_share().is_some());
    }
}
