use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Explorer error: {0}")]
    Explorer(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of errors for logging and user display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Caused by what the user typed or chose.
    UserError,
    /// Wallet rejected or could not sign.
    WalletError,
    /// Network connectivity, RPC node or timeout issue.
    NetworkError,
    /// The chain executed and reverted, or returned undecodable data.
    ChainError,
    /// Invalid or missing configuration.
    ConfigError,
    /// Anything else.
    SystemError,
}

impl ForgeError {
    /// Returns the broad error category for routing and display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::ConfigError,
            Self::Validation(_) => ErrorCategory::UserError,
            Self::Network(_) | Self::Explorer(_) => ErrorCategory::NetworkError,
            Self::Wallet(_) => ErrorCategory::WalletError,
            Self::Contract(_) => ErrorCategory::ChainError,
            Self::Internal(_) => ErrorCategory::SystemError,
        }
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Configuration issue: {msg}"),
            Self::Validation(msg) => msg.clone(),
            Self::Network(_) => "Network error. Check your RPC endpoint.".into(),
            Self::Wallet(msg) => format!("Error: {msg}"),
            Self::Contract(msg) => format!("Contract call failed: {msg}"),
            Self::Explorer(_) => "Block explorer request failed.".into(),
            Self::Internal(_) => "An unexpected error occurred.".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error classification for anyhow::Error (message-pattern based)
// ---------------------------------------------------------------------------

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Fine-grained error category, from a typed error or message patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifiedCategory {
    Input,
    Wallet,
    Network,
    RateLimit,
    InsufficientFunds,
    Rejected,
    Reverted,
    Configuration,
    Internal,
}

/// Classified error with context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedError {
    pub severity: ErrorSeverity,
    pub category: ClassifiedCategory,
    pub message: String,
    pub user_message: String,
    pub recoverable: bool,
}

impl ClassifiedError {
    fn from_forge(forge: &ForgeError, error: &anyhow::Error) -> Self {
        let (category, severity) = match forge.category() {
            ErrorCategory::UserError => (ClassifiedCategory::Input, ErrorSeverity::Low),
            ErrorCategory::WalletError => (ClassifiedCategory::Wallet, ErrorSeverity::Low),
            ErrorCategory::NetworkError => (ClassifiedCategory::Network, ErrorSeverity::Medium),
            ErrorCategory::ChainError => (ClassifiedCategory::Reverted, ErrorSeverity::High),
            ErrorCategory::ConfigError => (ClassifiedCategory::Configuration, ErrorSeverity::Medium),
            ErrorCategory::SystemError => (ClassifiedCategory::Internal, ErrorSeverity::High),
        };
        Self {
            severity,
            category,
            message: error.to_string(),
            user_message: forge.user_message(),
            recoverable: true,
        }
    }
}

/// Classify an `anyhow::Error` into severity, category, and a user-friendly
/// message. A [`ForgeError`] anywhere in the chain decides; otherwise the
/// message is matched against known RPC and wallet patterns.
pub fn classify_error(error: &anyhow::Error) -> ClassifiedError {
    if let Some(forge) = error.chain().find_map(|e| e.downcast_ref::<ForgeError>()) {
        return ClassifiedError::from_forge(forge, error);
    }

    let msg = format!("{error:#}").to_lowercase();

    let (category, severity, user_msg) = if msg.contains("insufficient funds") {
        (
            ClassifiedCategory::InsufficientFunds,
            ErrorSeverity::High,
            "Insufficient funds for the creation fee and gas.",
        )
    } else if msg.contains("user rejected") || msg.contains("user denied") {
        (
            ClassifiedCategory::Rejected,
            ErrorSeverity::Low,
            "Transaction was rejected in the wallet.",
        )
    } else if msg.contains("execution reverted") || msg.contains("reverted") {
        (
            ClassifiedCategory::Reverted,
            ErrorSeverity::High,
            "The factory contract reverted the transaction.",
        )
    } else if msg.contains("rate limit") || msg.contains("429") {
        (
            ClassifiedCategory::RateLimit,
            ErrorSeverity::Medium,
            "RPC endpoint is rate limiting requests. Try again shortly.",
        )
    } else if msg.contains("timeout")
        || msg.contains("timed out")
        || msg.contains("connection")
        || msg.contains("dns")
    {
        (
            ClassifiedCategory::Network,
            ErrorSeverity::Medium,
            "Network error. Check your RPC endpoint.",
        )
    } else if msg.contains("config") {
        (
            ClassifiedCategory::Configuration,
            ErrorSeverity::Medium,
            "Configuration error. Check ~/.forge/config.json and FORGE_* variables.",
        )
    } else {
        (
            ClassifiedCategory::Internal,
            ErrorSeverity::Medium,
            "An unexpected error occurred.",
        )
    };

    ClassifiedError {
        severity,
        category,
        message: error.to_string(),
        user_message: user_msg.to_string(),
        recoverable: severity != ErrorSeverity::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn forge_error_categories() {
        assert_eq!(ForgeError::Config("x".into()).category(), ErrorCategory::ConfigError);
        assert_eq!(ForgeError::Validation("x".into()).category(), ErrorCategory::UserError);
        assert_eq!(ForgeError::Wallet("x".into()).category(), ErrorCategory::WalletError);
        assert_eq!(ForgeError::Explorer("x".into()).category(), ErrorCategory::NetworkError);
    }

    #[test]
    fn wallet_message_is_shown_verbatim() {
        let err = ForgeError::Wallet("nonce too low".into());
        assert_eq!(err.user_message(), "Error: nonce too low");
    }

    #[test]
    fn internal_message_hides_details() {
        let err = ForgeError::Internal("poisoned lock at 0xdead".into());
        assert_eq!(err.user_message(), "An unexpected error occurred.");
    }

    #[test]
    fn classify_insufficient_funds() {
        let err = anyhow!("server returned an error response: insufficient funds for gas * price + value");
        let classified = classify_error(&err);
        assert_eq!(classified.category, ClassifiedCategory::InsufficientFunds);
        assert_eq!(classified.severity, ErrorSeverity::High);
    }

    #[test]
    fn classify_rejected() {
        let classified = classify_error(&anyhow!("User rejected the request."));
        assert_eq!(classified.category, ClassifiedCategory::Rejected);
        assert_eq!(classified.severity, ErrorSeverity::Low);
    }

    #[test]
    fn classify_reverted() {
        let classified = classify_error(&anyhow!("execution reverted: Insufficient fee"));
        assert_eq!(classified.category, ClassifiedCategory::Reverted);
    }

    #[test]
    fn classify_network_through_context_chain() {
        let err = anyhow!("connection refused").context("Failed to read creation fee");
        let classified = classify_error(&err);
        assert_eq!(classified.category, ClassifiedCategory::Network);
        // The top-level message is preserved as-is.
        assert_eq!(classified.message, "Failed to read creation fee");
    }

    #[test]
    fn classify_rate_limit() {
        let classified = classify_error(&anyhow!("HTTP 429 Too Many Requests"));
        assert_eq!(classified.category, ClassifiedCategory::RateLimit);
    }

    #[test]
    fn classify_configuration() {
        let classified = classify_error(&anyhow!("Config error: invalid app_url"));
        assert_eq!(classified.category, ClassifiedCategory::Configuration);
    }

    #[test]
    fn typed_error_wins_over_message_patterns() {
        // "connection" would match the network pattern; the typed error decides.
        let err = anyhow::Error::from(ForgeError::Validation("Please fill in all required fields".into()))
            .context("connection setup");
        let classified = classify_error(&err);
        assert_eq!(classified.category, ClassifiedCategory::Input);
        assert_eq!(classified.severity, ErrorSeverity::Low);
        assert_eq!(classified.user_message, "Please fill in all required fields");
        assert_eq!(classified.message, "connection setup");
    }

    #[test]
    fn typed_wallet_error_keeps_wallet_text() {
        let err = anyhow::Error::from(ForgeError::Wallet("insufficient funds for gas".into()));
        let classified = classify_error(&err);
        assert_eq!(classified.category, ClassifiedCategory::Wallet);
        assert_eq!(classified.user_message, "Error: insufficient funds for gas");
    }

    #[test]
    fn classify_fallback_is_recoverable() {
        let classified = classify_error(&anyhow!("something else entirely"));
        assert_eq!(classified.category, ClassifiedCategory::Internal);
        assert!(classified.recoverable);
        assert_eq!(classified.user_message, "An unexpected error occurred.");
    }
}
