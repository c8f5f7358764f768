pub mod config;
pub mod error_handler;
pub mod logging;
pub mod notifications;

pub use config::{EnvOverrides, FeePolicyKind, ForgeConfig};
pub use error_handler::{
    classify_error, ClassifiedCategory, ClassifiedError, ErrorCategory, ErrorSeverity, ForgeError,
};
pub use notifications::{Notification, NotificationCenter, NotificationKind};
