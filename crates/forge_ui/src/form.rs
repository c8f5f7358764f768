use alloy::primitives::U256;
use forge_chain::TokenCreationRequest;
pub use forge_core::config::DEFAULT_SYMBOL_MAX_LEN;

/// Quick-fill buttons under the supply field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyPreset {
    OneMillion,
    FiveMillion,
    HundredMillion,
    OneBillion,
}

impl SupplyPreset {
    pub const ALL: [SupplyPreset; 4] = [
        SupplyPreset::OneMillion,
        SupplyPreset::FiveMillion,
        SupplyPreset::HundredMillion,
        SupplyPreset::OneBillion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OneMillion => "1M",
            Self::FiveMillion => "5M",
            Self::HundredMillion => "100M",
            Self::OneBillion => "1B",
        }
    }

    /// The text written into the supply field.
    pub fn value(self) -> &'static str {
        match self {
            Self::OneMillion => "1000000",
            Self::FiveMillion => "5000000",
            Self::HundredMillion => "100000000",
            Self::OneBillion => "1000000000",
        }
    }
}

/// Why the form could not produce a request. The display text is the status
/// line shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingRequired,
    #[error("Initial supply must be a positive whole number")]
    InvalidSupply,
    #[error("Image URI must be an http(s) URL")]
    InvalidImageUri,
}

/// Raw text of the four inputs, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenForm {
    pub name: String,
    pub symbol: String,
    pub initial_supply: String,
    pub image_uri: String,
    symbol_max_len: usize,
}

impl TokenForm {
    pub fn new() -> Self {
        Self::with_symbol_max_len(DEFAULT_SYMBOL_MAX_LEN)
    }

    pub fn with_symbol_max_len(symbol_max_len: usize) -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            initial_supply: String::new(),
            image_uri: String::new(),
            symbol_max_len: symbol_max_len.max(1),
        }
    }

    pub fn symbol_max_len(&self) -> usize {
        self.symbol_max_len
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Every edit is upper-cased, then truncated to the maximum length.
    pub fn set_symbol(&mut self, symbol: &str) {
        self.symbol = normalize_symbol(symbol, self.symbol_max_len);
    }

    pub fn set_initial_supply(&mut self, supply: impl Into<String>) {
        self.initial_supply = supply.into();
    }

    pub fn set_image_uri(&mut self, uri: impl Into<String>) {
        self.image_uri = uri.into();
    }

    pub fn apply_preset(&mut self, preset: SupplyPreset) {
        self.initial_supply = preset.value().to_string();
    }

    /// Whether the three required fields have content.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.symbol.trim().is_empty()
            && !self.initial_supply.trim().is_empty()
    }

    /// Build the request the submitter sends. Never touches the network.
    pub fn validate(&self) -> Result<TokenCreationRequest, ValidationError> {
        if !self.is_complete() {
            return Err(ValidationError::MissingRequired);
        }

        let initial_supply = parse_supply(&self.initial_supply)?;
        let image_uri = self.image_uri.trim();
        if !image_uri.is_empty() && !is_http_url(image_uri) {
            return Err(ValidationError::InvalidImageUri);
        }

        Ok(TokenCreationRequest {
            name: self.name.trim().to_string(),
            symbol: normalize_symbol(self.symbol.trim(), self.symbol_max_len),
            initial_supply,
            image_uri: image_uri.to_string(),
        })
    }

    /// Clear the inputs, keeping the symbol limit.
    pub fn clear(&mut self) {
        *self = Self::with_symbol_max_len(self.symbol_max_len);
    }
}

impl Default for TokenForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper-case, then keep at most `max_len` characters.
pub fn normalize_symbol(raw: &str, max_len: usize) -> String {
    raw.to_uppercase().chars().take(max_len).collect()
}

fn parse_supply(raw: &str) -> Result<U256, ValidationError> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidSupply);
    }
    let supply =
        U256::from_str_radix(digits, 10).map_err(|_| ValidationError::InvalidSupply)?;
    if supply.is_zero() {
        return Err(ValidationError::InvalidSupply);
    }
    Ok(supply)
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_uppercased_then_truncated() {
        assert_eq!(normalize_symbol("tkn", 15), "TKN");
        assert_eq!(normalize_symbol("abcdefghijklmnopq", 15), "ABCDEFGHIJKLMNO");
        assert_eq!(normalize_symbol("straße", 15), "STRASSE");
    }

    #[test]
    fn supply_must_be_positive_digits() {
        assert_eq!(parse_supply("1000000"), Ok(U256::from(1_000_000u64)));
        assert_eq!(parse_supply(" 42 "), Ok(U256::from(42u64)));
        assert_eq!(parse_supply("0"), Err(ValidationError::InvalidSupply));
        assert_eq!(parse_supply("-5"), Err(ValidationError::InvalidSupply));
        assert_eq!(parse_supply("1e6"), Err(ValidationError::InvalidSupply));
        assert_eq!(parse_supply("1.5"), Err(ValidationError::InvalidSupply));
        // Larger than U256.
        assert_eq!(parse_supply(&"9".repeat(90)), Err(ValidationError::InvalidSupply));
    }

    #[test]
    fn image_uri_scheme() {
        assert!(is_http_url("https://example.com/logo.png"));
        assert!(is_http_url("http://example.com"));
        assert!(!is_http_url("ipfs://bafy"));
        assert!(!is_http_url("not a url"));
    }
}
