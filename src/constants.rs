//! Global Constants
//!
//! Centralized defaults for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Provider chain constants
pub mod chain {
    /// Default retries per provider after the first attempt
    pub const DEFAULT_MAX_RETRIES: u8 = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (milliseconds)
    pub const MAX_DELAY_MS: u64 = 30_000;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Longest accepted provider answer (characters)
    pub const MAX_RESPONSE_CHARS: usize = 200_000;
}

/// Generation request constants
pub mod generation {
    /// Default completion token limit
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;

    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Default per-call provider timeout (milliseconds)
    pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;
}

/// Response parser constants
pub mod parser {
    /// Content used for sections the provider did not supply (lenient mode)
    pub const PLACEHOLDER: &str = "Not specified";

    /// Longest line still considered a heading candidate (characters)
    pub const MAX_HEADING_CHARS: usize = 80;

    /// Longest label accepted in `Label: value` lines (words)
    pub const MAX_LABEL_WORDS: usize = 6;

    /// Longest title taken from free text (characters)
    pub const MAX_TITLE_CHARS: usize = 120;
}

/// Classification constants
pub mod classification {
    /// Multiplier deriving a missing budget bound from the known one
    pub const BUDGET_MULTIPLIER: f64 = 3.0;

    /// Default risk bands: below this max budget the risk is Low
    pub const DEFAULT_LOW_BELOW: u64 = 10_000;

    /// Default risk bands: at or above this max budget the risk is High
    pub const DEFAULT_HIGH_FROM: u64 = 50_000;
}

/// HTTP/Network constants
pub mod network {
    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
