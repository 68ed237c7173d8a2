//! Shared constants used across the application

/// Substitute assistant reply appended when the reply fetch fails. This is
/// the only user-visible error surface; fetch failures never escape `send`.
pub const FALLBACK_REPLY_TEXT: &str = "Sorry, there was an error fetching the response.";

/// Reply payload read by the default file-backed provider.
pub const DEFAULT_REPLY_FILE: &str = "assets/response.md";

/// Upper bound on the visible height of the input affordance. The editor
/// grows one row per newline in the draft and stops here.
pub const MAX_INPUT_LINES: u16 = 5;

/// Default bound on a single reply fetch. A hung transport produces the
/// fallback reply instead of hanging the session.
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 30;

/// Accessibility label substituted for images that carry no alt text.
pub const DEFAULT_IMAGE_ALT: &str = "image";

/// Images are displayed no wider than this share of the transcript width,
/// whatever dimensions the source claims.
pub const IMAGE_MAX_WIDTH_PCT: u16 = 80;
