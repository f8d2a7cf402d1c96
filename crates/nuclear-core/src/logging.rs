//! Structured logging schema and field name constants.
//!
//! Span fields recorded on the `classify_work` span, so log aggregation can
//! query classification events consistently. Events inside the library tag
//! themselves with literal `subsystem`, `component` and `op` fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Startup failures (bad configuration, unreadable input) |
//! | WARN  | Recoverable issue, automatic fallback applied (synonym lookup) |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points (demotions, background matches) |
//! | TRACE | Per-candidate matching |

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Work UUID being classified.
pub const WORK_ID: &str = "work_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of tags in the classified work.
pub const TAG_COUNT: &str = "tag_count";

/// Number of relationship tags demoted by the cap enforcer.
pub const DEMOTED_COUNT: &str = "demoted";

/// Number of advisories emitted for a work.
pub const ADVISORY_COUNT: &str = "advisories";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Whether the classification degraded to exact matching.
pub const PARTIAL: &str = "partial";
