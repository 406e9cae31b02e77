//! Severity levels and the score/confidence mappings that feed them.
//!
//! The boundaries below are part of the public contract: a finding's
//! `severity` must always agree with its `score` under [`Severity::from_score`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

crate::simple_display! {
    Severity {
        Info => "INFO",
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

impl Severity {
    /// Map a 0-10 score onto a severity band.
    ///
    /// CRITICAL [9,10], HIGH [7,9), MEDIUM [4,7), LOW (0,4), INFO == 0.
    /// Scores outside 0..=10 are clamped before mapping.
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, 10.0);
        if score <= 0.0 {
            Self::Info
        } else if score < 4.0 {
            Self::Low
        } else if score < 7.0 {
            Self::Medium
        } else if score < 9.0 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Parse a tool-reported severity label, case-insensitively. Any label
    /// this crate doesn't recognize maps to `MEDIUM` rather than failing the
    /// whole finding — a single adapter's unfamiliar vocabulary should not
    /// block aggregation.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Self::Critical,
            "HIGH" => Self::High,
            "MEDIUM" | "MODERATE" | "WARNING" => Self::Medium,
            "LOW" => Self::Low,
            "INFO" | "INFORMATIONAL" | "NOTE" => Self::Info,
            _ => Self::Medium,
        }
    }

    /// Representative numeric score for a severity band, used when an
    /// adapter only reports a coarse label.
    pub fn default_score(self) -> f64 {
        match self {
            Self::Critical => 9.5,
            Self::High => 7.5,
            Self::Medium => 5.0,
            Self::Low => 2.0,
            Self::Info => 0.0,
        }
    }

    /// Representative confidence (0-100) for a severity band when an adapter
    /// reports severity but not confidence, generalized from the way
    /// individual SAST adapters in the original implementation hardcoded
    /// per-severity confidence tables.
    pub fn default_confidence(self) -> u8 {
        match self {
            Self::Critical => 90,
            Self::High => 85,
            Self::Medium => 75,
            Self::Low => 70,
            Self::Info => 60,
        }
    }
}

/// Convenience wrapper used by adapters that only have a label, not a score.
pub fn default_confidence_for_level(label: &str) -> u8 {
    Severity::from_label(label).default_confidence()
}
