//! Safety and risk classification for Hearth.
//!
//! [`WellbeingGuard`] gates every utterance exchanged with a participant:
//!
//! - [`WellbeingGuard::assess_wellbeing`] classifies text across twelve
//!   concern categories with boundary-aware weighted indicator matching and
//!   a fixed crisis-response policy (988 / 911 / Elder Abuse Hotline);
//! - [`WellbeingGuard::detect_scam`] independently evaluates the ten
//!   elder-fraud archetypes.
//!
//! Both are pure, synchronous functions over read-only pattern tables
//! compiled at construction: no IO, no locking, safe to run inline on the
//! request path. Matcher failures degrade to a slower scan with a warning;
//! this crate never fails or blocks a conversation turn.

mod matcher;
mod scam;
mod wellbeing;

pub use wellbeing::WellbeingGuard;
