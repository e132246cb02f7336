//! Wellbeing and scam assessment types.
//!
//! These are the outputs of the safety classifier that gates every utterance
//! exchanged with a participant. The classifier itself lives in
//! `hearth-guard`; the types are here so the engine can gate content without
//! depending on the classifier internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Severity;

/// The twelve concern categories the wellbeing classifier reports.
///
/// This is a closed set: the classifier, the response policy, and the
/// escalation rules all match exhaustively over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernCategory {
    SuicidalIdeation,
    SelfHarm,
    MedicalEmergency,
    Abuse,
    Neglect,
    Depression,
    Anxiety,
    Loneliness,
    Grief,
    CognitiveDecline,
    FinancialDistress,
    Disorientation,
}

impl ConcernCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConcernCategory::SuicidalIdeation => "suicidal_ideation",
            ConcernCategory::SelfHarm => "self_harm",
            ConcernCategory::MedicalEmergency => "medical_emergency",
            ConcernCategory::Abuse => "abuse",
            ConcernCategory::Neglect => "neglect",
            ConcernCategory::Depression => "depression",
            ConcernCategory::Anxiety => "anxiety",
            ConcernCategory::Loneliness => "loneliness",
            ConcernCategory::Grief => "grief",
            ConcernCategory::CognitiveDecline => "cognitive_decline",
            ConcernCategory::FinancialDistress => "financial_distress",
            ConcernCategory::Disorientation => "disorientation",
        }
    }

    /// Categories that force an emergency response regardless of weighting.
    #[must_use]
    pub const fn is_crisis(self) -> bool {
        matches!(
            self,
            ConcernCategory::SuicidalIdeation
                | ConcernCategory::MedicalEmergency
                | ConcernCategory::Abuse
        )
    }

    /// Mood categories eligible for prior-emotional-state escalation.
    #[must_use]
    pub const fn is_mood(self) -> bool {
        matches!(
            self,
            ConcernCategory::Depression
                | ConcernCategory::Anxiety
                | ConcernCategory::Loneliness
                | ConcernCategory::Grief
        )
    }

    #[must_use]
    pub const fn all() -> &'static [ConcernCategory] {
        &[
            ConcernCategory::SuicidalIdeation,
            ConcernCategory::SelfHarm,
            ConcernCategory::MedicalEmergency,
            ConcernCategory::Abuse,
            ConcernCategory::Neglect,
            ConcernCategory::Depression,
            ConcernCategory::Anxiety,
            ConcernCategory::Loneliness,
            ConcernCategory::Grief,
            ConcernCategory::CognitiveDecline,
            ConcernCategory::FinancialDistress,
            ConcernCategory::Disorientation,
        ]
    }
}

impl std::fmt::Display for ConcernCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the interviewer should respond to the current utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Nothing detected; continue the interview normally.
    #[default]
    Continue,
    /// Acknowledge the feeling, stay on topic.
    Supportive,
    /// Steer gently toward a safer topic.
    Redirect,
    /// Pause the interview and check how the participant is doing.
    CheckIn,
    /// Crisis detected; surface resources immediately.
    Emergency,
}

impl ResponseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResponseType::Continue => "continue",
            ResponseType::Supportive => "supportive",
            ResponseType::Redirect => "redirect",
            ResponseType::CheckIn => "check_in",
            ResponseType::Emergency => "emergency",
        }
    }
}

/// A single detected concern with its supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concern {
    pub category: ConcernCategory,
    /// The matched indicator phrases, verbatim.
    pub evidence: Vec<String>,
    /// Classifier confidence in [0, 1].
    pub confidence: f32,
}

/// Full wellbeing classification of one utterance.
///
/// Invariants upheld by the classifier:
/// - `overall_risk` equals the max severity across `concerns`;
/// - `suggested_response` is non-empty whenever `concerns` is non-empty;
/// - crisis categories force `response_type == Emergency`,
///   `requires_immediate_action`, and the fixed resource string for that
///   category ("988", "911", or the Elder Abuse Hotline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellbeingAssessment {
    pub overall_risk: Severity,
    pub concerns: Vec<Concern>,
    pub response_type: ResponseType,
    pub suggested_response: String,
    pub risk_justification: String,
    /// Aggregate confidence in [0, 1].
    pub confidence: f32,
    pub requires_immediate_action: bool,
    pub recommended_actions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl WellbeingAssessment {
    /// Assessment for text with no detected concerns.
    #[must_use]
    pub fn clear() -> Self {
        Self {
            overall_risk: Severity::None,
            concerns: Vec::new(),
            response_type: ResponseType::Continue,
            suggested_response: String::new(),
            risk_justification: "No wellbeing concerns detected.".to_string(),
            confidence: 1.0,
            requires_immediate_action: false,
            recommended_actions: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// The ten elder-fraud archetypes the scam detector evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScamType {
    GrandparentEmergency,
    GovernmentImpersonation,
    TechSupport,
    MoneyWireRequest,
    LotterySweepstakes,
    RomanceScam,
    CharityFraud,
    MedicareInsurance,
    InvestmentFraud,
    GiftCardPayment,
}

impl ScamType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScamType::GrandparentEmergency => "grandparent_emergency",
            ScamType::GovernmentImpersonation => "government_impersonation",
            ScamType::TechSupport => "tech_support",
            ScamType::MoneyWireRequest => "money_wire_request",
            ScamType::LotterySweepstakes => "lottery_sweepstakes",
            ScamType::RomanceScam => "romance_scam",
            ScamType::CharityFraud => "charity_fraud",
            ScamType::MedicareInsurance => "medicare_insurance",
            ScamType::InvestmentFraud => "investment_fraud",
            ScamType::GiftCardPayment => "gift_card_payment",
        }
    }

    /// Risk level assigned when this archetype matches.
    ///
    /// Grandparent-emergency and government-impersonation scams target the
    /// platform's population directly and are critical by design.
    #[must_use]
    pub const fn base_risk(self) -> Severity {
        match self {
            ScamType::GrandparentEmergency | ScamType::GovernmentImpersonation => {
                Severity::Critical
            }
            _ => Severity::High,
        }
    }

    #[must_use]
    pub const fn all() -> &'static [ScamType] {
        &[
            ScamType::GrandparentEmergency,
            ScamType::GovernmentImpersonation,
            ScamType::TechSupport,
            ScamType::MoneyWireRequest,
            ScamType::LotterySweepstakes,
            ScamType::RomanceScam,
            ScamType::CharityFraud,
            ScamType::MedicareInsurance,
            ScamType::InvestmentFraud,
            ScamType::GiftCardPayment,
        ]
    }
}

impl std::fmt::Display for ScamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the scam sub-detector for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScamAssessment {
    pub detected: bool,
    /// The highest-risk matching archetype, if any.
    pub scam_type: Option<ScamType>,
    pub risk_level: Severity,
    /// The matched indicator phrases, verbatim.
    pub evidence: Vec<String>,
}

impl ScamAssessment {
    /// Assessment for text with no scam indicators.
    #[must_use]
    pub const fn clear() -> Self {
        Self {
            detected: false,
            scam_type: None,
            risk_level: Severity::None,
            evidence: Vec::new(),
        }
    }
}
