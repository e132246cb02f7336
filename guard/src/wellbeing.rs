//! The wellbeing classifier.
//!
//! `assess_wellbeing` is a pure, synchronous function of its input: no IO,
//! no network, no mutable state. It runs inline on every conversation turn
//! and must never fail or block one, so every degradation path ends in a
//! usable assessment.

use chrono::Utc;

use hearth_types::{
    Concern, ConcernCategory, EmotionalTone, ResponseType, ScamAssessment, Severity,
    WellbeingAssessment,
};

use crate::matcher::PhraseSet;
use crate::scam::ScamDetector;

/// One weighted indicator phrase.
struct Indicator {
    phrase: &'static str,
    severity: Severity,
    weight: f32,
}

const fn ind(phrase: &'static str, severity: Severity, weight: f32) -> Indicator {
    Indicator {
        phrase,
        severity,
        weight,
    }
}

/// Indicator table for one concern category.
///
/// Thresholds here are heuristic by nature; the binding contract is the
/// scenario suite in this module's tests, and the table is deliberately
/// broader than that minimum.
fn indicators(category: ConcernCategory) -> &'static [Indicator] {
    use Severity::{Critical, High, Low, Moderate};

    match category {
        ConcernCategory::SuicidalIdeation => const {
            &[
                ind("don't want to live", Critical, 0.9),
                ind("do not want to live", Critical, 0.9),
                ind("want to die", Critical, 0.9),
                ind("wish i was dead", Critical, 0.9),
                ind("wish i were dead", Critical, 0.9),
                ind("end my life", Critical, 0.9),
                ind("kill myself", Critical, 0.9),
                ind("better off dead", Critical, 0.9),
                ind("better off without me", Critical, 0.8),
                ind("end it all", Critical, 0.8),
                ind("no reason to live", Critical, 0.8),
                ind("suicide", Critical, 0.8),
            ]
        },
        ConcernCategory::SelfHarm => const {
            &[
                ind("hurt myself", High, 0.8),
                ind("hurting myself", High, 0.8),
                ind("cut myself", High, 0.8),
                ind("harm myself", High, 0.8),
                ind("stopped taking my pills on purpose", High, 0.7),
            ]
        },
        ConcernCategory::MedicalEmergency => const {
            &[
                ind("chest hurts", Critical, 0.9),
                ind("chest pain", Critical, 0.9),
                ind("can't breathe", Critical, 0.9),
                ind("cannot breathe", Critical, 0.9),
                ind("trouble breathing", Critical, 0.8),
                ind("heart attack", Critical, 0.9),
                ind("having a stroke", Critical, 0.9),
                ind("can't move my arm", Critical, 0.8),
                ind("fell and can't get up", Critical, 0.9),
                ind("bleeding badly", Critical, 0.8),
            ]
        },
        ConcernCategory::Abuse => const {
            &[
                ind("hits me", Critical, 0.9),
                ind("hit me", Critical, 0.8),
                ind("slapped me", Critical, 0.8),
                ind("hurts me", Critical, 0.7),
                ind("threatens me", Critical, 0.8),
                ind("yells at me", High, 0.5),
                ind("afraid of him", High, 0.6),
                ind("afraid of her", High, 0.6),
                ind("takes my money", High, 0.6),
                ind("won't let me leave", Critical, 0.8),
            ]
        },
        ConcernCategory::Neglect => const {
            &[
                ind("no one feeds me", High, 0.8),
                ind("left alone for days", High, 0.7),
                ind("no one checks on me", Moderate, 0.5),
                ind("can't get my medication", High, 0.7),
                ind("nobody takes care of me", High, 0.6),
            ]
        },
        ConcernCategory::Depression => const {
            &[
                ind("feel hopeless", Moderate, 0.6),
                ind("feel worthless", Moderate, 0.6),
                ind("no point anymore", Moderate, 0.6),
                ind("can't enjoy anything", Moderate, 0.5),
                ind("feel empty", Moderate, 0.5),
                ind("sad all the time", Moderate, 0.5),
                ind("crying every day", Moderate, 0.6),
            ]
        },
        ConcernCategory::Anxiety => const {
            &[
                ind("can't stop worrying", Moderate, 0.5),
                ind("so worried", Low, 0.4),
                ind("panic", Moderate, 0.5),
                ind("terrified", Moderate, 0.5),
                ind("anxious all the time", Moderate, 0.5),
            ]
        },
        ConcernCategory::Loneliness => const {
            &[
                ind("so lonely", Moderate, 0.6),
                ind("all alone", Moderate, 0.5),
                ind("no one visits", Moderate, 0.5),
                ind("no one calls", Moderate, 0.5),
                ind("nobody comes to see me", Moderate, 0.6),
                ind("no one to talk to", Moderate, 0.5),
            ]
        },
        ConcernCategory::Grief => const {
            &[
                ind("since he passed", Low, 0.4),
                ind("since she passed", Low, 0.4),
                ind("passed away", Low, 0.4),
                ind("miss him so much", Moderate, 0.5),
                ind("miss her so much", Moderate, 0.5),
                ind("lost my husband", Moderate, 0.5),
                ind("lost my wife", Moderate, 0.5),
            ]
        },
        ConcernCategory::CognitiveDecline => const {
            &[
                ind("can't remember", Moderate, 0.5),
                ind("keep forgetting", Moderate, 0.5),
                ind("memory is getting worse", Moderate, 0.6),
                ind("lost track of the days", Moderate, 0.5),
                ind("couldn't find my way home", High, 0.7),
            ]
        },
        ConcernCategory::FinancialDistress => const {
            &[
                ind("can't afford", Moderate, 0.5),
                ind("out of money", Moderate, 0.6),
                ind("can't pay", Moderate, 0.5),
                ind("bills are piling up", Moderate, 0.5),
                ind("took all my money", High, 0.7),
            ]
        },
        ConcernCategory::Disorientation => const {
            &[
                ind("don't know where i am", High, 0.8),
                ind("what day is it", Moderate, 0.5),
                ind("don't recognize", Moderate, 0.5),
                ind("everything is confusing", Moderate, 0.5),
                ind("don't know how i got here", High, 0.7),
            ]
        },
    }
}

const MAX_CATEGORY_CONFIDENCE: f32 = 0.95;

/// Fixed crisis resources. These literals are part of the response contract
/// and are never omitted or paraphrased away.
const SUICIDE_LIFELINE: &str = "988";
const EMERGENCY_NUMBER: &str = "911";
const ELDER_ABUSE_HOTLINE: &str = "Elder Abuse Hotline";

struct CategoryMatcher {
    category: ConcernCategory,
    indicators: &'static [Indicator],
    phrases: PhraseSet,
}

/// Safety classifier gating every exchanged utterance.
///
/// Construction compiles the indicator tables once; afterwards the guard is
/// `Send + Sync`, holds only read-only state, and may be shared freely
/// across the request path without locking.
pub struct WellbeingGuard {
    categories: Vec<CategoryMatcher>,
    scam: ScamDetector,
}

impl Default for WellbeingGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl WellbeingGuard {
    #[must_use]
    pub fn new() -> Self {
        let categories = ConcernCategory::all()
            .iter()
            .map(|&category| {
                let table = indicators(category);
                CategoryMatcher {
                    category,
                    indicators: table,
                    phrases: PhraseSet::new(table.iter().map(|i| i.phrase).collect()),
                }
            })
            .collect();
        Self {
            categories,
            scam: ScamDetector::new(),
        }
    }

    /// Classify one utterance. Identical input always yields the identical
    /// classification.
    ///
    /// A reliably negative `prior` emotional tone escalates mood-category
    /// findings (depression, anxiety, loneliness, grief) one severity step:
    /// the same words carry more risk from someone already low.
    #[must_use]
    pub fn assess_wellbeing(
        &self,
        text: &str,
        prior: Option<&EmotionalTone>,
    ) -> WellbeingAssessment {
        let escalate_mood = prior.is_some_and(|tone| tone.is_reliably_negative());

        let mut concerns = Vec::new();
        for matcher in &self.categories {
            let hits = matcher.phrases.matches(text);
            if hits.is_empty() {
                continue;
            }

            let mut severity = hits
                .iter()
                .map(|&i| matcher.indicators[i].severity)
                .max()
                .unwrap_or(Severity::Low);
            if escalate_mood && matcher.category.is_mood() {
                severity = severity.escalate();
            }

            let weight: f32 = hits.iter().map(|&i| matcher.indicators[i].weight).sum();
            let evidence = hits
                .iter()
                .map(|&i| matcher.indicators[i].phrase.to_string())
                .collect();

            concerns.push((
                severity,
                Concern {
                    category: matcher.category,
                    evidence,
                    confidence: weight.min(MAX_CATEGORY_CONFIDENCE),
                },
            ));
        }

        if concerns.is_empty() {
            return WellbeingAssessment::clear();
        }

        let overall_risk = concerns
            .iter()
            .map(|(severity, _)| *severity)
            .max()
            .unwrap_or(Severity::None);
        let crisis = concerns
            .iter()
            .find(|(_, concern)| concern.category.is_crisis())
            .map(|(_, concern)| concern.category);

        let worst = concerns
            .iter()
            .max_by(|(sa, ca), (sb, cb)| {
                sa.cmp(sb)
                    .then(ca.confidence.total_cmp(&cb.confidence))
            })
            .map(|(_, concern)| concern.category)
            .unwrap_or(ConcernCategory::Loneliness);

        let response_type = response_type_for(crisis, overall_risk, worst);
        let confidence = concerns
            .iter()
            .map(|(_, concern)| concern.confidence)
            .fold(0.0_f32, f32::max);
        let risk_justification = justification(&concerns, overall_risk);

        WellbeingAssessment {
            overall_risk,
            response_type,
            suggested_response: suggested_response(crisis.unwrap_or(worst)),
            risk_justification,
            confidence,
            requires_immediate_action: crisis.is_some(),
            recommended_actions: recommended_actions(response_type),
            concerns: concerns.into_iter().map(|(_, concern)| concern).collect(),
            timestamp: Utc::now(),
        }
    }

    /// Evaluate the utterance against the ten elder-fraud archetypes.
    #[must_use]
    pub fn detect_scam(&self, text: &str) -> ScamAssessment {
        self.scam.detect(text)
    }
}

fn response_type_for(
    crisis: Option<ConcernCategory>,
    overall: Severity,
    worst: ConcernCategory,
) -> ResponseType {
    if crisis.is_some() {
        return ResponseType::Emergency;
    }
    match overall {
        Severity::High | Severity::Critical => ResponseType::CheckIn,
        Severity::Moderate if !worst.is_mood() => ResponseType::Redirect,
        _ => ResponseType::Supportive,
    }
}

/// The response handed to the voice agent. Never empty, never dismissive;
/// crisis categories carry their fixed resource string.
fn suggested_response(category: ConcernCategory) -> String {
    match category {
        ConcernCategory::SuicidalIdeation | ConcernCategory::SelfHarm => format!(
            "I'm really glad you told me, and I want you to know you matter. \
             Help is available right now: please call or text {SUICIDE_LIFELINE}, \
             the Suicide & Crisis Lifeline. Is there someone nearby who can sit \
             with you while you call?"
        ),
        ConcernCategory::MedicalEmergency => format!(
            "That sounds serious, and I don't want to wait. Please call \
             {EMERGENCY_NUMBER} right now, or press your medical alert button \
             if you have one. I'll let your care contact know as well."
        ),
        ConcernCategory::Abuse | ConcernCategory::Neglect => format!(
            "I'm so sorry that's happening to you. No one should treat you that \
             way. The {ELDER_ABUSE_HOTLINE} at 1-800-677-1116 can help, and \
             everything you tell them is confidential. Would you like to pause \
             while you write that number down?"
        ),
        ConcernCategory::Depression => "Thank you for trusting me with how you're feeling. \
             Those feelings are real and they matter. Would it help to talk about \
             a time that brought you comfort?"
            .to_string(),
        ConcernCategory::Anxiety => "That sounds like a heavy thing to carry. Let's take it \
             slowly, and you can tell me as much or as little as you like."
            .to_string(),
        ConcernCategory::Loneliness => "I'm glad we're talking today. Feeling alone is hard, \
             and your company means a lot to me. Who is someone you've enjoyed \
             spending time with?"
            .to_string(),
        ConcernCategory::Grief => "Losing someone stays with us. Thank you for sharing them \
             with me; I'd be honored to hear more about what made them special."
            .to_string(),
        ConcernCategory::CognitiveDecline | ConcernCategory::Disorientation => {
            "That's all right, memories can be slippery for all of us. Let's stay \
             with whatever feels clear, there's no rush at all."
                .to_string()
        }
        ConcernCategory::FinancialDistress => "Money worries are stressful, and I'm sorry \
             you're dealing with that. It may help to talk it over with someone \
             you trust before making any decisions."
            .to_string(),
    }
}

fn recommended_actions(response_type: ResponseType) -> Vec<String> {
    let actions: &[&str] = match response_type {
        ResponseType::Emergency => &[
            "surface_crisis_resources",
            "notify_care_team",
            "pause_interview",
        ],
        ResponseType::CheckIn => &["notify_care_team", "monitor_closely"],
        ResponseType::Redirect => &["steer_to_safe_topic", "monitor_closely"],
        ResponseType::Supportive => &["monitor_closely"],
        ResponseType::Continue => &[],
    };
    actions.iter().map(|&a| a.to_string()).collect()
}

fn justification(concerns: &[(Severity, Concern)], overall: Severity) -> String {
    let categories: Vec<&str> = concerns
        .iter()
        .map(|(_, concern)| concern.category.as_str())
        .collect();
    format!(
        "{} concern(s) detected ({}); overall risk {}.",
        concerns.len(),
        categories.join(", "),
        overall
    )
}
