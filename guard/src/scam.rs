//! Elder-fraud scam detection.
//!
//! Runs independently of the wellbeing categories: a transcript can be
//! emotionally unremarkable and still describe a scam in progress. Each of
//! the ten archetypes keeps its own weighted indicator list and detection
//! threshold, so one mention of a grandchild does not flag a conversation
//! but a grandchild plus bail money does.

use hearth_types::{ScamAssessment, ScamType, Severity};

use crate::matcher::PhraseSet;

struct ScamIndicator {
    phrase: &'static str,
    weight: f32,
}

const fn ind(phrase: &'static str, weight: f32) -> ScamIndicator {
    ScamIndicator { phrase, weight }
}

/// An archetype is reported once its matched weights reach this sum.
const DETECTION_THRESHOLD: f32 = 1.0;

fn indicators(scam_type: ScamType) -> &'static [ScamIndicator] {
    match scam_type {
        ScamType::GrandparentEmergency => const {
            &[
                ind("grandchild", 0.6),
                ind("grandson", 0.6),
                ind("granddaughter", 0.6),
                ind("bail money", 0.9),
                ind("needs bail", 0.9),
                ind("in jail", 0.5),
                ind("in trouble and needs money", 0.8),
                ind("don't tell mom", 0.6),
                ind("don't tell your", 0.6),
                ind("keep it a secret", 0.5),
            ]
        },
        ScamType::GovernmentImpersonation => const {
            &[
                ind("irs", 0.7),
                ind("social security administration", 0.7),
                ind("social security number suspended", 1.0),
                ind("warrant for your arrest", 1.0),
                ind("warrant for my arrest", 1.0),
                ind("back taxes", 0.6),
                ind("legal action against you", 0.7),
                ind("badge number", 0.5),
            ]
        },
        ScamType::TechSupport => const {
            &[
                ind("computer has a virus", 0.9),
                ind("computer is infected", 0.9),
                ind("microsoft support", 0.8),
                ind("remote access", 0.7),
                ind("pop-up said to call", 0.8),
                ind("refund department", 0.5),
            ]
        },
        ScamType::MoneyWireRequest => const {
            &[
                ind("wire transfer", 0.7),
                ind("wire money", 0.8),
                ind("western union", 0.7),
                ind("moneygram", 0.7),
                ind("send money right away", 0.9),
                ind("send money immediately", 0.9),
            ]
        },
        ScamType::LotterySweepstakes => const {
            &[
                ind("won the lottery", 0.8),
                ind("sweepstakes", 0.7),
                ind("claim your prize", 0.8),
                ind("claim my prize", 0.8),
                ind("processing fee", 0.6),
                ind("pay taxes on the winnings", 0.8),
            ]
        },
        ScamType::RomanceScam => const {
            &[
                ind("met online", 0.5),
                ind("never met in person", 0.6),
                ind("asked me for money", 0.7),
                ind("needs money for a plane ticket", 0.9),
                ind("stuck overseas", 0.6),
                ind("says he loves me", 0.4),
                ind("says she loves me", 0.4),
            ]
        },
        ScamType::CharityFraud => const {
            &[
                ind("charity called", 0.6),
                ind("donate over the phone", 0.7),
                ind("donation right now", 0.6),
                ind("gave them my card number", 0.6),
                ind("won't say what charity", 0.7),
            ]
        },
        ScamType::MedicareInsurance => const {
            &[
                ind("new medicare card", 0.7),
                ind("verify your medicare", 0.8),
                ind("verify my medicare", 0.8),
                ind("medicare number over the phone", 0.9),
                ind("insurance called asking", 0.6),
            ]
        },
        ScamType::InvestmentFraud => const {
            &[
                ind("guaranteed returns", 0.8),
                ind("double your money", 0.8),
                ind("double my money", 0.8),
                ind("can't lose", 0.6),
                ind("crypto investment", 0.7),
                ind("once in a lifetime opportunity", 0.6),
            ]
        },
        ScamType::GiftCardPayment => const {
            &[
                ind("pay with gift cards", 1.0),
                ind("buy gift cards", 0.8),
                ind("itunes cards", 0.8),
                ind("google play cards", 0.8),
                ind("read the numbers on the back", 0.9),
            ]
        },
    }
}

struct ArchetypeMatcher {
    scam_type: ScamType,
    indicators: &'static [ScamIndicator],
    phrases: PhraseSet,
}

/// Compiled detector over all ten archetypes. Read-only after construction.
pub(crate) struct ScamDetector {
    archetypes: Vec<ArchetypeMatcher>,
}

impl ScamDetector {
    pub(crate) fn new() -> Self {
        let archetypes = ScamType::all()
            .iter()
            .map(|&scam_type| {
                let table = indicators(scam_type);
                ArchetypeMatcher {
                    scam_type,
                    indicators: table,
                    phrases: PhraseSet::new(table.iter().map(|i| i.phrase).collect()),
                }
            })
            .collect();
        Self { archetypes }
    }

    /// Evaluate every archetype; the highest-risk detection wins. Risk level
    /// comes from the archetype ([`ScamType::base_risk`]), not the weights;
    /// weights only decide whether the archetype fired at all.
    pub(crate) fn detect(&self, text: &str) -> ScamAssessment {
        let mut best: Option<(Severity, f32, ScamType, Vec<String>)> = None;

        for matcher in &self.archetypes {
            let hits = matcher.phrases.matches(text);
            if hits.is_empty() {
                continue;
            }

            let weight: f32 = hits.iter().map(|&i| matcher.indicators[i].weight).sum();
            if weight < DETECTION_THRESHOLD {
                continue;
            }

            let risk = matcher.scam_type.base_risk();
            let replace = match &best {
                None => true,
                Some((best_risk, best_weight, ..)) => {
                    (risk, weight) > (*best_risk, *best_weight)
                }
            };
            if replace {
                let evidence = hits
                    .iter()
                    .map(|&i| matcher.indicators[i].phrase.to_string())
                    .collect();
                best = Some((risk, weight, matcher.scam_type, evidence));
            }
        }

        match best {
            Some((risk, _, scam_type, evidence)) => ScamAssessment {
                detected: true,
                scam_type: Some(scam_type),
                risk_level: risk,
                evidence,
            },
            None => ScamAssessment::clear(),
        }
    }
}
