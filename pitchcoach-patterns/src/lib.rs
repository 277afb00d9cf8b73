//! Static phrase-pattern library for sales coaching detection
//!
//! Two keyed pattern sets drive the incremental scanner: objection phrases
//! matched against counterpart turns and technique phrases matched against
//! trainee turns. Matching is lower-cased substring/prefix matching only;
//! the tables are the entire "model".

use serde::{Deserialize, Serialize};

/// Objection categories attributed to counterpart turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectionCategory {
    Price,
    Timing,
    Authority,
    Need,
}

impl ObjectionCategory {
    pub const ALL: [ObjectionCategory; 4] = [
        ObjectionCategory::Price,
        ObjectionCategory::Timing,
        ObjectionCategory::Authority,
        ObjectionCategory::Need,
    ];

    /// Lower-cased substrings that signal this objection
    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            ObjectionCategory::Price => &[
                "too expensive",
                "can't afford",
                "cannot afford",
                "over budget",
                "costs too much",
                "price is too high",
                "cheaper option",
            ],
            ObjectionCategory::Timing => &[
                "not a good time",
                "not right now",
                "maybe next quarter",
                "call me later",
                "too busy right now",
                "revisit this later",
            ],
            ObjectionCategory::Authority => &[
                "talk to my boss",
                "check with my manager",
                "not my decision",
                "need approval",
                "run it by",
                "ask my spouse",
            ],
            ObjectionCategory::Need => &[
                "don't need",
                "not interested",
                "already have a provider",
                "doing fine without",
                "don't see the value",
                "not a priority",
            ],
        }
    }

    /// Representative phrase used in feedback messages
    pub fn example_phrase(&self) -> &'static str {
        self.phrases()[0]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ObjectionCategory::Price => "price",
            ObjectionCategory::Timing => "timing",
            ObjectionCategory::Authority => "authority",
            ObjectionCategory::Need => "need",
        }
    }
}

/// Persuasion techniques attributed to trainee turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechniqueCategory {
    EmpathyFraming,
    SocialProof,
    Urgency,
    ActiveListening,
    OpenEndedQuestion,
}

impl TechniqueCategory {
    pub const ALL: [TechniqueCategory; 5] = [
        TechniqueCategory::EmpathyFraming,
        TechniqueCategory::SocialProof,
        TechniqueCategory::Urgency,
        TechniqueCategory::ActiveListening,
        TechniqueCategory::OpenEndedQuestion,
    ];

    /// Lower-cased substrings that signal this technique
    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            TechniqueCategory::EmpathyFraming => &[
                "i understand",
                "i hear you",
                "that makes sense",
                "i can see why",
                "completely understandable",
            ],
            TechniqueCategory::SocialProof => &[
                "other customers",
                "our clients",
                "businesses like yours",
                "your neighbors",
                "companies in your area",
            ],
            TechniqueCategory::Urgency => &[
                "limited time",
                "this week only",
                "before the season",
                "spots are filling",
                "price goes up",
            ],
            TechniqueCategory::ActiveListening => &[
                "so what you're saying",
                "if i heard you right",
                "to make sure i understand",
                "let me repeat that back",
                "sounds like you",
            ],
            TechniqueCategory::OpenEndedQuestion => &[
                "tell me about",
                "walk me through",
                "can you describe",
            ],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TechniqueCategory::EmpathyFraming => "empathy framing",
            TechniqueCategory::SocialProof => "social proof",
            TechniqueCategory::Urgency => "urgency",
            TechniqueCategory::ActiveListening => "active listening",
            TechniqueCategory::OpenEndedQuestion => "open-ended questioning",
        }
    }

    /// Label suffix used in feedback category strings
    pub fn label(&self) -> &'static str {
        match self {
            TechniqueCategory::EmpathyFraming => "empathy-framing",
            TechniqueCategory::SocialProof => "social-proof",
            TechniqueCategory::Urgency => "urgency",
            TechniqueCategory::ActiveListening => "active-listening",
            TechniqueCategory::OpenEndedQuestion => "open-ended-question",
        }
    }
}

impl ObjectionCategory {
    /// Label suffix used in feedback category strings
    pub fn label(&self) -> &'static str {
        self.display_name()
    }
}

/// Prefixes that mark a trainee turn as an open-ended question regardless
/// of keyword hits
pub const INTERROGATIVE_OPENERS: &[&str] = &[
    "how ",
    "what ",
    "why ",
    "when ",
    "where ",
    "who ",
    "which ",
    "tell me",
    "walk me through",
    "can you describe",
    "could you walk",
];

/// Which side of the talk-time band was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImbalanceDirection {
    AboveBand,
    BelowBand,
}

/// Every detection the engine can produce, including the metrics-derived
/// talk-time warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionCategory {
    Objection(ObjectionCategory),
    Technique(TechniqueCategory),
    TalkTimeImbalance,
}

impl DetectionCategory {
    /// Category string carried on emitted feedback items
    pub fn label(&self) -> String {
        match self {
            DetectionCategory::Objection(c) => format!("objection:{}", c.label()),
            DetectionCategory::Technique(c) => format!("technique:{}", c.label()),
            DetectionCategory::TalkTimeImbalance => "talk-time-imbalance".to_string(),
        }
    }

    /// Recurring categories are cooldown-suppressed instead of keyed on the
    /// originating turn
    pub fn is_recurring(&self) -> bool {
        matches!(self, DetectionCategory::TalkTimeImbalance)
    }

    pub fn severity(&self) -> Severity {
        match self {
            DetectionCategory::Objection(_) => Severity::Neutral,
            DetectionCategory::Technique(_) => Severity::Positive,
            DetectionCategory::TalkTimeImbalance => Severity::NeedsImprovement,
        }
    }

    /// Human-readable message for an emitted feedback item
    pub fn message(&self, direction: Option<ImbalanceDirection>) -> String {
        match self {
            DetectionCategory::Objection(c) => format!(
                "{} objection detected: \"{}\"",
                c.display_name(),
                c.example_phrase()
            ),
            DetectionCategory::Technique(c) => {
                format!("Great use of {}!", c.display_name())
            }
            DetectionCategory::TalkTimeImbalance => {
                match direction.unwrap_or(ImbalanceDirection::AboveBand) {
                    ImbalanceDirection::AboveBand => {
                        "You're doing most of the talking. Pause and ask the customer a question."
                            .to_string()
                    }
                    ImbalanceDirection::BelowBand => {
                        "The customer is carrying the conversation. Step back in and guide the pitch."
                            .to_string()
                    }
                }
            }
        }
    }
}

impl std::fmt::Display for DetectionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Severity of an emitted feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Positive,
    Neutral,
    NeedsImprovement,
}
