//! Answer synthesis: one submission value set per field per round.

use crate::fields::{FieldDescriptor, FieldKind};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

/// Length of fallback random answers.
pub const RANDOM_TEXT_LEN: usize = 10;

const FIRST_NAMES: &[&str] = &[
    "Alex", "Sam", "Jordan", "Taylor", "Priya", "Diego", "Mei", "Omar",
];
const STREET_NAMES: &[&str] = &["Oak", "Maple", "Cedar", "Elm", "Sunset", "Lakeview"];
const STREET_KINDS: &[&str] = &["St", "Ave", "Rd", "Ln"];

/// How free-text answers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    /// Random alphanumeric text.
    Random,
    /// Keyword heuristics over the question text.
    Contextual,
    /// Delegate to an external text generator.
    Generated,
}

/// Failure of the external text generator. Never fails a round — the
/// affected field falls back to random text.
#[derive(Debug)]
pub struct GeneratorError(pub String);

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Text generation failed: {}", self.0)
    }
}

impl std::error::Error for GeneratorError {}

/// The narrow interface behind which any text-generation collaborator sits.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// Produces one value set per field per round.
pub struct Synthesizer<'a> {
    mode: AnswerMode,
    generator: Option<&'a dyn TextGenerator>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(mode: AnswerMode) -> Self {
        Self {
            mode,
            generator: None,
        }
    }

    pub fn with_generator(mode: AnswerMode, generator: &'a dyn TextGenerator) -> Self {
        Self {
            mode,
            generator: Some(generator),
        }
    }

    /// The values submitted for `field` this round. Usually one; checkbox
    /// groups may contribute several pairs.
    pub fn answers_for(&self, field: &FieldDescriptor) -> Vec<String> {
        match &field.kind {
            FieldKind::Fixed {
                preset: Some(value),
            } => vec![value.clone()],
            FieldKind::Fixed { preset: None } => vec![self.text_answer(field)],
            FieldKind::SingleChoice { options } => pick_one(options),
            FieldKind::MultiChoice { options } => pick_subset(options),
            FieldKind::Text => vec![self.text_answer(field)],
        }
    }

    fn text_answer(&self, field: &FieldDescriptor) -> String {
        match self.mode {
            AnswerMode::Random => random_text(RANDOM_TEXT_LEN),
            AnswerMode::Contextual => {
                let hint = field.question.as_deref().unwrap_or(&field.name);
                contextual_answer(hint).unwrap_or_else(|| random_text(RANDOM_TEXT_LEN))
            }
            AnswerMode::Generated => {
                let prompt = answer_prompt(&field.name, field.question.as_deref());
                self.generator
                    .and_then(|g| g.generate(&prompt).ok())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| random_text(RANDOM_TEXT_LEN))
            }
        }
    }
}

/// Prompt handed to the external generator for one free-text field.
pub fn answer_prompt(name: &str, question: Option<&str>) -> String {
    match question {
        Some(q) => format!(
            "Give a short, realistic answer to the form question \"{}\". Reply with the answer only.",
            q
        ),
        None => format!(
            "Give a short, realistic value for a form field named \"{}\". Reply with the value only.",
            name
        ),
    }
}

/// A plausible literal for a question matching a known keyword, if any.
pub fn contextual_answer(hint: &str) -> Option<String> {
    let hint = hint.to_lowercase();
    let mut rng = rand::thread_rng();

    if hint.contains("email") {
        Some(format!("{}@gmail.com", random_word(&mut rng, 8)))
    } else if hint.contains("phone") {
        Some(format!(
            "{}-{}-{}",
            rng.gen_range(200..=999),
            rng.gen_range(100..=999),
            rng.gen_range(1000..=9999),
        ))
    } else if hint.contains("address") {
        Some(format!(
            "{} {} {}",
            rng.gen_range(1..=9999),
            STREET_NAMES.choose(&mut rng)?,
            STREET_KINDS.choose(&mut rng)?,
        ))
    } else if hint.contains("age") {
        Some(rng.gen_range(18..=80).to_string())
    } else if hint.contains("name") {
        FIRST_NAMES.choose(&mut rng).map(|s| s.to_string())
    } else {
        None
    }
}

/// Random alphanumeric text drawn from letters and digits.
pub fn random_text(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn random_word(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

fn pick_one(options: &[String]) -> Vec<String> {
    let mut rng = rand::thread_rng();
    options.choose(&mut rng).cloned().into_iter().collect()
}

/// A uniformly random non-empty subset. The original collapsed checkbox
/// groups to a single value; submitting a subset matches what the form
/// structurally accepts.
fn pick_subset(options: &[String]) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut chosen: Vec<String> = options
        .iter()
        .filter(|_| rng.gen_bool(0.5))
        .cloned()
        .collect();
    if chosen.is_empty() {
        if let Some(one) = options.choose(&mut rng) {
            chosen.push(one.clone());
        }
    }
    chosen
}
