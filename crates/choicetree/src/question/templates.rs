//! Question templates.
//!
//! Every template contains exactly one `{left}` and one `{right}` placeholder.

use rand::Rng;

use crate::profile::AttributeType;

/// Conversational stage, from how deep the node sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    /// Depth 0 to 2.
    Broad,
    Neutral,
    /// Depth 4 and below.
    Narrowed,
}

impl Stage {
    pub(crate) fn from_depth(depth: usize) -> Self {
        match depth {
            0..=2 => Self::Broad,
            3 => Self::Neutral,
            _ => Self::Narrowed,
        }
    }
}

/// How the choice is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    /// One dominant attribute.
    Simple,
    /// Several attributes of comparable weight.
    Tradeoff,
    /// One dominant attribute of a known type, phrased without observed data.
    Typed(AttributeType),
}

const BROAD_SIMPLE: &[&str] = &[
    "To start, do you lean toward {left} or {right}?",
    "Which sounds more like you: {left} or {right}?",
    "Let's begin broadly: {left} or {right}?",
];
const NEUTRAL_SIMPLE: &[&str] = &[
    "Do you prefer {left} or {right}?",
    "Would you rather have {left} or {right}?",
];
const NARROWED_SIMPLE: &[&str] = &[
    "Based on your narrowed preferences, would you prefer {left} or {right}?",
    "To narrow it down further: {left} or {right}?",
];

const BROAD_TRADEOFF: &[&str] = &[
    "Which combination appeals to you more: {left}, or {right}?",
    "Thinking broadly, would you pick {left}, or {right}?",
];
const NEUTRAL_TRADEOFF: &[&str] = &[
    "Which tradeoff suits you better: {left}, or {right}?",
    "Would you rather have {left}, or {right}?",
];
const NARROWED_TRADEOFF: &[&str] = &[
    "Given your narrowed preferences, which tradeoff fits: {left}, or {right}?",
    "One more tradeoff: {left}, or {right}?",
];

const BROAD_PRICE: &[&str] = &[
    "To start, what's your budget preference: {left} or {right}?",
    "First, are you shopping for {left} or {right}?",
];
const PRICE: &[&str] = &[
    "What's your budget preference: {left} or {right}?",
    "Are you shopping for {left} or {right}?",
];
const NARROWED_PRICE: &[&str] = &[
    "Based on your narrowed preferences, what's your budget: {left} or {right}?",
    "To narrow it down by price: {left} or {right}?",
];

const BROAD_RATING: &[&str] = &[
    "To start, how much do reviews matter to you: {left} or {right}?",
    "First, which ratings would you accept: {left} or {right}?",
];
const RATING: &[&str] = &[
    "How much do reviews matter to you: {left} or {right}?",
    "Which would you accept: {left} or {right}?",
];
const NARROWED_RATING: &[&str] = &[
    "Based on your narrowed preferences, which ratings would you accept: {left} or {right}?",
    "To narrow it down by reviews: {left} or {right}?",
];

const BROAD_DURATION: &[&str] = &[
    "To start, how quickly do you need it: {left} or {right}?",
    "First, which timing works for you: {left} or {right}?",
];
const DURATION: &[&str] = &[
    "How quickly do you need it: {left} or {right}?",
    "Which timing works for you: {left} or {right}?",
];
const NARROWED_DURATION: &[&str] = &[
    "Based on your narrowed preferences, how quickly do you need it: {left} or {right}?",
    "To narrow it down by timing: {left} or {right}?",
];

const BROAD_COUNT: &[&str] = &[
    "To start, do you prefer {left} or {right}?",
    "First, which suits you better: {left} or {right}?",
];
const COUNT: &[&str] = &[
    "Do you prefer {left} or {right}?",
    "Which suits you better: {left} or {right}?",
];
const NARROWED_COUNT: &[&str] = &[
    "Based on your narrowed preferences, do you prefer {left} or {right}?",
    "To narrow it down further: {left} or {right}?",
];

fn templates(stage: Stage, frame: Frame) -> &'static [&'static str] {
    match (frame, stage) {
        (Frame::Typed(AttributeType::Price), Stage::Broad) => BROAD_PRICE,
        (Frame::Typed(AttributeType::Price), Stage::Neutral) => PRICE,
        (Frame::Typed(AttributeType::Price), Stage::Narrowed) => NARROWED_PRICE,
        (Frame::Typed(AttributeType::Rating), Stage::Broad) => BROAD_RATING,
        (Frame::Typed(AttributeType::Rating), Stage::Neutral) => RATING,
        (Frame::Typed(AttributeType::Rating), Stage::Narrowed) => NARROWED_RATING,
        (Frame::Typed(AttributeType::Duration), Stage::Broad) => BROAD_DURATION,
        (Frame::Typed(AttributeType::Duration), Stage::Neutral) => DURATION,
        (Frame::Typed(AttributeType::Duration), Stage::Narrowed) => NARROWED_DURATION,
        (Frame::Typed(AttributeType::Count), Stage::Broad) => BROAD_COUNT,
        (Frame::Typed(AttributeType::Count), Stage::Neutral) => COUNT,
        (Frame::Typed(AttributeType::Count), Stage::Narrowed) => NARROWED_COUNT,
        (Frame::Simple | Frame::Typed(_), Stage::Broad) => BROAD_SIMPLE,
        (Frame::Simple | Frame::Typed(_), Stage::Neutral) => NEUTRAL_SIMPLE,
        (Frame::Simple | Frame::Typed(_), Stage::Narrowed) => NARROWED_SIMPLE,
        (Frame::Tradeoff, Stage::Broad) => BROAD_TRADEOFF,
        (Frame::Tradeoff, Stage::Neutral) => NEUTRAL_TRADEOFF,
        (Frame::Tradeoff, Stage::Narrowed) => NARROWED_TRADEOFF,
    }
}

/// Pick a template and fill in both sides.
pub(crate) fn render<R: Rng>(stage: Stage, frame: Frame, left: &str, right: &str, rng: &mut R) -> String {
    let options = templates(stage, frame);
    let template = options[rng.gen_range(0..options.len())];
    template.replace("{left}", left).replace("{right}", right)
}

/// Text used when no side labels could be produced.
pub(crate) fn fallback(descriptions: &[String]) -> String {
    format!(
        "How important are these features to you: {}?",
        descriptions.join(", ")
    )
}
