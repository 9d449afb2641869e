use std::cmp::Ordering;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use super::phrasing::{self, FeatureContext, SidePhrases};
use super::templates::{self, Frame, Stage};
use super::GeneratedQuestion;
use crate::analysis::SplitAnalyzer;
use crate::config::GeneratorOptions;
use crate::error::{EngineError, Result};
use crate::oblique::{InternalNode, ObliqueTree, TreeNode};
use crate::profile::{find_profile, naming, AttributeProfile, AttributeType};

/// Attributes kept per question.
const MAX_FOCUS: usize = 3;
/// Share of the total score above which one attribute dominates the question.
const DOMINANT_IMPORTANCE: f64 = 0.6;
const ONE_HOT_MULTIPLIER: f64 = 3.0;
const SECONDARY_MULTIPLIER: f64 = 0.6;
const ASKED_MULTIPLIER: f64 = 0.5;

/// Renders internal oblique nodes as binary-choice questions.
///
/// Output is a pure function of the node, the profiles, the asked attributes, the depth
/// and [`GeneratorOptions::seed`], so a preview and a later replay of the same node
/// produce the same text.
#[derive(Debug, Clone, Default)]
pub struct QuestionGenerator {
    options: GeneratorOptions,
    analyzer: SplitAnalyzer,
}

/// A weighted feature chosen as a question topic.
#[derive(Debug, Clone, Copy)]
struct Focus {
    index: usize,
    score: f64,
}

impl QuestionGenerator {
    /// Create a generator.
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            analyzer: SplitAnalyzer::default(),
        }
    }

    /// Replace the split analyzer.
    pub fn with_analyzer(mut self, analyzer: SplitAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Options in use.
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate the question for an internal node of `tree`.
    ///
    /// `asked` lists attributes already asked on the path to `node`; they are
    /// de-emphasized. `depth` is the node's depth (root = 0).
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidNodeKind`] if `node` is a leaf.
    pub fn generate(
        &self,
        tree: &ObliqueTree,
        node: &TreeNode,
        profiles: Option<&[AttributeProfile]>,
        asked: &[String],
        depth: usize,
    ) -> Result<GeneratedQuestion> {
        let TreeNode::Internal(internal) = node else {
            return Err(EngineError::InvalidNodeKind {
                expected: "internal",
                got: node.kind_name(),
            });
        };

        let digest = split_digest(internal);
        let id = question_id(&digest);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.options.seed ^ digest_seed(&digest));
        let stage = Stage::from_depth(depth);

        if self.options.use_split_analysis {
            if let Some(question) =
                self.from_analysis(tree, node, profiles, asked, stage, &id, &mut rng)
            {
                return Ok(question);
            }
        }

        let focus = rank_features(&tree.feature_names, &internal.weights, asked);
        let axis_aligned = internal.weights.iter().filter(|w| **w != 0.0).count() == 1;
        let phrased: Vec<(Focus, SidePhrases)> = focus
            .iter()
            .map(|f| {
                let name = tree.feature_names[f.index].as_str();
                let ctx = FeatureContext {
                    name,
                    index: f.index,
                    weight: internal.weights[f.index],
                    threshold: internal.threshold,
                    axis_aligned,
                    normalization: tree.normalization.as_ref(),
                    profile: lookup(profiles, name),
                };
                (*f, phrasing::phrase_feature(&ctx))
            })
            .filter(|(_, p)| p.is_usable())
            .collect();

        if phrased.is_empty() {
            return Ok(self.fallback(tree, &focus, profiles, id));
        }

        let total: f64 = phrased.iter().map(|(f, _)| f.score).sum();
        let dominant = phrased.len() == 1 || phrased[0].0.score / total > DOMINANT_IMPORTANCE;
        let frame = if dominant {
            let top = tree.feature_names[phrased[0].0.index].as_str();
            match lookup(profiles, top).map(|p| p.attribute_type) {
                Some(
                    kind @ (AttributeType::Price
                    | AttributeType::Rating
                    | AttributeType::Duration
                    | AttributeType::Count),
                ) if !naming::is_one_hot(top) => Frame::Typed(kind),
                _ => Frame::Simple,
            }
        } else {
            Frame::Tradeoff
        };

        let used = if dominant { 1 } else { 2 };
        let parts: Vec<&SidePhrases> = phrased.iter().take(used).map(|(_, p)| p).collect();
        let (left, right) = join_sides(&parts);
        let text = templates::render(stage, frame, &left, &right, &mut rng);
        debug!(id = id.as_str(), depth, ?frame, "generated question from weights");

        Ok(GeneratedQuestion {
            id,
            text,
            left_label: left,
            right_label: right,
            focus_attributes: phrased
                .iter()
                .take(used)
                .map(|(f, _)| tree.feature_names[f.index].clone())
                .collect(),
        })
    }

    /// Phrase the question from observed branch averages.
    #[allow(clippy::too_many_arguments)]
    fn from_analysis(
        &self,
        tree: &ObliqueTree,
        node: &TreeNode,
        profiles: Option<&[AttributeProfile]>,
        asked: &[String],
        stage: Stage,
        id: &str,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Option<GeneratedQuestion> {
        let analysis = self.analyzer.analyze_split(tree, node)?;
        let mut ranked: Vec<(f64, SidePhrases, &str)> = analysis
            .distinguishing_attributes
            .iter()
            .map(|attr| {
                let score = if is_asked(&attr.name, asked) {
                    attr.difference_percent * ASKED_MULTIPLIER
                } else {
                    attr.difference_percent
                };
                let phrases = phrasing::observed_phrases(attr, lookup(profiles, &attr.name));
                (score, phrases, attr.name.as_str())
            })
            .filter(|(_, p, _)| p.is_usable())
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        ranked.truncate(MAX_FOCUS);
        if ranked.is_empty() {
            return None;
        }

        let total: f64 = ranked.iter().map(|(s, _, _)| s).sum();
        let dominant = ranked.len() == 1 || total <= 0.0 || ranked[0].0 / total > DOMINANT_IMPORTANCE;
        let (frame, used) = if dominant {
            (Frame::Simple, 1)
        } else {
            (Frame::Tradeoff, 2)
        };
        let parts: Vec<&SidePhrases> = ranked.iter().take(used).map(|(_, p, _)| p).collect();
        let (left, right) = join_sides(&parts);
        let text = templates::render(stage, frame, &left, &right, rng);
        debug!(id, ?frame, "generated question from split analysis");

        Some(GeneratedQuestion {
            id: id.to_string(),
            text,
            left_label: left,
            right_label: right,
            focus_attributes: ranked
                .iter()
                .take(used)
                .map(|(_, _, name)| name.to_string())
                .collect(),
        })
    }

    fn fallback(
        &self,
        tree: &ObliqueTree,
        focus: &[Focus],
        profiles: Option<&[AttributeProfile]>,
        id: String,
    ) -> GeneratedQuestion {
        let names: Vec<&str> = if focus.is_empty() {
            tree.feature_names.iter().take(MAX_FOCUS).map(String::as_str).collect()
        } else {
            focus.iter().map(|f| tree.feature_names[f.index].as_str()).collect()
        };
        let descriptions: Vec<String> = names
            .iter()
            .map(|name| phrasing::description(name, lookup(profiles, name)))
            .collect();
        debug!(id = id.as_str(), "fell back to importance question");
        GeneratedQuestion {
            id,
            text: templates::fallback(&descriptions),
            left_label: "Less important".to_string(),
            right_label: "More important".to_string(),
            focus_attributes: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

fn lookup<'a>(profiles: Option<&'a [AttributeProfile]>, name: &str) -> Option<&'a AttributeProfile> {
    profiles.and_then(|ps| find_profile(ps, name))
}

/// Whether `name` (or its one-hot base column) was already asked.
fn is_asked(name: &str, asked: &[String]) -> bool {
    let base = naming::split_one_hot(name).map_or(name, |(base, _)| base);
    asked.iter().any(|a| a == name || a == base)
}

/// Score weighted features and keep the strongest few.
fn rank_features(feature_names: &[String], weights: &[f64], asked: &[String]) -> Vec<Focus> {
    let mut scored: Vec<Focus> = weights
        .iter()
        .zip(feature_names)
        .enumerate()
        .filter(|(_, (w, _))| **w != 0.0 && w.is_finite())
        .map(|(index, (w, name))| {
            let mut score = w.abs();
            if naming::is_one_hot(name) {
                score *= ONE_HOT_MULTIPLIER;
            }
            if naming::is_secondary_numeric_name(name) {
                score *= SECONDARY_MULTIPLIER;
            }
            if is_asked(name, asked) {
                score *= ASKED_MULTIPLIER;
            }
            Focus { index, score }
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    scored.truncate(MAX_FOCUS);
    scored
}

fn join_sides(parts: &[&SidePhrases]) -> (String, String) {
    let left: Vec<&str> = parts.iter().map(|p| p.left.as_str()).collect();
    let right: Vec<&str> = parts.iter().map(|p| p.right.as_str()).collect();
    (left.join(" and "), right.join(" and "))
}

fn split_digest(node: &InternalNode) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&node.threshold.to_le_bytes());
    for w in &node.weights {
        hasher.update(&w.to_le_bytes());
    }
    hasher.finalize()
}

/// `q_` followed by the first 16 hex characters of the split digest.
fn question_id(digest: &blake3::Hash) -> String {
    let hex = digest.to_hex();
    format!("q_{}", &hex.as_str()[..16])
}

fn digest_seed(digest: &blake3::Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
