//! Greedy construction of the raw-attribute question tree.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use super::attributes::{self, RawAttribute};
use super::node::{CategoricalQuestion, NumericQuestion, QuestionLeaf, QuestionTreeNode, NO, YES};
use crate::config::QuestionTreeParams;
use crate::data::RawTable;
use crate::profile::{find_profile, naming, AttributeProfile, AttributeType};
use crate::utils::{self, format_currency, format_number};

/// Builds a [`QuestionTreeNode`] tree directly over raw table columns.
///
/// Splits maximize the variance reduction of a per-product preference score, so the
/// tree asks first about whatever best separates well-liked products from the rest.
#[derive(Debug, Clone)]
pub struct QuestionTreeBuilder {
    params: QuestionTreeParams,
}

/// How a candidate partitions the items.
#[derive(Debug, Clone)]
enum Partition {
    Numeric {
        threshold: f64,
        left: Vec<usize>,
        right: Vec<usize>,
    },
    Categorical {
        /// `(label, items)` in display order.
        branches: Vec<(String, Vec<usize>)>,
    },
}

impl Partition {
    fn groups(&self) -> Vec<&[usize]> {
        match self {
            Self::Numeric { left, right, .. } => vec![left.as_slice(), right.as_slice()],
            Self::Categorical { branches } => branches.iter().map(|(_, b)| b.as_slice()).collect(),
        }
    }
}

struct Candidate<'a> {
    attribute: &'a RawAttribute,
    partition: Partition,
    gain: f64,
}

struct BuildContext<'a> {
    table: &'a RawTable,
    profiles: &'a [AttributeProfile],
    attributes: Vec<RawAttribute>,
    scores: Vec<f64>,
}

impl QuestionTreeBuilder {
    /// Create a builder.
    pub fn new(params: QuestionTreeParams) -> Self {
        Self { params }
    }

    /// Build the tree over every row of `table`.
    ///
    /// `profiles` are consulted only to format price thresholds.
    pub fn build(&self, table: &RawTable, profiles: &[AttributeProfile]) -> QuestionTreeNode {
        let attributes = attributes::classify_columns(table);
        let scores = attributes::preference_scores(table, &attributes);
        debug!(n_attributes = attributes.len(), "classified raw attributes");
        let ctx = BuildContext {
            table,
            profiles,
            attributes,
            scores,
        };
        let items: Vec<usize> = (0..table.n_rows()).collect();
        let root = self.build_node(&ctx, items, 0);
        info!(
            depth = root.depth(),
            leaves = root.leaves().len(),
            "built question tree"
        );
        root
    }

    fn build_node(&self, ctx: &BuildContext<'_>, items: Vec<usize>, depth: usize) -> QuestionTreeNode {
        if depth >= self.params.max_depth || items.len() <= self.params.min_leaf_size {
            return self.make_leaf(ctx, items);
        }
        let Some(best) = self.find_best_split(ctx, &items) else {
            return self.make_leaf(ctx, items);
        };
        if best.gain <= self.params.min_gain {
            return self.make_leaf(ctx, items);
        }

        let column = best.attribute.column();
        let feature = ctx.table.headers[column].clone();
        let label = naming::humanize(&feature);
        debug!(
            depth,
            feature = feature.as_str(),
            gain = best.gain,
            n_items = items.len(),
            "question split"
        );

        match best.partition {
            Partition::Numeric {
                threshold,
                left,
                right,
            } => {
                let formatted = if self.is_price(ctx, &feature) {
                    format_currency(threshold)
                } else {
                    format_number(threshold)
                };
                QuestionTreeNode::NumericQuestion(NumericQuestion {
                    question: format!("Are you looking for {} at or below {}?", label, formatted),
                    feature,
                    threshold,
                    options: vec![YES.to_string(), NO.to_string()],
                    left: Box::new(self.build_node(ctx, left, depth + 1)),
                    right: Box::new(self.build_node(ctx, right, depth + 1)),
                    sample_count: items.len(),
                })
            }
            Partition::Categorical { branches } => {
                let options: Vec<String> = branches.iter().map(|(name, _)| name.clone()).collect();
                let children: BTreeMap<String, QuestionTreeNode> = branches
                    .into_iter()
                    .map(|(name, branch)| (name, self.build_node(ctx, branch, depth + 1)))
                    .collect();
                QuestionTreeNode::CategoricalQuestion(CategoricalQuestion {
                    question: format!("Which {} do you prefer?", label),
                    feature,
                    options,
                    children,
                    sample_count: items.len(),
                })
            }
        }
    }

    fn is_price(&self, ctx: &BuildContext<'_>, feature: &str) -> bool {
        find_profile(ctx.profiles, feature)
            .is_some_and(|p| p.attribute_type == AttributeType::Price)
    }

    fn find_best_split<'a>(&self, ctx: &'a BuildContext<'_>, items: &[usize]) -> Option<Candidate<'a>> {
        let parent: Vec<f64> = items.iter().map(|&i| ctx.scores[i]).collect();
        let parent_variance = utils::variance(&parent);
        if parent_variance <= 0.0 {
            return None;
        }

        let mut best: Option<Candidate<'a>> = None;
        for attribute in &ctx.attributes {
            let partitions = match attribute {
                RawAttribute::Numeric { values, .. } => self.numeric_partitions(values, items),
                RawAttribute::Categorical { values, .. } => {
                    self.categorical_partition(values, items).into_iter().collect()
                }
            };
            for partition in partitions {
                let gain = parent_variance - weighted_variance(&ctx.scores, &partition.groups(), items.len());
                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(Candidate {
                        attribute,
                        partition,
                        gain,
                    });
                }
            }
        }
        best
    }

    /// Threshold partitions; missing values always go right.
    fn numeric_partitions(&self, values: &[Option<f64>], items: &[usize]) -> Vec<Partition> {
        let present: Vec<f64> = items.iter().filter_map(|&i| values[i]).collect();
        let thresholds = utils::midpoints(&utils::sorted(&present));
        utils::downsample(&thresholds, self.params.max_thresholds)
            .into_iter()
            .filter_map(|threshold| {
                let (left, right): (Vec<usize>, Vec<usize>) = items
                    .iter()
                    .partition(|&&i| values[i].is_some_and(|v| v <= threshold));
                (!left.is_empty() && !right.is_empty()).then_some(Partition::Numeric {
                    threshold,
                    left,
                    right,
                })
            })
            .collect()
    }

    /// Top categories plus "Other"; branches smaller than `min_leaf_size` fold into "Other".
    fn categorical_partition(&self, values: &[String], items: &[usize]) -> Option<Partition> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for &i in items {
            let value = values[i].as_str();
            if !value.is_empty() && value != naming::OTHER_CATEGORY {
                *counts.entry(value).or_default() += 1;
            }
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let named: Vec<&str> = ranked
            .into_iter()
            .take(self.params.max_categories)
            .filter(|(_, count)| *count >= self.params.min_leaf_size)
            .map(|(value, _)| value)
            .collect();

        let mut branches: Vec<(String, Vec<usize>)> =
            named.iter().map(|v| (v.to_string(), Vec::new())).collect();
        let mut other = Vec::new();
        for &i in items {
            match named.iter().position(|v| *v == values[i].as_str()) {
                Some(pos) => branches[pos].1.push(i),
                None => other.push(i),
            }
        }
        if !other.is_empty() {
            branches.push((naming::OTHER_CATEGORY.to_string(), other));
        }
        (branches.len() >= 2).then_some(Partition::Categorical { branches })
    }

    fn make_leaf(&self, ctx: &BuildContext<'_>, mut items: Vec<usize>) -> QuestionTreeNode {
        let sample_count = items.len();
        items.sort_by(|&a, &b| {
            ctx.scores[b]
                .partial_cmp(&ctx.scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        items.truncate(self.params.leaf_product_cap);
        let products: Vec<_> = items.iter().map(|&row| ctx.table.product(row)).collect();
        let representative_products = products
            .iter()
            .take(self.params.representative_count)
            .cloned()
            .collect();
        QuestionTreeNode::Leaf(QuestionLeaf {
            sample_count,
            products,
            representative_products,
        })
    }
}

fn weighted_variance(scores: &[f64], groups: &[&[usize]], n: usize) -> f64 {
    groups
        .iter()
        .map(|group| {
            let values: Vec<f64> = group.iter().map(|&i| scores[i]).collect();
            (group.len() as f64 / n as f64) * utils::variance(&values)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::profile_table;

    fn params() -> QuestionTreeParams {
        QuestionTreeParams {
            min_leaf_size: 1,
            ..Default::default()
        }
    }

    fn build(table: &RawTable, params: QuestionTreeParams) -> QuestionTreeNode {
        QuestionTreeBuilder::new(params).build(table, &profile_table(table))
    }

    #[test]
    fn numeric_question_uses_currency_for_prices() {
        let table = RawTable::from_strs(
            &["price", "rating"],
            &[
                &["10", "4.8"],
                &["12", "4.7"],
                &["14", "4.9"],
                &["90", "2.1"],
                &["95", "2.0"],
                &["99", "2.2"],
            ],
        );
        let root = build(&table, params());
        let QuestionTreeNode::NumericQuestion(q) = &root else {
            panic!("expected numeric question, got {}", root.kind_name());
        };
        assert_eq!(q.options, vec!["Yes", "No"]);
        // Price and rating separate the groups equally well; the first column wins.
        assert_eq!(q.feature, "price");
        assert_eq!(q.question, "Are you looking for price at or below $52?");
        assert_eq!(q.left.sample_count() + q.right.sample_count(), 6);
    }

    #[test]
    fn missing_values_route_right() {
        let table = RawTable::from_strs(
            &["weight"],
            &[&["1"], &["2"], &["9"], &["10"], &[""]],
        );
        let root = build(
            &table,
            QuestionTreeParams {
                max_depth: 1,
                ..params()
            },
        );
        let QuestionTreeNode::NumericQuestion(q) = &root else {
            panic!("expected numeric question");
        };
        let right_rows: Vec<usize> = q.right.leaves()[0].products.iter().map(|p| p.row).collect();
        assert!(right_rows.contains(&4));
    }

    #[test]
    fn small_categories_merge_into_other() {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for (color, price, n) in [("red", "10", 4), ("blue", "90", 4), ("teal", "50", 1)] {
            for _ in 0..n {
                rows.push(vec![color.to_string(), price.to_string()]);
            }
        }
        let table = RawTable::new(vec!["color".into(), "cost".into()], rows);
        let builder = QuestionTreeBuilder::new(QuestionTreeParams {
            min_leaf_size: 2,
            ..Default::default()
        });
        let values: Vec<String> = table.column(0).iter().map(|s| s.to_string()).collect();
        let items: Vec<usize> = (0..table.n_rows()).collect();
        let Some(Partition::Categorical { branches }) = builder.categorical_partition(&values, &items)
        else {
            panic!("expected a categorical partition");
        };
        let labels: Vec<&str> = branches.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["blue", "red", "Other"]);
        let total: usize = branches.iter().map(|(_, b)| b.len()).sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn categorical_question_lists_every_branch() {
        let table = RawTable::from_strs(
            &["color", "rating"],
            &[
                &["red", "5"],
                &["red", "5"],
                &["red", "4.9"],
                &["blue", "1"],
                &["blue", "1.2"],
                &["blue", "1"],
            ],
        );
        let root = build(&table, QuestionTreeParams { max_depth: 1, ..params() });
        match &root {
            QuestionTreeNode::CategoricalQuestion(q) => {
                assert_eq!(q.question, "Which color do you prefer?");
                assert_eq!(q.children.len(), q.options.len());
            }
            QuestionTreeNode::NumericQuestion(q) => assert_eq!(q.feature, "rating"),
            QuestionTreeNode::Leaf(_) => panic!("expected a question"),
        }
        assert_eq!(root.leaves().iter().map(|l| l.sample_count).sum::<usize>(), 6);
    }

    #[test]
    fn leaves_cap_products_and_pick_representatives() {
        let rows: Vec<Vec<String>> = (0..10).map(|i| vec![format!("{}", i)]).collect();
        let table = RawTable::new(vec!["rating".into()], rows);
        let root = build(
            &table,
            QuestionTreeParams {
                max_depth: 1,
                min_leaf_size: 20,
                leaf_product_cap: 4,
                representative_count: 2,
                ..Default::default()
            },
        );
        let QuestionTreeNode::Leaf(leaf) = &root else {
            panic!("expected a leaf");
        };
        assert_eq!(leaf.sample_count, 10);
        assert_eq!(leaf.products.len(), 4);
        assert_eq!(leaf.products[0].row, 9);
        let reps: Vec<usize> = leaf.representative_products.iter().map(|p| p.row).collect();
        assert_eq!(reps, vec![9, 8]);
    }

    #[test]
    fn uniform_scores_give_a_leaf() {
        let table = RawTable::from_strs(&["color"], &[&["red"], &["blue"], &["red"], &["blue"]]);
        assert!(build(&table, params()).is_leaf());
    }
}
