//! CART Decision Tree - weighted Gini impurity
//!
//! Nodes live in a flat vector; the root is node 0 and every child index is
//! strictly greater than its parent's, so traversal always terminates.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Number of output classes (normal, theft)
pub const N_CLASSES: usize = 2;

/// Anything that maps one feature vector to class probabilities
pub trait Classifier {
    fn predict_proba(&self, x: &FeatureVector) -> [f64; N_CLASSES];

    /// Most probable class; ties resolve to the lower label
    fn predict(&self, x: &FeatureVector) -> u8 {
        let proba = self.predict_proba(x);
        if proba[1] > proba[0] {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        proba: [f64; N_CLASSES],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(Node::Split { left, right, .. }) = self.nodes.get(idx) {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        max_depth
    }

    /// Structural check for trees read from disk
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { proba } => {
                    if proba.iter().any(|p| !p.is_finite() || *p < 0.0) {
                        return Err(format!("node {}: invalid leaf probabilities", idx));
                    }
                }
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {}: feature index {} out of range", idx, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {}: non-finite threshold", idx));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {}: invalid child index {}", idx, child));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn predict_proba(&self, x: &FeatureVector) -> [f64; N_CLASSES] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return *proba,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x.get(*feature) <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

// ============================================================================
// TRAINING
// ============================================================================

/// Tree growth parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Features examined per split (non-constant ones)
    pub max_features: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_features: FEATURE_COUNT,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// Grows one tree from weighted samples.
///
/// Samples with zero weight are ignored (out-of-bag rows).
pub fn grow_tree<R: Rng + ?Sized>(
    config: &TreeConfig,
    x: &[FeatureVector],
    y: &[u8],
    weights: &[f64],
    rng: &mut R,
) -> DecisionTree {
    let root: Vec<usize> = (0..x.len()).filter(|&i| weights[i] > 0.0).collect();

    let mut nodes = vec![placeholder()];
    let mut stack = vec![(0usize, root, 0usize)];

    while let Some((node_idx, samples, depth)) = stack.pop() {
        let totals = class_weights(&samples, y, weights);

        let can_split = samples.len() >= config.min_samples_split
            && config.max_depth.map_or(true, |max| depth < max)
            && gini(&totals) > 0.0;

        let best = if can_split {
            find_best_split(config, x, y, weights, &samples, rng)
        } else {
            None
        };

        match best {
            Some(split) => {
                let (left, right): (Vec<usize>, Vec<usize>) = samples
                    .iter()
                    .partition(|&&i| x[i].get(split.feature) <= split.threshold);

                let left_idx = nodes.len();
                nodes.push(placeholder());
                let right_idx = nodes.len();
                nodes.push(placeholder());

                nodes[node_idx] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: left_idx,
                    right: right_idx,
                };

                stack.push((right_idx, right, depth + 1));
                stack.push((left_idx, left, depth + 1));
            }
            None => {
                nodes[node_idx] = Node::Leaf { proba: normalize(&totals) };
            }
        }
    }

    DecisionTree { nodes }
}

fn placeholder() -> Node {
    Node::Leaf { proba: [0.5, 0.5] }
}

fn class_weights(samples: &[usize], y: &[u8], weights: &[f64]) -> [f64; N_CLASSES] {
    let mut totals = [0.0; N_CLASSES];
    for &i in samples {
        totals[y[i] as usize] += weights[i];
    }
    totals
}

fn normalize(totals: &[f64; N_CLASSES]) -> [f64; N_CLASSES] {
    let sum: f64 = totals.iter().sum();
    if sum <= 0.0 {
        return [1.0, 0.0];
    }
    [totals[0] / sum, totals[1] / sum]
}

fn gini(totals: &[f64; N_CLASSES]) -> f64 {
    let sum: f64 = totals.iter().sum();
    if sum <= 0.0 {
        return 0.0;
    }
    1.0 - totals.iter().map(|w| (w / sum).powi(2)).sum::<f64>()
}

/// Best split over randomly ordered features.
///
/// Constant features do not count toward `max_features`, so a split is
/// found whenever any feature still varies within the node.
fn find_best_split<R: Rng + ?Sized>(
    config: &TreeConfig,
    x: &[FeatureVector],
    y: &[u8],
    weights: &[f64],
    samples: &[usize],
    rng: &mut R,
) -> Option<SplitCandidate> {
    let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
    features.shuffle(rng);

    let mut best: Option<SplitCandidate> = None;
    let mut visited = 0;

    for feature in features {
        if visited >= config.max_features.max(1) {
            break;
        }

        let mut order = samples.to_vec();
        order.sort_by(|&a, &b| x[a].get(feature).total_cmp(&x[b].get(feature)));

        let first = x[order[0]].get(feature);
        let last = x[order[order.len() - 1]].get(feature);
        if first == last {
            continue;
        }
        visited += 1;

        if let Some(candidate) = best_threshold(feature, &order, x, y, weights) {
            if best.as_ref().map_or(true, |b| candidate.score < b.score) {
                best = Some(candidate);
            }
        }
    }

    best
}

/// Sweep sorted samples; score is the weighted child impurity
fn best_threshold(
    feature: usize,
    order: &[usize],
    x: &[FeatureVector],
    y: &[u8],
    weights: &[f64],
) -> Option<SplitCandidate> {
    let totals = class_weights(order, y, weights);
    let mut left = [0.0; N_CLASSES];
    let mut best: Option<SplitCandidate> = None;

    for pos in 0..order.len() - 1 {
        let i = order[pos];
        left[y[i] as usize] += weights[i];

        let current = x[i].get(feature);
        let next = x[order[pos + 1]].get(feature);
        if current == next {
            continue;
        }

        let right = [totals[0] - left[0], totals[1] - left[1]];
        let w_left: f64 = left.iter().sum();
        let w_right: f64 = right.iter().sum();
        let score = w_left * gini(&left) + w_right * gini(&right);

        if best.as_ref().map_or(true, |b| score < b.score) {
            let mut threshold = current + (next - current) / 2.0;
            if threshold >= next || !threshold.is_finite() {
                threshold = current;
            }
            best = Some(SplitCandidate { feature, threshold, score });
        }
    }

    best
}
