//! CART regression tree.
//!
//! Nodes live in a flat arena (`Vec<Node>`) with the root at index 0, so a
//! trained tree is plain data and serializes as-is. Splits minimize the sum
//! of squared errors of the two children; a leaf predicts the mean target of
//! the training rows that reached it.
//!
//! Growth uses an explicit work stack, so deep trees (no depth limit, many
//! distinct values) cannot overflow the call stack.

use crate::error::PipelineError;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Minimum reduction in squared error for a split to be kept, relative to
/// the parent's squared error (floored at 1).
const MIN_RELATIVE_GAIN: f64 = 1e-10;

/// One node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined at each node.
    pub max_features: usize,
}

/// Sufficient statistics of a target subset, accumulated about `shift` so
/// large targets with a small spread keep their precision.
#[derive(Debug, Clone, Copy)]
struct Moments {
    n: usize,
    shift: f64,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    fn about(shift: f64) -> Self {
        Self {
            n: 0,
            shift,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    fn push(&mut self, y: f64) {
        let d = y - self.shift;
        self.n += 1;
        self.sum += d;
        self.sum_sq += d * d;
    }

    fn mean(&self) -> f64 {
        self.shift + self.sum / self.n as f64
    }

    /// Sum of squared deviations from the mean.
    fn sse(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        (self.sum_sq - self.sum * self.sum / self.n as f64).max(0.0)
    }

    fn minus(&self, other: &Moments) -> Moments {
        Moments {
            n: self.n - other.n,
            shift: self.shift,
            sum: self.sum - other.sum,
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Pending {
    node: usize,
    start: usize,
    end: usize,
    depth: usize,
}

/// A trained regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

impl RegressionTree {
    /// Grow a tree on the rows listed in `samples` (duplicates allowed, as
    /// produced by bootstrap sampling).
    ///
    /// Returns the tree and the total squared-error reduction attributed to
    /// each feature.
    ///
    /// # Errors
    /// [`PipelineError::InsufficientData`] if `samples` is empty.
    pub fn fit(
        x: &Array2<f64>,
        y: &[f64],
        mut samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<(Self, Vec<f64>), PipelineError> {
        if samples.is_empty() {
            return Err(PipelineError::insufficient("tree sample", 0, 1));
        }
        let n_features = x.ncols();
        let max_features = params.max_features.clamp(1, n_features.max(1));
        let mut importances = vec![0.0; n_features];
        let mut nodes = vec![Node::Leaf {
            value: 0.0,
            n_samples: 0,
        }];
        let mut stack = vec![Pending {
            node: 0,
            start: 0,
            end: samples.len(),
            depth: 0,
        }];

        while let Some(Pending {
            node,
            start,
            end,
            depth,
        }) = stack.pop()
        {
            let range = &mut samples[start..end];
            let first = y[range[0]];
            let mut total = Moments::about(first);
            for &i in range.iter() {
                total.push(y[i]);
            }
            let pure = range.iter().all(|&i| y[i] == first);
            let leaf = Node::Leaf {
                value: total.mean(),
                n_samples: total.n,
            };

            let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
            if depth_reached
                || total.n < params.min_samples_split
                || total.n < 2 * params.min_samples_leaf
                || pure
            {
                nodes[node] = leaf;
                continue;
            }

            let candidates = if max_features >= n_features {
                (0..n_features).collect::<Vec<_>>()
            } else {
                index::sample(rng, n_features, max_features).into_vec()
            };

            let best = best_split(x, y, range, &candidates, &total, params.min_samples_leaf);
            let Some(best) = best else {
                nodes[node] = leaf;
                continue;
            };

            // partition the range in place: left rows first
            range.sort_by_key(|&i| x[[i, best.feature]] > best.threshold);
            let n_left = range
                .iter()
                .take_while(|&&i| x[[i, best.feature]] <= best.threshold)
                .count();

            importances[best.feature] += best.gain;

            let left = nodes.len();
            let right = left + 1;
            nodes.push(leaf.clone());
            nodes.push(leaf);
            nodes[node] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };
            stack.push(Pending {
                node: right,
                start: start + n_left,
                end,
                depth: depth + 1,
            });
            stack.push(Pending {
                node: left,
                start,
                end: start + n_left,
                depth: depth + 1,
            });
        }

        Ok((Self { nodes, n_features }, importances))
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = self.nodes[node] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    /// Check that child indices stay inside the arena and point forward.
    pub(crate) fn validate(&self, n_features: usize) -> Result<(), PipelineError> {
        if self.n_features != n_features {
            return Err(PipelineError::FeatureMismatch {
                expected_features: n_features,
                got_features: self.n_features,
            });
        }
        if self.nodes.is_empty() {
            return Err(PipelineError::Serialization("tree has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= n_features
                    || left <= i
                    || right <= i
                    || left >= self.nodes.len()
                    || right >= self.nodes.len()
                {
                    return Err(PipelineError::Serialization(format!(
                        "tree node {} has invalid links",
                        i
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Best squared-error split of `rows` over the `candidates` features.
///
/// Thresholds sit halfway between consecutive distinct values. The first
/// candidate with the largest gain wins.
fn best_split(
    x: &Array2<f64>,
    y: &[f64],
    rows: &[usize],
    candidates: &[usize],
    total: &Moments,
    min_samples_leaf: usize,
) -> Option<BestSplit> {
    let parent_sse = total.sse();
    let min_gain = MIN_RELATIVE_GAIN * parent_sse.max(1.0);
    let mut best: Option<BestSplit> = None;
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(rows.len());

    for &feature in candidates {
        pairs.clear();
        pairs.extend(rows.iter().map(|&i| (x[[i, feature]], y[i])));
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = Moments::about(total.shift);
        for k in 0..pairs.len() - 1 {
            left.push(pairs[k].1);
            let (value, next) = (pairs[k].0, pairs[k + 1].0);
            if value == next {
                continue;
            }
            if left.n < min_samples_leaf || total.n - left.n < min_samples_leaf {
                continue;
            }
            let right = total.minus(&left);
            let gain = parent_sse - left.sse() - right.sse();
            if gain > min_gain && best.map_or(true, |b| gain > b.gain) {
                let mid = value + (next - value) / 2.0;
                let threshold = if mid < next { mid } else { value };
                best = Some(BestSplit {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}
