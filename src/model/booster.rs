//! Gradient-boosted decision trees for binary classification.
//!
//! Artifacts use the nested JSON layout of an XGBoost model dump: every
//! split node names its feature (`f<index>`), its threshold, the ids of its
//! `yes` / `no` / `missing` children, and carries the children inline. Leaf
//! nodes carry the additive margin contribution. `cover` statistics are
//! optional; without them the model still predicts but cannot explain.
//!
//! ```text
//! margin = logit(base_score) + Σ tree_t(x)
//! p(fully paid) = sigmoid(margin)
//! ```

use super::{Classifier, Contributions, explain};
use crate::{Error, Result};
use serde::Deserialize;
use tracing::debug;

const LOGISTIC_OBJECTIVE: &str = "binary:logistic";

#[derive(Debug, Deserialize)]
struct BoosterArtifact {
    #[serde(default = "default_objective")]
    objective: String,
    #[serde(default = "default_base_score")]
    base_score: f64,
    num_features: usize,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    trees: Vec<DumpNode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpNode {
    Split {
        nodeid: usize,
        split: String,
        split_condition: f64,
        yes: usize,
        no: usize,
        #[serde(default)]
        missing: Option<usize>,
        #[serde(default)]
        cover: Option<f64>,
        children: Vec<DumpNode>,
    },
    Leaf {
        nodeid: usize,
        leaf: f64,
        #[serde(default)]
        cover: Option<f64>,
    },
}

impl DumpNode {
    fn nodeid(&self) -> usize {
        match self {
            Self::Split { nodeid, .. } | Self::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        missing: usize,
        cover: Option<f64>,
    },
    Leaf {
        value: f64,
        cover: Option<f64>,
    },
}

impl Node {
    pub(crate) fn cover(&self) -> Option<f64> {
        match self {
            Self::Split { cover, .. } | Self::Leaf { cover, .. } => *cover,
        }
    }
}

/// A single regression tree flattened into an arena indexed by node id.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tree {
    pub(crate) nodes: Vec<Node>,
}

impl Tree {
    /// Child taken by `x` at a split node.
    pub(crate) fn next(x: &[f64], feature: usize, threshold: f64, yes: usize, no: usize, missing: usize) -> usize {
        let value = x[feature];
        if value.is_nan() {
            missing
        } else if value < threshold {
            yes
        } else {
            no
        }
    }

    fn leaf_value(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value, .. } => return value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                    ..
                } => index = Self::next(x, feature, threshold, yes, no, missing),
            }
        }
    }

    fn has_cover(&self) -> bool {
        self.nodes
            .iter()
            .all(|n| n.cover().is_some_and(|c| c.is_finite() && c > 0.0))
    }

    fn from_dump(root: &DumpNode, num_features: usize, feature_names: Option<&[String]>) -> Result<Self> {
        if root.nodeid() != 0 {
            return Err(Error::invalid_artifact(format!(
                "tree root has node id {} instead of 0",
                root.nodeid()
            )));
        }

        let mut slots: Vec<Option<Node>> = Vec::new();
        let mut stack = vec![root];
        while let Some(dump) = stack.pop() {
            let id = dump.nodeid();
            let node = match dump {
                DumpNode::Leaf { leaf, cover, .. } => {
                    if !leaf.is_finite() {
                        return Err(Error::invalid_artifact(format!("leaf {id} has a non-finite value")));
                    }
                    Node::Leaf { value: *leaf, cover: *cover }
                }
                DumpNode::Split {
                    split,
                    split_condition,
                    yes,
                    no,
                    missing,
                    cover,
                    children,
                    ..
                } => {
                    let feature = parse_feature(split, num_features, feature_names)?;
                    if children.len() != 2 {
                        return Err(Error::invalid_artifact(format!(
                            "split node {id} has {} children instead of 2",
                            children.len()
                        )));
                    }
                    let child_ids: Vec<usize> = children.iter().map(DumpNode::nodeid).collect();
                    let missing = missing.unwrap_or(*yes);
                    if missing != *yes && missing != *no {
                        return Err(Error::invalid_artifact(format!(
                            "node {id} sends missing values to {missing}, which is neither its 'yes' nor its 'no' branch"
                        )));
                    }
                    for (role, child) in [("yes", *yes), ("no", *no), ("missing", missing)] {
                        if !child_ids.contains(&child) {
                            return Err(Error::invalid_artifact(format!(
                                "node {id} points its '{role}' branch at {child}, which is not one of its children"
                            )));
                        }
                    }
                    if yes == no {
                        return Err(Error::invalid_artifact(format!(
                            "node {id} sends both branches to node {yes}"
                        )));
                    }
                    stack.extend(children.iter());
                    Node::Split {
                        feature,
                        threshold: *split_condition,
                        yes: *yes,
                        no: *no,
                        missing,
                        cover: *cover,
                    }
                }
            };

            if slots.len() <= id {
                slots.resize(id + 1, None);
            }
            if slots[id].replace(node).is_some() {
                return Err(Error::invalid_artifact(format!("duplicate node id {id}")));
            }
        }

        let nodes = slots
            .into_iter()
            .enumerate()
            .map(|(id, slot)| {
                slot.ok_or_else(|| Error::invalid_artifact(format!("node ids are not contiguous, {id} is missing")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { nodes })
    }
}

fn parse_feature(split: &str, num_features: usize, feature_names: Option<&[String]>) -> Result<usize> {
    let index = feature_names
        .and_then(|names| names.iter().position(|n| n == split))
        .or_else(|| split.strip_prefix('f').and_then(|i| i.parse::<usize>().ok()))
        .ok_or_else(|| Error::invalid_artifact(format!("unknown split feature '{split}'")))?;

    if index >= num_features {
        return Err(Error::invalid_artifact(format!(
            "split feature '{split}' is outside the {num_features} model features"
        )));
    }
    Ok(index)
}

/// Binary logistic tree ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedTrees {
    base_margin: f64,
    num_features: usize,
    pub(crate) trees: Vec<Tree>,
    explainable: bool,
}

impl GradientBoostedTrees {
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: BoosterArtifact = serde_json::from_str(json)?;

        if artifact.objective != LOGISTIC_OBJECTIVE {
            return Err(Error::invalid_artifact(format!(
                "unsupported objective '{}', expected '{LOGISTIC_OBJECTIVE}'",
                artifact.objective
            )));
        }
        if !(artifact.base_score > 0.0 && artifact.base_score < 1.0) {
            return Err(Error::invalid_artifact(format!(
                "base_score {} must lie strictly between 0 and 1",
                artifact.base_score
            )));
        }
        if artifact.num_features == 0 {
            return Err(Error::invalid_artifact("model declares zero features"));
        }
        if artifact.trees.is_empty() {
            return Err(Error::invalid_artifact("model has no trees"));
        }
        if let Some(names) = &artifact.feature_names {
            if names.len() != artifact.num_features {
                return Err(Error::invalid_artifact(format!(
                    "{} feature names for {} features",
                    names.len(),
                    artifact.num_features
                )));
            }
        }

        let trees = artifact
            .trees
            .iter()
            .map(|root| Tree::from_dump(root, artifact.num_features, artifact.feature_names.as_deref()))
            .collect::<Result<Vec<_>>>()?;
        let explainable = trees.iter().all(Tree::has_cover);

        debug!(
            trees = trees.len(),
            features = artifact.num_features,
            explainable,
            "Parsed tree ensemble"
        );

        Ok(Self {
            base_margin: logit(artifact.base_score),
            num_features: artifact.num_features,
            trees,
            explainable,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    /// Raw log-odds of the "fully paid" class.
    pub fn margin(&self, features: &[f64]) -> Result<f64> {
        self.check_shape(features)?;
        Ok(self.base_margin + self.trees.iter().map(|t| t.leaf_value(features)).sum::<f64>())
    }

    fn check_shape(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.num_features {
            return Err(Error::ShapeMismatch {
                expected: self.num_features,
                actual: features.len(),
            });
        }
        Ok(())
    }
}

impl Classifier for GradientBoostedTrees {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        let p = sigmoid(self.margin(features)?);
        Ok([1.0 - p, p])
    }

    fn can_explain(&self) -> bool {
        self.explainable
    }

    fn explain(&self, features: &[f64]) -> Option<Result<Contributions>> {
        if !self.explainable {
            return None;
        }
        Some(
            self.check_shape(features)
                .map(|()| explain::tree_shap(self, features)),
        )
    }
}

fn default_objective() -> String {
    LOGISTIC_OBJECTIVE.to_string()
}

fn default_base_score() -> f64 {
    0.5
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
