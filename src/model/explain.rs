//! Path-dependent TreeSHAP over a [`GradientBoostedTrees`] ensemble.
//!
//! Attributions are computed in margin (log-odds) space. Together with the
//! base value they satisfy local accuracy:
//!
//! ```text
//! base_value + Σ phi_i == margin(x)
//! ```
//!
//! where `base_value` is the cover-weighted expected margin of the ensemble.

use super::{
    Contributions, GradientBoostedTrees,
    booster::{Node, Tree},
};

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

pub(crate) fn tree_shap(model: &GradientBoostedTrees, x: &[f64]) -> Contributions {
    let mut values = vec![0.0; x.len()];
    let mut base_value = model.base_margin();

    for tree in &model.trees {
        base_value += expected_value(tree, 0);
        recurse(tree, x, &mut values, 0, &[], 1.0, 1.0, None);
    }

    Contributions { values, base_value }
}

fn cover(tree: &Tree, index: usize) -> f64 {
    tree.nodes[index].cover().unwrap_or(0.0)
}

fn expected_value(tree: &Tree, index: usize) -> f64 {
    match tree.nodes[index] {
        Node::Leaf { value, .. } => value,
        Node::Split { yes, no, .. } => {
            let total = cover(tree, index);
            (cover(tree, yes) * expected_value(tree, yes) + cover(tree, no) * expected_value(tree, no))
                / total
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    x: &[f64],
    phi: &mut [f64],
    index: usize,
    parent_path: &[PathElement],
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let mut path = parent_path.to_vec();
    extend(&mut path, zero_fraction, one_fraction, feature);

    match tree.nodes[index] {
        Node::Leaf { value, .. } => {
            for i in 1..path.len() {
                let element = path[i];
                let weight = unwound_sum(&path, i);
                if let Some(f) = element.feature {
                    phi[f] += weight * (element.one_fraction - element.zero_fraction) * value;
                }
            }
        }
        Node::Split {
            feature: split,
            threshold,
            yes,
            no,
            missing,
            ..
        } => {
            let hot = Tree::next(x, split, threshold, yes, no, missing);
            let cold = if hot == yes { no } else { yes };
            let total = cover(tree, index);
            let hot_zero = cover(tree, hot) / total;
            let cold_zero = cover(tree, cold) / total;

            // A feature seen earlier on the path is folded into this split.
            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(seen) = path.iter().position(|e| e.feature == Some(split)) {
                incoming_zero = path[seen].zero_fraction;
                incoming_one = path[seen].one_fraction;
                unwind(&mut path, seen);
            }

            recurse(tree, x, phi, hot, &path, hot_zero * incoming_zero, incoming_one, Some(split));
            recurse(tree, x, phi, cold, &path, cold_zero * incoming_zero, 0.0, Some(split));
        }
    }
}

fn extend(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / (depth + 1) as f64;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / (depth + 1) as f64;
    }
}

fn unwind(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one_portion * (depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
            next_one_portion =
                tmp - path[i].weight * zero_fraction * (depth - i) as f64 / (depth + 1) as f64;
        } else {
            path[i].weight = path[i].weight * (depth + 1) as f64 / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

fn unwound_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    if one_fraction != 0.0 {
        for i in (0..depth).rev() {
            let tmp = next_one_portion / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero_fraction * (depth - i) as f64;
        }
    } else {
        for i in (0..depth).rev() {
            total += path[i].weight / (zero_fraction * (depth - i) as f64);
        }
    }

    total * (depth + 1) as f64
}
