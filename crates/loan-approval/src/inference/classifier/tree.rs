//! Regression trees of a boosted ensemble.
//!
//! Nodes are stored in flat arrays with node 0 as the root. Leaf weights live
//! in the split-condition slot, as the XGBoost model dump lays them out.

/// Sentinel child index marking a leaf.
pub const LEAF: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub left: i32,
    pub right: i32,
    pub feature_idx: u32,
    /// Split threshold for internal nodes, leaf weight for leaves.
    pub condition: f32,
    pub default_left: bool,
}

impl Node {
    pub fn split(feature_idx: u32, condition: f32, left: i32, right: i32) -> Self {
        Self {
            left,
            right,
            feature_idx,
            condition,
            default_left: true,
        }
    }

    pub fn leaf(value: f32) -> Self {
        Self {
            left: LEAF,
            right: LEAF,
            feature_idx: 0,
            condition: value,
            default_left: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left == LEAF
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Builds a tree after checking every child and feature reference.
    pub fn new(nodes: Vec<Node>, feature_count: usize) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in nodes.iter().enumerate() {
            if node.is_leaf() {
                if !node.condition.is_finite() {
                    return Err(format!("leaf {i} has a non-finite weight"));
                }
                continue;
            }

            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child < 0 || child as usize >= nodes.len() {
                    return Err(format!("node {i} has invalid {side} child {child}"));
                }
            }

            if node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "node {i} splits on feature {} but the model has {feature_count}",
                    node.feature_idx
                ));
            }
        }

        // Every node reachable from the root must have exactly one parent.
        let mut seen = vec![false; nodes.len()];
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut seen[idx], true) {
                return Err(format!("node {idx} is reachable along more than one path"));
            }
            let node = &nodes[idx];
            if !node.is_leaf() {
                stack.push(node.left as usize);
                stack.push(node.right as usize);
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Walks from the root to a leaf and returns its weight.
    ///
    /// Goes left when `value < condition`; a missing (NaN) value follows the
    /// node's default direction.
    pub fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut idx = 0usize;

        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.condition;
            }

            let value = features
                .get(node.feature_idx as usize)
                .copied()
                .unwrap_or(f32::NAN);
            let go_left = if value.is_nan() {
                node.default_left
            } else {
                value < node.condition
            };

            idx = if go_left { node.left } else { node.right } as usize;
        }
    }
}
