//! Default nearest neighbor guided sampling search.
//!
//! The search subsamples the reference path into hard waypoints, asks the IK
//! callback for a batch of candidate configurations per waypoint, and builds
//! a layered graph in which each candidate connects only to its joint space
//! nearest neighbors in the previous layer. Edges are scored by forward
//! kinematics of interpolated configurations against the interpolated
//! reference poses; the path cost is the worst pose distance along the chain
//! (bottleneck, a Fréchet-like objective tolerant of reparameterization).
//! A minimax Dijkstra over the layers picks the best chain.
//!
//! This is one implementation of [`PathSearch`]; the planner works with any
//! other engine honoring the same contract.

use crate::follow::{PathSearch, SearchCallbacks, SearchRequest};
use crate::kinematic_traits::{Joints, Pose};
use crate::planner_error::PlannerError;
use crate::state::CandidateState;
use crate::trajectory::{AnnotatedJoints, PathFlags, Trajectory};
use crate::utils::is_valid;
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use nalgebra::Translation3;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;
use tracing::debug;

/// Nearest neighbor guided search over layered IK candidates.
#[derive(Debug, Default)]
pub struct NearestNeighborSearch {
    /// Flag to print a summary of graph construction and search if required.
    pub debug: bool,
}

/// One IK candidate with its task space distance to the waypoint it was
/// sampled for.
struct LayerNode {
    state: CandidateState,
    cost: f64,
}

#[derive(Debug, PartialEq)]
struct Node {
    cost: f64,       // Bottleneck cost to reach this node
    layer: usize,    // Waypoint layer index
    node_idx: usize, // Candidate index within the layer
}

// Priority queue requires ordering; smallest cost should be at the top
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Node {}

/// Linear interpolation in joint space.
fn interpolate_joints(from: &Joints, to: &Joints, fraction: f64) -> Joints {
    std::array::from_fn(|i| from[i] + (to[i] - from[i]) * fraction)
}

/// Interpolate translation linearly and rotation by slerp.
fn interpolate_pose(from: &Pose, to: &Pose, fraction: f64) -> Pose {
    let translation = from.translation.vector.lerp(&to.translation.vector, fraction);
    let rotation = from.rotation.slerp(&to.rotation, fraction);
    Pose::from_parts(Translation3::from(translation), rotation)
}

/// Evenly spaced indices into the reference path, first and last included.
/// A reference shorter than the requested count uses every pose.
fn waypoint_indices(reference_len: usize, requested: usize) -> Vec<usize> {
    let count = requested.max(1).min(reference_len);
    if count == 1 {
        return vec![0];
    }
    let mut indices: Vec<usize> = (0..count)
        .map(|i| (i * (reference_len - 1)) / (count - 1))
        .collect();
    indices.dedup();
    indices
}

impl NearestNeighborSearch {
    /// Worst pose distance over the interpolated configurations of one edge.
    /// `None` means an interpolated configuration is collision infeasible
    /// and the edge must be discarded.
    fn score_edge(
        callbacks: &mut SearchCallbacks<'_>,
        from: &Joints,
        to: &Joints,
        reference_from: &Pose,
        reference_to: &Pose,
        discretization: usize,
    ) -> Result<Option<f64>, PlannerError> {
        let mut worst = 0.0_f64;
        for step in 1..=discretization {
            let fraction = step as f64 / (discretization + 1) as f64;
            let joints = interpolate_joints(from, to, fraction);
            if !(callbacks.feasible)(&joints) {
                return Ok(None);
            }
            let pose = (callbacks.fk)(&CandidateState::new(joints))?;
            let target = interpolate_pose(reference_from, reference_to, fraction);
            worst = worst.max((callbacks.distance)(&pose, &target));
        }
        Ok(Some(worst))
    }

    /// Sample one candidate layer per waypoint. An empty layer means the
    /// waypoint is unreachable with the given IK budget.
    fn build_layers(
        callbacks: &mut SearchCallbacks<'_>,
        waypoints: &[Pose],
        ik_multiplier: usize,
    ) -> Result<Option<Vec<Vec<LayerNode>>>, PlannerError> {
        let mut layers = Vec::with_capacity(waypoints.len());

        for (layer_idx, waypoint) in waypoints.iter().enumerate() {
            let candidates = (callbacks.ik)(waypoint, ik_multiplier)?;
            let mut layer = Vec::with_capacity(candidates.len());

            for candidate in candidates {
                if !is_valid(candidate.joints()) || !(callbacks.feasible)(candidate.joints()) {
                    continue;
                }
                let pose = (callbacks.fk)(&candidate)?;
                layer.push(LayerNode {
                    state: candidate,
                    cost: (callbacks.distance)(&pose, waypoint),
                });
            }

            debug!(layer_idx, candidates = layer.len(), "candidate layer built");
            if layer.is_empty() {
                debug!(layer_idx, "waypoint unreachable, no feasible IK candidates");
                return Ok(None);
            }
            layers.push(layer);
        }

        Ok(Some(layers))
    }

    /// Incoming edges per node of `layer`, limited to the joint space
    /// nearest neighbors in the previous layer.
    fn connect_layer(
        callbacks: &mut SearchCallbacks<'_>,
        previous: &[LayerNode],
        layer: &[LayerNode],
        reference_from: &Pose,
        reference_to: &Pose,
        nearest_neighbors: usize,
        discretization: usize,
    ) -> Result<Vec<Vec<(usize, f64)>>, PlannerError> {
        let mut index = KdTree::new(6);
        for (prev_idx, node) in previous.iter().enumerate() {
            index.add(node.state.joints().to_vec(), prev_idx).unwrap();
        }
        let fan_out = nearest_neighbors.max(1).min(previous.len());

        let mut incoming = Vec::with_capacity(layer.len());
        for node in layer {
            let neighbors = index
                .nearest(&node.state.joints()[..], fan_out, &squared_euclidean)
                .unwrap();

            let mut edges = Vec::with_capacity(neighbors.len());
            for (_, &prev_idx) in neighbors {
                let edge = Self::score_edge(
                    callbacks,
                    previous[prev_idx].state.joints(),
                    node.state.joints(),
                    reference_from,
                    reference_to,
                    discretization,
                )?;
                if let Some(cost) = edge {
                    edges.push((prev_idx, cost));
                }
            }
            incoming.push(edges);
        }
        Ok(incoming)
    }

    /// Minimax Dijkstra over the layered graph. Returns the chosen candidate
    /// index per layer, or `None` if no chain reaches the last layer.
    fn best_chain(
        layers: &[Vec<LayerNode>],
        edges: &[Vec<Vec<(usize, f64)>>],
    ) -> Option<Vec<usize>> {
        let num_layers = layers.len();
        let mut heap = BinaryHeap::new();
        let mut best_cost: HashMap<(usize, usize), f64> = HashMap::new();
        let mut previous: HashMap<(usize, usize), Option<(usize, usize)>> = HashMap::new();

        // Initialize the queue with the first layer
        for (node_idx, node) in layers[0].iter().enumerate() {
            let key = (0, node_idx);
            best_cost.insert(key, node.cost);
            previous.insert(key, None);
            heap.push(Node {
                cost: node.cost,
                layer: 0,
                node_idx,
            });
        }

        let mut terminal = None;
        while let Some(Node { cost, layer, node_idx }) = heap.pop() {
            if cost > best_cost[&(layer, node_idx)] {
                continue; // Stale queue entry
            }
            if layer == num_layers - 1 {
                terminal = Some((layer, node_idx));
                break;
            }

            for (next_idx, next_node) in layers[layer + 1].iter().enumerate() {
                let edge = edges[layer + 1][next_idx]
                    .iter()
                    .find(|(prev_idx, _)| *prev_idx == node_idx);
                let Some((_, edge_cost)) = edge else {
                    continue;
                };

                // Bottleneck composition: the chain is as bad as its worst pose.
                let new_cost = cost.max(*edge_cost).max(next_node.cost);
                let next_key = (layer + 1, next_idx);

                if best_cost.get(&next_key).map_or(true, |&c| new_cost < c) {
                    best_cost.insert(next_key, new_cost);
                    previous.insert(next_key, Some((layer, node_idx)));
                    heap.push(Node {
                        cost: new_cost,
                        layer: layer + 1,
                        node_idx: next_idx,
                    });
                }
            }
        }

        // Backtrack to construct the chain
        let mut chain = Vec::with_capacity(num_layers);
        let mut current = terminal;
        while let Some(key) = current {
            chain.push(key.1);
            current = previous[&key];
        }
        if chain.len() != num_layers {
            return None;
        }
        chain.reverse();
        Some(chain)
    }
}

impl PathSearch for NearestNeighborSearch {
    fn search(
        &self,
        request: &SearchRequest<'_>,
        callbacks: &mut SearchCallbacks<'_>,
    ) -> Result<Trajectory, PlannerError> {
        let params = request.params;
        let started = Instant::now();

        let indices = waypoint_indices(request.reference.len(), params.num_waypoints);
        let waypoints: Vec<Pose> = indices.iter().map(|&i| request.reference[i]).collect();

        let Some(layers) = Self::build_layers(callbacks, &waypoints, params.ik_multiplier)? else {
            return Ok(Trajectory::empty());
        };

        // Incoming edges per layer; layer 0 has none.
        let mut edges: Vec<Vec<Vec<(usize, f64)>>> = vec![Vec::new()];
        for layer_idx in 1..layers.len() {
            edges.push(Self::connect_layer(
                callbacks,
                &layers[layer_idx - 1],
                &layers[layer_idx],
                &waypoints[layer_idx - 1],
                &waypoints[layer_idx],
                params.nearest_neighbors,
                params.discretization,
            )?);
        }

        let Some(chain) = Self::best_chain(&layers, &edges) else {
            if self.debug {
                println!(
                    "NN search exhausted in {:?}, no feasible chain over {} layers",
                    started.elapsed(),
                    layers.len()
                );
            }
            return Ok(Trajectory::empty());
        };

        let mut trajectory = Trajectory::empty();
        for layer_idx in 0..chain.len() {
            let joints = *layers[layer_idx][chain[layer_idx]].state.joints();
            trajectory.push(AnnotatedJoints {
                joints,
                flags: PathFlags::WAYPOINT,
            });

            if params.include_interpolated && layer_idx + 1 < chain.len() {
                let next = layers[layer_idx + 1][chain[layer_idx + 1]].state.joints();
                for step in 1..=params.discretization {
                    let fraction = step as f64 / (params.discretization + 1) as f64;
                    trajectory.push(AnnotatedJoints {
                        joints: interpolate_joints(&joints, next, fraction),
                        flags: PathFlags::LIN_INTERP,
                    });
                }
            }
        }

        if self.debug {
            println!(
                "NN search took {:?}, {} layers, {} trajectory points",
                started.elapsed(),
                layers.len(),
                trajectory.len()
            );
        }
        Ok(trajectory)
    }
}
