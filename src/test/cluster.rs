use super::support::grid;
use crate::heuristic::{CapacityCalculator, HopClusterer, LinearCapacity, NodeClusterer};

#[test]
fn hop_clusterer_splits_far_apart_groups() {
    let (su, g) = grid(5, 5);
    let anchors = [g.at(0, 0), g.at(0, 1), g.at(4, 4), g.at(4, 3), g.at(1, 0)];

    let two = HopClusterer.cluster(&anchors, 2, &su).expect("cluster");
    assert_eq!(two, vec![1, 1, 2, 2, 1]);

    let one = HopClusterer.cluster(&anchors, 1, &su).expect("cluster");
    assert_eq!(one, vec![1; anchors.len()]);
}

#[test]
fn hop_clusterer_is_deterministic_and_in_range() {
    let (su, g) = grid(5, 5);
    let anchors: Vec<_> = (0..5).map(|i| g.at(i, (i * 3) % 5)).collect();
    for k in 1..=anchors.len() {
        let a = HopClusterer.cluster(&anchors, k, &su).expect("cluster");
        let b = HopClusterer.cluster(&anchors, k, &su).expect("cluster");
        assert_eq!(a, b);
        assert_eq!(a.len(), anchors.len());
        assert!(a.iter().all(|&c| (1..=k).contains(&c)));
    }
    // k 等于锚点数时每个锚点自成一簇
    let all = HopClusterer.cluster(&anchors, anchors.len(), &su).expect("cluster");
    let mut sorted = all.clone();
    sorted.sort();
    assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
}

#[test]
fn duplicate_anchors_share_a_cluster() {
    let (su, g) = grid(3, 3);
    let anchors = [g.at(0, 0), g.at(2, 2), g.at(0, 0)];
    let out = HopClusterer.cluster(&anchors, 2, &su).expect("cluster");
    assert_eq!(out, vec![1, 2, 1]);
}

#[test]
fn capacity_calculators() {
    let linear = LinearCapacity::new(2.0, 0.5);
    assert_eq!(linear.capacity_for(10.0), 7.0);
    let closure = |bw: f64| bw * 3.0;
    assert_eq!(closure.capacity_for(2.0), 6.0);
}
