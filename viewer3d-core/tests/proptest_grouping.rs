//! Property-based tests for face grouping.
//!
//! Triangles are drawn from a small pool of grid positions so that shared
//! vertices, and therefore non-trivial components, are common.
//!
//! Run with: cargo test -p viewer3d-core -- proptest

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use viewer3d_core::{group_faces, group_faces_union_find, FaceGroup, MeshGeometry, Triangle, VertexKey};

// =============================================================================
// Strategies
// =============================================================================

fn arb_triangle(pool: usize) -> impl Strategy<Value = Triangle> {
    prop::array::uniform3(0..pool).prop_map(|corners| {
        let [a, b, c] = corners.map(|i| [(i % 4) as f32, (i / 4 % 4) as f32, (i / 16) as f32]);
        Triangle::new([0.0, 0.0, 1.0], a, b, c)
    })
}

fn arb_geometry() -> impl Strategy<Value = MeshGeometry> {
    prop::collection::vec(arb_triangle(48), 0..40)
        .prop_map(|triangles| MeshGeometry::from_triangles(&triangles))
}

fn keys(geometry: &MeshGeometry, face: usize) -> HashSet<VertexKey> {
    geometry.faces[face]
        .indices()
        .iter()
        .map(|&index| VertexKey::of(&geometry.vertices[index]))
        .collect()
}

fn as_sets(groups: &[FaceGroup]) -> Vec<BTreeSet<usize>> {
    groups
        .iter()
        .map(|group| group.faces().iter().copied().collect())
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_groups_partition_faces(geometry in arb_geometry()) {
        let groups = group_faces(&geometry.faces, &geometry.vertices);

        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.faces().to_vec()).collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..geometry.face_count()).collect();
        prop_assert_eq!(seen, expected);
        prop_assert!(groups.iter().all(|group| !group.is_empty()));
    }

    #[test]
    fn proptest_groups_do_not_touch(geometry in arb_geometry()) {
        let groups = group_faces(&geometry.faces, &geometry.vertices);
        let group_keys: Vec<HashSet<VertexKey>> = groups
            .iter()
            .map(|group| group.faces().iter().flat_map(|&face| keys(&geometry, face)).collect())
            .collect();

        for (i, a) in group_keys.iter().enumerate() {
            for b in &group_keys[i + 1..] {
                prop_assert!(a.is_disjoint(b));
            }
        }
    }

    #[test]
    fn proptest_groups_are_connected(geometry in arb_geometry()) {
        for group in group_faces(&geometry.faces, &geometry.vertices) {
            let faces = group.faces();
            let mut reached = vec![faces[0]];
            let mut frontier: HashSet<VertexKey> = keys(&geometry, faces[0]);
            let mut changed = true;
            while changed {
                changed = false;
                for &face in faces {
                    if reached.contains(&face) {
                        continue;
                    }
                    let face_keys = keys(&geometry, face);
                    if !face_keys.is_disjoint(&frontier) {
                        frontier.extend(face_keys);
                        reached.push(face);
                        changed = true;
                    }
                }
            }
            prop_assert_eq!(reached.len(), faces.len());
        }
    }

    #[test]
    fn proptest_union_find_matches_buckets(geometry in arb_geometry()) {
        let buckets = group_faces(&geometry.faces, &geometry.vertices);
        let union_find = group_faces_union_find(&geometry.faces, &geometry.vertices);
        prop_assert_eq!(as_sets(&buckets), as_sets(&union_find));
    }

    #[test]
    fn proptest_regrouping_a_group_is_idempotent(geometry in arb_geometry()) {
        for group in group_faces(&geometry.faces, &geometry.vertices) {
            let piece = MeshGeometry::from_triangles(&geometry.triangles(group.faces()));
            let regrouped = group_faces(&piece.faces, &piece.vertices);
            prop_assert_eq!(regrouped.len(), 1);
            prop_assert_eq!(regrouped[0].len(), group.len());
        }
    }
}
