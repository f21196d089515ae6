//! Connected-component partition of a face list.
//!
//! Two faces are connected when they share at least one vertex position
//! (compared with [`VertexKey`]). Every face of the input lands in exactly
//! one [`FaceGroup`]; groups are returned in the order their first face
//! appears in the input.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use crate::geometry::Face;
use crate::vertex_key::VertexKey;

/// A maximal set of connected faces, as indices into the source face list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceGroup {
    faces: Vec<usize>,
}

impl FaceGroup {
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn into_faces(self) -> Vec<usize> {
        self.faces
    }
}

fn face_keys(face: &Face, vertices: &[Point3<f32>]) -> [VertexKey; 3] {
    face.indices().map(|index| VertexKey::of(&vertices[index]))
}

#[derive(Debug, Default)]
struct Bucket {
    keys: HashSet<VertexKey>,
    faces: Vec<usize>,
}

impl Bucket {
    fn touches(&self, keys: &[VertexKey; 3]) -> bool {
        keys.iter().any(|key| self.keys.contains(key))
    }

    fn push(&mut self, face: usize, keys: [VertexKey; 3]) {
        self.faces.push(face);
        self.keys.extend(keys);
    }

    fn absorb(&mut self, other: Bucket) {
        self.faces.extend(other.faces);
        self.keys.extend(other.keys);
    }
}

/// Group faces by scanning every open bucket for each face.
///
/// Runs in O(faces × groups). A face touching several buckets joins the
/// first one and the others are merged into it; merged buckets stay behind
/// as empty tombstones so bucket ids are never reused, and are dropped at
/// the end.
///
/// Faces must index into `vertices`.
pub fn group_faces(faces: &[Face], vertices: &[Point3<f32>]) -> Vec<FaceGroup> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for (index, face) in faces.iter().enumerate() {
        let keys = face_keys(face, vertices);
        let owners: Vec<usize> = buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| bucket.touches(&keys))
            .map(|(id, _)| id)
            .collect();

        match owners.split_first() {
            None => {
                let mut bucket = Bucket::default();
                bucket.push(index, keys);
                buckets.push(bucket);
            }
            Some((&first, rest)) => {
                buckets[first].push(index, keys);
                for &other in rest {
                    let merged = std::mem::take(&mut buckets[other]);
                    buckets[first].absorb(merged);
                }
            }
        }
    }

    buckets
        .into_iter()
        .filter(|bucket| !bucket.faces.is_empty())
        .map(|bucket| FaceGroup {
            faces: bucket.faces,
        })
        .collect()
}

/// Disjoint sets over vertex slots, with path compression and union by rank.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl DisjointSet {
    fn new() -> Self {
        Self {
            parent: Vec::new(),
            rank: Vec::new(),
        }
    }

    fn make_set(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Group faces with a disjoint-set forest keyed by vertex position.
///
/// Produces the same partition and group order as [`group_faces`] in
/// near-linear time. Within a group, faces keep their input order.
pub fn group_faces_union_find(faces: &[Face], vertices: &[Point3<f32>]) -> Vec<FaceGroup> {
    let mut slots: HashMap<VertexKey, usize> = HashMap::new();
    let mut sets = DisjointSet::new();
    let mut face_slots = Vec::with_capacity(faces.len());

    for face in faces {
        let keys = face_keys(face, vertices);
        let mut ids = [0usize; 3];
        for (id, key) in ids.iter_mut().zip(keys) {
            *id = *slots.entry(key).or_insert_with(|| sets.make_set());
        }
        sets.union(ids[0], ids[1]);
        sets.union(ids[0], ids[2]);
        face_slots.push(ids[0]);
    }

    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<FaceGroup> = Vec::new();
    for (index, slot) in face_slots.into_iter().enumerate() {
        let root = sets.find(slot);
        let group = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(FaceGroup::default());
            groups.len() - 1
        });
        groups[group].faces.push(index);
    }
    groups
}
