/// Geometry primitives: loose triangles and indexed mesh geometry
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A triangle carrying its own vertex coordinates and face normal.
///
/// This is the face format exchanged with loaders and front-ends, and the
/// format mesh splitting emits for each piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub normals: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

impl Triangle {
    pub fn new(normal: [f32; 3], v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> Self {
        Self {
            normals: normal,
            vertices: [v0, v1, v2],
        }
    }

    /// Build a triangle from three points, deriving the normal from the winding.
    pub fn from_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = face_normal(&a, &b, &c);
        Self::new(
            [normal.x, normal.y, normal.z],
            [a.x, a.y, a.z],
            [b.x, b.y, b.z],
            [c.x, c.y, c.z],
        )
    }

    pub fn positions(&self) -> [Point3<f32>; 3] {
        self.vertices.map(|[x, y, z]| Point3::new(x, y, z))
    }

    pub fn normal(&self) -> Vector3<f32> {
        Vector3::from(self.normals)
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.positions();
        face_normal(&v0, &v1, &v2)
    }
}

fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    (b - a)
        .cross(&(c - a))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::z)
}

/// A face of an indexed geometry: three indices into the vertex buffer plus a normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub normal: Vector3<f32>,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize, normal: Vector3<f32>) -> Self {
        Self { a, b, c, normal }
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }
}

/// Axis-aligned bounds of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            min: *first,
            max: *first,
        };
        for point in points {
            bounds.min = bounds.min.inf(point);
            bounds.max = bounds.max.sup(point);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Indexed triangle geometry backing a scene mesh.
///
/// Built from a triangle list by appending each triangle's three vertices,
/// so the buffer never shares indices between faces. Faces that touch are
/// recognised by coordinate equality instead (see [`crate::grouping`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
}

impl MeshGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut geometry = Self {
            vertices: Vec::with_capacity(triangles.len() * 3),
            faces: Vec::with_capacity(triangles.len()),
        };
        for triangle in triangles {
            geometry.push_triangle(triangle);
        }
        geometry
    }

    pub fn push_triangle(&mut self, triangle: &Triangle) {
        let base = self.vertices.len();
        self.vertices.extend(triangle.positions());
        self.faces
            .push(Face::new(base, base + 1, base + 2, triangle.normal()));
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Move the geometry so its bounding box is centred on the origin.
    ///
    /// Returns the offset that was applied.
    pub fn center(&mut self) -> Vector3<f32> {
        let Some(bounds) = self.bounding_box() else {
            return Vector3::zeros();
        };
        let offset = -bounds.center().coords;
        self.translate(&offset);
        offset
    }

    /// Centre the geometry, then raise it so its lowest point sits on `z = 0`.
    ///
    /// Returns the centring offset, before the vertical lift.
    pub fn center_on_floor(&mut self) -> Vector3<f32> {
        let offset = self.center();
        if let Some(bounds) = self.bounding_box() {
            self.translate(&Vector3::new(0.0, 0.0, -bounds.min.z));
        }
        offset
    }

    /// Re-express one face as a self-contained triangle.
    pub fn triangle(&self, face: &Face) -> Triangle {
        let [a, b, c] = face.indices().map(|i| {
            let p = self.vertices[i];
            [p.x, p.y, p.z]
        });
        Triangle::new([face.normal.x, face.normal.y, face.normal.z], a, b, c)
    }

    /// Re-express the faces at `indices` as a triangle list, decoupled from
    /// the shared vertex buffer.
    pub fn triangles(&self, indices: &[usize]) -> Vec<Triangle> {
        indices
            .iter()
            .map(|&index| self.triangle(&self.faces[index]))
            .collect()
    }

    pub fn to_triangles(&self) -> Vec<Triangle> {
        self.faces.iter().map(|face| self.triangle(face)).collect()
    }
}

/// Axis-aligned cube centred on the origin, two triangles per side.
pub fn cube(size: f32) -> Vec<Triangle> {
    let h = size / 2.0;
    // Each side: outward normal followed by its corners in counter-clockwise order.
    let sides: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
        ([0.0, 0.0, -1.0], [[-h, -h, -h], [-h, h, -h], [h, h, -h], [h, -h, -h]]),
        ([0.0, 1.0, 0.0], [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]]),
        ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
        ([1.0, 0.0, 0.0], [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]]),
        ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
    ];

    sides
        .iter()
        .flat_map(|&(normal, [c0, c1, c2, c3])| {
            [
                Triangle::new(normal, c0, c1, c2),
                Triangle::new(normal, c0, c2, c3),
            ]
        })
        .collect()
}
