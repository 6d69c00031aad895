//! CPU-side geometry: loading, editing and built-in furniture models.
//!
//! [`RawGeometry`] is the intermediate representation between a model source and
//! a GPU [`Mesh`]. Sources are:
//!
//! | Format  | Extensions      | Notes |
//! |---------|-----------------|-------|
//! | glTF    | `.gltf`, `.glb` | Triangle primitives of the default scene, node transforms baked in |
//! | STL     | `.stl`          | Binary and ASCII, no UV coordinates |
//! | Builtin | -               | Procedural stool, table and bench assembled from boxes |
//!
//! Loaded geometry is usually passed through [`RawGeometry::prepared`] so every
//! catalog model sits centered at the origin inside a unit bounding box.

use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

/// Errors that can occur when loading geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// File format could not be determined from extension.
    #[error("unknown geometry format: '{0}'")]
    UnknownFormat(String),
    /// The geometry data was invalid or corrupt.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Procedural models that need no asset files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    Stool,
    Table,
    Bench,
}

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Creates raw geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Loads geometry from a file, detecting the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "stl" => {
                let file = std::fs::File::open(path)?;
                let mut reader = std::io::BufReader::new(file);
                parse_stl(&mut reader)
            }
            "gltf" | "glb" => load_gltf(path),
            _ => Err(GeometryError::UnknownFormat(ext)),
        }
    }

    /// Parses STL geometry from an in-memory buffer.
    pub fn from_stl_bytes(bytes: &[u8]) -> Result<Self, GeometryError> {
        let mut cursor = std::io::Cursor::new(bytes);
        parse_stl(&mut cursor)
    }

    /// Builds one of the procedural furniture models.
    ///
    /// Dimensions are in meters with the floor at `y = 0`.
    pub fn builtin(kind: Builtin) -> Self {
        let mut geometry = RawGeometry::default();
        match kind {
            Builtin::Stool => {
                geometry.append(&Self::cuboid(
                    Vec3::new(-0.2, 0.62, -0.2),
                    Vec3::new(0.2, 0.68, 0.2),
                ));
                for (x, z) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                    let c = Vec3::new(x * 0.15, 0.0, z * 0.15);
                    geometry.append(&Self::cuboid(
                        c + Vec3::new(-0.025, 0.0, -0.025),
                        c + Vec3::new(0.025, 0.62, 0.025),
                    ));
                }
                // footrest ring
                geometry.append(&Self::cuboid(
                    Vec3::new(-0.15, 0.22, 0.13),
                    Vec3::new(0.15, 0.25, 0.16),
                ));
                geometry.append(&Self::cuboid(
                    Vec3::new(-0.15, 0.22, -0.16),
                    Vec3::new(0.15, 0.25, -0.13),
                ));
            }
            Builtin::Table => {
                geometry.append(&Self::cuboid(
                    Vec3::new(-0.8, 0.71, -0.45),
                    Vec3::new(0.8, 0.75, 0.45),
                ));
                for (x, z) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                    let c = Vec3::new(x * 0.72, 0.0, z * 0.37);
                    geometry.append(&Self::cuboid(
                        c + Vec3::new(-0.035, 0.0, -0.035),
                        c + Vec3::new(0.035, 0.71, 0.035),
                    ));
                }
                geometry.append(&Self::cuboid(
                    Vec3::new(-0.7, 0.6, -0.02),
                    Vec3::new(0.7, 0.66, 0.02),
                ));
            }
            Builtin::Bench => {
                geometry.append(&Self::cuboid(
                    Vec3::new(-0.8, 0.42, -0.18),
                    Vec3::new(0.8, 0.46, 0.18),
                ));
                for x in [-0.65, 0.65] {
                    geometry.append(&Self::cuboid(
                        Vec3::new(x - 0.03, 0.0, -0.16),
                        Vec3::new(x + 0.03, 0.42, 0.16),
                    ));
                }
                geometry.append(&Self::cuboid(
                    Vec3::new(-0.62, 0.12, -0.02),
                    Vec3::new(0.62, 0.16, 0.02),
                ));
            }
        }
        geometry
    }

    /// An axis-aligned box with per-face normals, CCW winding.
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let corner = |x: bool, y: bool, z: bool| -> [f32; 3] {
            [
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            ]
        };

        #[rustfmt::skip]
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([ 0.0,  0.0,  1.0], [corner(false, false, true),  corner(true, false, true),   corner(true, true, true),    corner(false, true, true)]),
            ([ 0.0,  0.0, -1.0], [corner(true, false, false),  corner(false, false, false), corner(false, true, false),  corner(true, true, false)]),
            ([ 0.0,  1.0,  0.0], [corner(false, true, true),   corner(true, true, true),    corner(true, true, false),   corner(false, true, false)]),
            ([ 0.0, -1.0,  0.0], [corner(false, false, false), corner(true, false, false),  corner(true, false, true),   corner(false, false, true)]),
            ([ 1.0,  0.0,  0.0], [corner(true, false, true),   corner(true, false, false),  corner(true, true, false),   corner(true, true, true)]),
            ([-1.0,  0.0,  0.0], [corner(false, false, false), corner(false, false, true),  corner(false, true, true),   corner(false, true, false)]),
        ];
        const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, quad) in faces {
            let base = vertices.len() as u32;
            for (position, uv) in quad.into_iter().zip(UVS) {
                vertices.push(Vertex3d::new(position, normal, uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        Self::new(vertices, indices)
    }

    /// Appends another geometry, rebasing its indices.
    pub fn append(&mut self, other: &RawGeometry) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns `(min, max)` corners of the bounding box.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Returns the center point of the geometry.
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Returns the size of the bounding box.
    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).into();
        }
    }

    /// Scales all vertices uniformly around the origin.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) * factor).into();
        }
    }

    /// Rotates all vertices and normals by the given quaternion.
    pub fn rotate(&mut self, rotation: Quat) {
        for v in &mut self.vertices {
            v.position = (rotation * Vec3::from(v.position)).into();
            v.normal = (rotation * Vec3::from(v.normal)).into();
        }
    }

    /// Centers the geometry at the origin.
    pub fn recenter(&mut self) {
        let center = self.center();
        self.translate(-center);
    }

    /// Scales the geometry to fit within a unit cube (-0.5 to 0.5).
    pub fn normalize(&mut self) {
        let size = self.size();
        let max_dim = size.x.max(size.y).max(size.z);
        if max_dim > 0.0 {
            self.scale(1.0 / max_dim);
        }
    }

    /// Recenter and normalize, the form every catalog model is stored in.
    pub fn prepared(mut self) -> Self {
        if !self.vertices.is_empty() {
            self.recenter();
            self.normalize();
        }
        self
    }

    /// Recalculates smooth vertex normals by averaging the area-weighted face
    /// normals of every triangle sharing a vertex.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let face_normal = (p1 - p0).cross(p2 - p0);

            for i in [i0, i1, i2] {
                self.vertices[i].normal = (Vec3::from(self.vertices[i].normal) + face_normal).into();
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }

    /// Uploads this geometry to the GPU as a [`Mesh`].
    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

fn parse_stl<R: std::io::Read + std::io::Seek>(
    reader: &mut R,
) -> Result<RawGeometry, GeometryError> {
    let stl = stl_io::read_stl(reader)
        .map_err(|e| GeometryError::Parse(format!("STL parse error: {e}")))?;

    let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
    let mut indices = Vec::with_capacity(stl.faces.len() * 3);

    for (i, face) in stl.faces.iter().enumerate() {
        let normal: [f32; 3] = face.normal.into();
        for &vertex_idx in &face.vertices {
            let position: [f32; 3] = stl.vertices[vertex_idx].into();
            vertices.push(Vertex3d::new(position, normal, [0.0, 0.0]));
        }
        let base = (i * 3) as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    Ok(RawGeometry::new(vertices, indices))
}

fn load_gltf(path: &Path) -> Result<RawGeometry, GeometryError> {
    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| GeometryError::Parse(format!("glTF import error: {e}")))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| GeometryError::Parse("glTF document has no scenes".to_string()))?;

    let mut geometry = RawGeometry::default();
    let mut missing_normals = false;
    for node in scene.nodes() {
        append_gltf_node(
            &mut geometry,
            &node,
            &buffers,
            Mat4::IDENTITY,
            &mut missing_normals,
        )?;
    }

    if geometry.is_empty() {
        return Err(GeometryError::Parse(
            "glTF scene contains no triangle meshes".to_string(),
        ));
    }
    if missing_normals {
        geometry.recalculate_normals();
    }
    Ok(geometry)
}

fn append_gltf_node(
    geometry: &mut RawGeometry,
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Mat4,
    missing_normals: &mut bool,
) -> Result<(), GeometryError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    let normal_matrix = world.inverse().transpose();

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
            let uvs: Option<Vec<[f32; 2]>> =
                reader.read_tex_coords(0).map(|t| t.into_f32().collect());
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(GeometryError::Parse(format!(
                    "glTF mesh '{}' indexes vertex {bad} of {}",
                    mesh.name().unwrap_or("unnamed"),
                    positions.len()
                )));
            }
            if normals.is_none() {
                *missing_normals = true;
            }

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, &p)| {
                    let position = world.transform_point3(Vec3::from(p));
                    let normal = normals
                        .as_ref()
                        .and_then(|n| n.get(i))
                        .map(|&n| normal_matrix.transform_vector3(Vec3::from(n)).normalize_or_zero())
                        .unwrap_or(Vec3::ZERO);
                    let uv = uvs.as_ref().and_then(|t| t.get(i)).copied().unwrap_or([0.0, 0.0]);
                    Vertex3d::new(position.into(), normal.into(), uv)
                })
                .collect();

            geometry.append(&RawGeometry::new(vertices, indices));
        }
    }

    for child in node.children() {
        append_gltf_node(geometry, &child, buffers, world, missing_normals)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_geometry_bounds() {
        let vertices = vec![
            Vertex3d::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([-1.0, -1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        ];
        let geom = RawGeometry::new(vertices, vec![0, 1, 2]);

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = RawGeometry::cuboid(Vec3::ZERO, Vec3::ONE);
        let b = RawGeometry::cuboid(Vec3::ONE, Vec3::splat(2.0));
        a.append(&b);

        assert_eq!(a.vertices.len(), 48);
        assert_eq!(a.indices.len(), 72);
        assert_eq!(*a.indices.iter().max().unwrap(), 47);
    }

    #[test]
    fn cuboid_normals_point_outward() {
        let geom = RawGeometry::cuboid(Vec3::splat(-1.0), Vec3::splat(1.0));
        for tri in geom.indices.chunks_exact(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from(geom.vertices[i as usize].position))
                .collect();
            let winding = (p[1] - p[0]).cross(p[2] - p[0]);
            let normal = Vec3::from(geom.vertices[tri[0] as usize].normal);
            assert!(winding.dot(normal) > 0.0);
        }
    }

    #[test]
    fn prepared_builtins_fit_unit_cube_at_origin() {
        for kind in [Builtin::Stool, Builtin::Table, Builtin::Bench] {
            let geom = RawGeometry::builtin(kind).prepared();
            let size = geom.size();
            let largest = size.x.max(size.y).max(size.z);
            assert!((largest - 1.0).abs() < 1e-4, "{kind:?} largest extent {largest}");
            assert!(geom.center().length() < 1e-4);
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = RawGeometry::from_file("model.obj").unwrap_err();
        assert!(matches!(err, GeometryError::UnknownFormat(ext) if ext == "obj"));
    }

    #[test]
    fn garbage_stl_bytes_fail_to_parse() {
        assert!(RawGeometry::from_stl_bytes(b"not an stl").is_err());
    }

    /// Writes a one-triangle glTF without normals into a fresh temp directory.
    fn write_triangle_gltf(name: &str, indices: [u16; 3]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("xfade-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut bin = Vec::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]);
        std::fs::write(dir.join("triangle.bin"), &bin).unwrap();

        let json = r#"{
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0 }],
            "meshes": [{ "name": "tri", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
            "buffers": [{ "uri": "triangle.bin", "byteLength": 44 }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
                { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
            ]
        }"#;
        let path = dir.join("triangle.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn gltf_without_normals_gets_computed_normals() {
        let path = write_triangle_gltf("good", [0, 1, 2]);
        let geom = RawGeometry::from_file(&path).unwrap();

        assert_eq!(geom.vertices.len(), 3);
        assert_eq!(geom.indices, [0, 1, 2]);
        for v in &geom.vertices {
            assert!((Vec3::from(v.normal) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn gltf_index_past_vertex_count_is_a_parse_error() {
        let path = write_triangle_gltf("bad-index", [0, 1, 7]);
        let err = RawGeometry::from_file(&path).unwrap_err();
        assert!(matches!(err, GeometryError::Parse(msg) if msg.contains("vertex 7 of 3")));
    }
}
