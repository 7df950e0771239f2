use anyhow::{bail, ensure, Result};

use super::vertex::{Pos, Rgb, Vertex};

/// Indexed triangle-list geometry for the color pipeline.
///
/// Front faces wind counter-clockwise; back faces are culled.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl Mesh {
    /// Largest vertex count addressable by `u16` indices.
    pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Result<Self> {
        ensure!(!vertices.is_empty(), "mesh has no vertices");
        ensure!(!indices.is_empty(), "mesh has no indices");
        ensure!(
            vertices.len() <= Self::MAX_VERTICES,
            "mesh has {} vertices, u16 indices address at most {}",
            vertices.len(),
            Self::MAX_VERTICES
        );
        ensure!(
            indices.len() % 3 == 0,
            "triangle list index count {} is not a multiple of 3",
            indices.len()
        );

        if let Some((i, idx)) = indices
            .iter()
            .enumerate()
            .find(|(_, idx)| **idx as usize >= vertices.len())
        {
            bail!("index {idx} at position {i} is out of range for {} vertices", vertices.len());
        }

        if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
            bail!("vertex {i} has a non-finite component");
        }

        Ok(Self { vertices, indices })
    }

    /// Red/green/blue triangle centered on the origin.
    pub fn triangle() -> Self {
        Self {
            vertices: vec![
                Vertex::new(Pos::new(0.0, 0.5, 0.0), Rgb::RED),
                Vertex::new(Pos::new(-0.5, -0.5, 0.0), Rgb::GREEN),
                Vertex::new(Pos::new(0.5, -0.5, 0.0), Rgb::BLUE),
            ],
            indices: vec![0, 1, 2],
        }
    }

    /// Unit-half square, one color per corner.
    pub fn square() -> Self {
        Self {
            // Starts at the top left corner, goes counter-clockwise.
            vertices: vec![
                Vertex::new(Pos::new(-0.5, 0.5, 0.0), Rgb::RED),
                Vertex::new(Pos::new(-0.5, -0.5, 0.0), Rgb::GREEN),
                Vertex::new(Pos::new(0.5, -0.5, 0.0), Rgb::BLUE),
                Vertex::new(Pos::new(0.5, 0.5, 0.0), Rgb::new(1.0, 1.0, 0.0)),
            ],
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Iterates the triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize],
                self.vertices[t[1] as usize],
                self.vertices[t[2] as usize],
            ]
        })
    }
}

/// Twice the signed area of the triangle projected onto XY (positive = CCW).
pub fn signed_area_xy(tri: &[Vertex; 3]) -> f32 {
    let [a, b, c] = tri.map(|v| v.pos);
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}
