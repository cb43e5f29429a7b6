//! Loader for the plain-text sector format used by the 3D world lesson.
//!
//! ```text
//! // comment lines start with a slash
//! NUMPOLLIES 2
//!
//! // floor
//! -3.0  0.0 -3.0  0.0 6.0
//! -3.0  0.0  3.0  0.0 0.0
//!  3.0  0.0  3.0  6.0 0.0
//! ...
//! ```
//!
//! The header gives the triangle count; each triangle is three `x y z u v`
//! lines. Blank lines and lines starting with `/` may appear anywhere.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::mesh::VertexTexture;

const MAX_RESERVED_VERTICES: usize = 4096;

/// Errors produced while reading a world file.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read world data: {0}")]
    Io(#[from] io::Error),
    #[error("world data ended before the NUMPOLLIES header")]
    MissingHeader,
    #[error("line {line}: expected `NUMPOLLIES <count>`, found {text:?}")]
    BadHeader { line: usize, text: String },
    #[error("line {line}: expected `x y z u v`, found {text:?}")]
    BadVertex { line: usize, text: String },
    #[error("world data ended after {found} of {expected} vertices")]
    Truncated { expected: usize, found: usize },
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Triangle {
    pub vertices: [VertexTexture; 3],
}

/// A sector of world geometry.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub triangles: Vec<Triangle>,
}

impl World {
    /// Reads a world file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let file = File::open(path.as_ref())?;
        let world = Self::parse(BufReader::new(file))?;
        log::debug!(
            "loaded {} triangles from {}",
            world.triangles.len(),
            path.as_ref().display()
        );
        Ok(world)
    }

    /// Parses world data from any buffered reader.
    pub fn parse(reader: impl BufRead) -> Result<Self, WorldError> {
        let mut lines = DataLines::new(reader);

        let (line, text) = lines.next_line()?.ok_or(WorldError::MissingHeader)?;
        let expected = parse_header(&text)
            .and_then(|count| count.checked_mul(3))
            .ok_or(WorldError::BadHeader { line, text })?;

        // header counts are untrusted
        let mut vertices = Vec::with_capacity(expected.min(MAX_RESERVED_VERTICES));
        while vertices.len() < expected {
            let Some((line, text)) = lines.next_line()? else {
                return Err(WorldError::Truncated {
                    expected,
                    found: vertices.len(),
                });
            };
            let vertex = parse_vertex(&text).ok_or(WorldError::BadVertex { line, text })?;
            vertices.push(vertex);
        }

        let triangles = vertices
            .chunks_exact(3)
            .map(|tri| Triangle {
                vertices: [tri[0], tri[1], tri[2]],
            })
            .collect();
        Ok(Self { triangles })
    }

    /// All vertices in triangle order, ready for a non-indexed draw.
    pub fn vertices(&self) -> Vec<VertexTexture> {
        self.triangles.iter().flat_map(|t| t.vertices).collect()
    }

    pub fn vertex_count(&self) -> u32 {
        (self.triangles.len() * 3) as u32
    }
}

/// Iterates the meaningful lines of a world file with 1-based line numbers.
struct DataLines<R> {
    reader: R,
    line: usize,
}

impl<R: BufRead> DataLines<R> {
    fn new(reader: R) -> Self {
        Self { reader, line: 0 }
    }

    fn next_line(&mut self) -> io::Result<Option<(usize, String)>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = buf.trim();
            if text.is_empty() || text.starts_with('/') {
                continue;
            }
            return Ok(Some((self.line, text.to_owned())));
        }
    }
}

fn parse_header(text: &str) -> Option<usize> {
    let mut parts = text.split_whitespace();
    if parts.next()? != "NUMPOLLIES" {
        return None;
    }
    parts.next()?.parse().ok()
}

fn parse_vertex(text: &str) -> Option<VertexTexture> {
    let mut values = [0.0f32; 5];
    let mut parts = text.split_whitespace();
    for value in &mut values {
        *value = parts.next()?.parse().ok()?;
    }
    let [x, y, z, u, v] = values;
    Some(VertexTexture::new([x, y, z], [u, v]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
// A tiny world
NUMPOLLIES 2

// Floor 1
-3.0  0.0 -3.0 0.0 6.0
-3.0  0.0  3.0 0.0 0.0
 3.0  0.0  3.0 6.0 0.0
\r
-3.0  0.0 -3.0 0.0 6.0
 3.0  0.0 -3.0 6.0 6.0
 3.0  0.0  3.0 6.0 0.0
";

    #[test]
    fn parses_triangles_and_skips_comments() {
        let world = World::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(world.triangles.len(), 2);
        assert_eq!(world.vertex_count(), 6);

        let first = world.triangles[0].vertices[0];
        assert_eq!(first.position, [-3.0, 0.0, -3.0]);
        assert_eq!(first.uv, [0.0, 6.0]);

        let last = world.triangles[1].vertices[2];
        assert_eq!(last.position, [3.0, 0.0, 3.0]);
        assert_eq!(last.uv, [6.0, 0.0]);
    }

    #[test]
    fn flattened_vertices_keep_order() {
        let world = World::parse(SAMPLE.as_bytes()).unwrap();
        let vertices = world.vertices();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[4].position, [3.0, 0.0, -3.0]);
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = World::parse("// nothing here\n".as_bytes()).unwrap_err();
        assert!(matches!(err, WorldError::MissingHeader));
    }

    #[test]
    fn malformed_header_reports_line() {
        let err = World::parse("\nNUMTRIS 4\n".as_bytes()).unwrap_err();
        assert!(matches!(err, WorldError::BadHeader { line: 2, .. }));
    }

    #[test]
    fn malformed_vertex_reports_line() {
        let data = "NUMPOLLIES 1\n1 2 3 4 5\n1 2 three 4 5\n";
        let err = World::parse(data.as_bytes()).unwrap_err();
        assert!(matches!(err, WorldError::BadVertex { line: 3, .. }));
    }

    #[test]
    fn huge_header_count_is_an_error() {
        let data = format!("NUMPOLLIES {}\n1 2 3 4 5\n", usize::MAX);
        let err = World::parse(data.as_bytes()).unwrap_err();
        assert!(matches!(err, WorldError::BadHeader { line: 1, .. }));
    }

    #[test]
    fn large_header_count_is_truncated() {
        let data = "NUMPOLLIES 1000000000000000\n1 2 3 4 5\n";
        let err = World::parse(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            WorldError::Truncated {
                expected: 3_000_000_000_000_000,
                found: 1
            }
        ));
    }

    #[test]
    fn short_file_is_truncated() {
        let data = "NUMPOLLIES 2\n1 2 3 4 5\n1 2 3 4 5\n1 2 3 4 5\n";
        let err = World::parse(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            WorldError::Truncated {
                expected: 6,
                found: 3
            }
        ));
    }
}
