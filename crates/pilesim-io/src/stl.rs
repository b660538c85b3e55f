//! STL triangle soup import, ASCII or binary.
//!
//! Binary layout: 80-byte header, `u32` triangle count, then per triangle a normal and three
//! vertices as little-endian `f32` plus a `u16` attribute count. ASCII files start with
//! `solid` and list `vertex x y z` lines three per facet.

use std::fs;
use std::path::Path;

use pilesim_core::{vec3, Scalar, Vec3};
use tracing::debug;

use crate::{IoError, IoResult};

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

pub type Triangle = [Vec3; 3];

/// Read `path`, multiply every vertex by `scale`, then add `shift`.
pub fn load_stl(path: &Path, scale: Scalar, shift: Vec3) -> IoResult<Vec<Triangle>> {
    let bytes = fs::read(path).map_err(|e| IoError::open(path, e))?;
    let mut tris = parse_stl(&bytes)?;
    for t in tris.iter_mut() {
        for v in t.iter_mut() { *v = *v * scale + shift; }
    }
    debug!(path = %path.display(), triangles = tris.len(), "stl loaded");
    Ok(tris)
}

pub fn parse_stl(bytes: &[u8]) -> IoResult<Vec<Triangle>> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }
    if looks_ascii(bytes) {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| IoError::invalid_content(format!("ASCII STL is not UTF-8: {e}")))?;
        parse_ascii(text)
    } else {
        parse_binary(bytes)
    }
}

/// `solid` prefix and no size match for a binary body. Some exporters write `solid` into
/// binary headers.
fn looks_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let starts_solid = String::from_utf8_lossy(head).trim_start().starts_with("solid");
    if !starts_solid { return false; }
    if bytes.len() >= HEADER_SIZE + 4 {
        let n = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
        if bytes.len() == HEADER_SIZE + 4 + n * TRIANGLE_SIZE { return false; }
    }
    !head.contains(&0)
}

fn parse_binary(bytes: &[u8]) -> IoResult<Vec<Triangle>> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::invalid_content(format!(
            "binary STL header: expected {} bytes, got {}", HEADER_SIZE + 4, bytes.len()
        )));
    }
    let n = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    let body = &bytes[HEADER_SIZE + 4..];
    if body.len() < n * TRIANGLE_SIZE {
        return Err(IoError::invalid_content(format!(
            "binary STL announces {n} triangles, holds {}", body.len() / TRIANGLE_SIZE
        )));
    }
    Ok(body.chunks_exact(TRIANGLE_SIZE).take(n)
        .map(|t| [read_vertex(&t[12..24]), read_vertex(&t[24..36]), read_vertex(&t[36..48])])
        .collect())
}

fn read_vertex(buf: &[u8]) -> Vec3 {
    let f = |i: usize| f64::from(f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]));
    vec3(f(0), f(4), f(8))
}

fn parse_ascii(text: &str) -> IoResult<Vec<Triangle>> {
    let mut tris = Vec::new();
    let mut verts: Vec<Vec3> = Vec::with_capacity(3);

    for (lineno, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("vertex") => {
                let mut c = [0.0; 3];
                for x in c.iter_mut() {
                    let tok = parts.next().ok_or_else(|| {
                        IoError::invalid_content(format!("line {}: vertex needs three coordinates", lineno + 1))
                    })?;
                    *x = tok.parse()?;
                }
                verts.push(vec3(c[0], c[1], c[2]));
            }
            Some("endloop") => {
                if verts.len() != 3 {
                    return Err(IoError::invalid_content(format!(
                        "line {}: facet has {} vertices", lineno + 1, verts.len()
                    )));
                }
                tris.push([verts[0], verts[1], verts[2]]);
                verts.clear();
            }
            _ => {}
        }
    }
    if !verts.is_empty() {
        return Err(IoError::invalid_content("unterminated facet at end of file"));
    }
    Ok(tris)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ASCII: &str = "solid pile
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1000 0 0
      vertex 0 1000 0
    endloop
  endfacet
  facet normal 0 -1 0
    outer loop
      vertex 0 0 0
      vertex 0 0 500
      vertex 1000 0 0
    endloop
  endfacet
endsolid pile
";

    fn binary(tris: &[Triangle]) -> Vec<u8> {
        let mut b = vec![0u8; HEADER_SIZE];
        b[..5].copy_from_slice(b"solid");
        b.extend_from_slice(&(tris.len() as u32).to_le_bytes());
        for t in tris {
            b.extend_from_slice(&[0u8; 12]);
            for v in t {
                for c in [v.x, v.y, v.z] { b.extend_from_slice(&(c as f32).to_le_bytes()); }
            }
            b.extend_from_slice(&0u16.to_le_bytes());
        }
        b
    }

    #[test]
    fn ascii_and_binary_agree() {
        let a = parse_stl(ASCII.as_bytes()).unwrap();
        assert_eq!(a.len(), 2);
        let b = parse_stl(&binary(&a)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scale_and_shift() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pile.stl");
        fs::write(&path, ASCII).unwrap();
        let tris = load_stl(&path, 1.0 / 1000.0, vec3(0.02, 0.6, 0.02)).unwrap();
        assert_relative_eq!(tris[0][1].x, 1.02, epsilon = 1e-12);
        assert_relative_eq!(tris[0][2].y, 1.6, epsilon = 1e-12);
        assert_relative_eq!(tris[1][1].z, 0.52, epsilon = 1e-12);
    }

    #[test]
    fn truncated_inputs() {
        let mut b = binary(&[[Vec3::ZERO, Vec3::X, Vec3::Y]]);
        b[80] = 5;
        assert!(matches!(parse_stl(&b), Err(IoError::InvalidContent { .. })));
        let broken = "solid x\nfacet\nouter loop\nvertex 0 0 0\nvertex 1 0\nendloop\n";
        assert!(parse_stl(broken.as_bytes()).is_err());
        assert!(matches!(
            load_stl(Path::new("/nonexistent/pile.stl"), 1.0, Vec3::ZERO),
            Err(IoError::FileNotFound { .. })
        ));
    }
}
