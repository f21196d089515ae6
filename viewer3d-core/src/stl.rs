/// STL reader for binary and ASCII files, producing triangle lists for `Scene::add_mesh`
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::Triangle;

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Vec<Triangle>, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall { len: data.len() });
    }

    let mut declared = [0u8; 4];
    declared.copy_from_slice(&data[HEADER_LEN..HEADER_LEN + 4]);
    let declared = u32::from_le_bytes(declared) as usize;

    let body = &data[HEADER_LEN + 4..];
    let available = body.len() / RECORD_LEN;
    if available < declared {
        return Err(StlError::Truncated {
            declared,
            available,
        });
    }

    count(binary_facet, declared)(body)
        .map(|(_, triangles)| triangles)
        .map_err(|_| StlError::Truncated {
            declared,
            available,
        })
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, normal) = binary_vector3(input)?;
    let (input, v0) = binary_vector3(input)?;
    let (input, v1) = binary_vector3(input)?;
    let (input, v2) = binary_vector3(input)?;
    // Attribute byte count, unused.
    let (input, _) = le_u16(input)?;
    Ok((input, Triangle::new(normal, v0, v1, v2)))
}

fn binary_vector3(input: &[u8]) -> IResult<&[u8], [f32; 3]> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, [x, y, z]))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Vec<Triangle>, StlError> {
    match ascii_solid(input) {
        Ok((_, triangles)) => Ok(triangles),
        Err(e) => Err(StlError::Ascii {
            reason: e.to_string(),
        }),
    }
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = ascii_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v0) = ascii_vertex(input)?;
    let (input, v1) = ascii_vertex(input)?;
    let (input, v2) = ascii_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(normal, v0, v1, v2)))
}

fn ascii_vertex(input: &str) -> IResult<&str, [f32; 3]> {
    preceded(preceded(multispace0, tag("vertex")), ascii_vector3)(input)
}

fn ascii_vector3(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, [x, y, z]))
}

/// Detect and parse STL file (binary or ASCII)
///
/// Binary files may also start with `solid`, so a failed ASCII parse falls
/// back to the binary reader.
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle>, StlError> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(triangles) = parse_ascii_stl(text) {
                return Ok(triangles);
            }
        }
    }

    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(triangles: &[Triangle]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend((triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            for value in triangle.normals.iter().chain(triangle.vertices.iter().flatten()) {
                data.extend(value.to_le_bytes());
            }
            data.extend(0u16.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let data = binary(&[]);
        assert_eq!(parse_binary_stl(&data).unwrap().len(), 0);
    }

    #[test]
    fn test_parse_binary_triangle() {
        let triangle = Triangle::new(
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        );
        let parsed = parse_stl(&binary(&[triangle, triangle])).unwrap();
        assert_eq!(parsed, vec![triangle, triangle]);
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = binary(&[]);
        data[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&3u32.to_le_bytes());
        data.extend([0u8; RECORD_LEN]);
        assert_eq!(
            parse_binary_stl(&data),
            Err(StlError::Truncated {
                declared: 3,
                available: 1
            })
        );
    }

    #[test]
    fn test_too_small() {
        assert_eq!(
            parse_stl(b"solid"),
            Err(StlError::TooSmall { len: 5 })
        );
    }

    #[test]
    fn test_parse_named_ascii() {
        let text = "solid part
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1.5 0
    endloop
  endfacet
endsolid part
";
        let triangles = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0].normals, [0.0, 0.0, 1.0]);
        assert_eq!(triangles[0].vertices[2], [0.0, 1.5, 0.0]);
    }
}
