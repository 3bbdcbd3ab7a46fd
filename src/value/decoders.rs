//! Primitive decoders for attribute values and text content.

use glam::{Mat4, Vec3, Vec4};

use super::ValueTransform;

// ============================================================================
// Scalars
// ============================================================================

/// Trimmed text, kept as an owned string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl ValueTransform<str, String> for TextDecoder {
    fn transform(&self, input: &str) -> Option<String> {
        Some(input.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntDecoder;

impl ValueTransform<str, i32> for IntDecoder {
    fn transform(&self, input: &str) -> Option<i32> {
        input.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatDecoder;

impl ValueTransform<str, f32> for FloatDecoder {
    fn transform(&self, input: &str) -> Option<f32> {
        input.trim().parse().ok()
    }
}

/// `true`/`false` in any case, or `1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolDecoder;

impl ValueTransform<str, bool> for BoolDecoder {
    fn transform(&self, input: &str) -> Option<bool> {
        parse_bool(input.trim())
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") || token == "1" {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") || token == "0" {
        Some(false)
    } else {
        None
    }
}

// ============================================================================
// Lists
// ============================================================================

fn parse_list<T: std::str::FromStr>(input: &str) -> Option<Vec<T>> {
    input
        .split_whitespace()
        .map(|token| token.parse().ok())
        .collect()
}

/// Whitespace separated floats; a single bad token makes the list undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatListDecoder;

impl ValueTransform<str, Vec<f32>> for FloatListDecoder {
    fn transform(&self, input: &str) -> Option<Vec<f32>> {
        parse_list(input)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntListDecoder;

impl ValueTransform<str, Vec<i32>> for IntListDecoder {
    fn transform(&self, input: &str) -> Option<Vec<i32>> {
        parse_list(input)
    }
}

/// Non-negative index streams (`p`, `vcount`, `v`).
#[derive(Debug, Clone, Copy, Default)]
pub struct UintListDecoder;

impl ValueTransform<str, Vec<u32>> for UintListDecoder {
    fn transform(&self, input: &str) -> Option<Vec<u32>> {
        parse_list(input)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolListDecoder;

impl ValueTransform<str, Vec<bool>> for BoolListDecoder {
    fn transform(&self, input: &str) -> Option<Vec<bool>> {
        input.split_whitespace().map(parse_bool).collect()
    }
}

/// Whitespace separated names; an empty list is undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameListDecoder;

impl ValueTransform<str, Vec<String>> for NameListDecoder {
    fn transform(&self, input: &str) -> Option<Vec<String>> {
        let names: Vec<String> = input.split_whitespace().map(str::to_string).collect();
        (!names.is_empty()).then_some(names)
    }
}

// ============================================================================
// Composite values
// ============================================================================

/// RGB or RGBA floats; alpha defaults to 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorDecoder;

impl ValueTransform<str, Vec4> for ColorDecoder {
    fn transform(&self, input: &str) -> Option<Vec4> {
        match parse_list::<f32>(input)?.as_slice() {
            &[r, g, b] => Some(Vec4::new(r, g, b, 1.0)),
            &[r, g, b, a] => Some(Vec4::new(r, g, b, a)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Vec3Decoder;

impl ValueTransform<str, Vec3> for Vec3Decoder {
    fn transform(&self, input: &str) -> Option<Vec3> {
        match parse_list::<f32>(input)?.as_slice() {
            &[x, y, z] => Some(Vec3::new(x, y, z)),
            _ => None,
        }
    }
}

/// 16 floats in row-major order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixDecoder;

impl ValueTransform<str, Mat4> for MatrixDecoder {
    fn transform(&self, input: &str) -> Option<Mat4> {
        let values: Vec<f32> = parse_list(input)?;
        let array: [f32; 16] = values.try_into().ok()?;
        Some(row_major(&array))
    }
}

/// A packed run of row-major 4x4 matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixListDecoder;

impl ValueTransform<str, Vec<Mat4>> for MatrixListDecoder {
    fn transform(&self, input: &str) -> Option<Vec<Mat4>> {
        let values: Vec<f32> = parse_list(input)?;
        if values.len() % 16 != 0 {
            return None;
        }
        values
            .chunks_exact(16)
            .map(|chunk| <&[f32; 16]>::try_from(chunk).ok().map(row_major))
            .collect()
    }
}

/// Builds a matrix from 16 floats written row by row.
#[must_use]
pub fn row_major(values: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(values).transpose()
}

/// Pairs of hex digits, whitespace ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexBytesDecoder;

impl ValueTransform<str, Vec<u8>> for HexBytesDecoder {
    fn transform(&self, input: &str) -> Option<Vec<u8>> {
        let digits: Vec<u8> = input
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| (b as char).to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        if digits.is_empty() || digits.len() % 2 != 0 {
            return None;
        }
        Some(digits.chunks_exact(2).map(|p| (p[0] << 4) | p[1]).collect())
    }
}

pub const TEXT: TextDecoder = TextDecoder;
pub const INT: IntDecoder = IntDecoder;
pub const FLOAT: FloatDecoder = FloatDecoder;
pub const BOOL: BoolDecoder = BoolDecoder;
pub const FLOAT_LIST: FloatListDecoder = FloatListDecoder;
pub const INT_LIST: IntListDecoder = IntListDecoder;
pub const UINT_LIST: UintListDecoder = UintListDecoder;
pub const BOOL_LIST: BoolListDecoder = BoolListDecoder;
pub const NAME_LIST: NameListDecoder = NameListDecoder;
pub const COLOR: ColorDecoder = ColorDecoder;
pub const VEC3: Vec3Decoder = Vec3Decoder;
pub const MATRIX: MatrixDecoder = MatrixDecoder;
pub const MATRIX_LIST: MatrixListDecoder = MatrixListDecoder;
pub const HEX_BYTES: HexBytesDecoder = HexBytesDecoder;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_list_rejects_bad_token() {
        assert_eq!(FLOAT_LIST.transform("1 2.5 -3"), Some(vec![1.0, 2.5, -3.0]));
        assert_eq!(FLOAT_LIST.transform("1 x 3"), None);
        assert_eq!(FLOAT_LIST.transform("  "), Some(vec![]));
    }

    #[test]
    fn name_list_empty_is_undefined() {
        assert_eq!(NAME_LIST.transform(" \n "), None);
        assert_eq!(
            NAME_LIST.transform("hip  knee\nfoot"),
            Some(vec!["hip".to_string(), "knee".to_string(), "foot".to_string()])
        );
    }

    #[test]
    fn color_defaults_alpha() {
        assert_eq!(COLOR.transform("0.1 0.2 0.3"), Some(Vec4::new(0.1, 0.2, 0.3, 1.0)));
        assert_eq!(COLOR.transform("1 1"), None);
    }

    #[test]
    fn matrix_is_row_major() {
        let m = MATRIX
            .transform("1 0 0 5  0 1 0 6  0 0 1 7  0 0 0 1")
            .unwrap();
        assert_eq!(m.w_axis, Vec4::new(5.0, 6.0, 7.0, 1.0));
    }

    #[test]
    fn hex_pairs() {
        assert_eq!(HEX_BYTES.transform("89 50 4e47"), Some(vec![0x89, 0x50, 0x4e, 0x47]));
        assert_eq!(HEX_BYTES.transform("abc"), None);
        assert_eq!(HEX_BYTES.transform("zz"), None);
    }

    #[test]
    fn bools() {
        assert_eq!(BOOL.transform("TRUE"), Some(true));
        assert_eq!(BOOL_LIST.transform("true 0 False"), Some(vec![true, false, false]));
        assert_eq!(BOOL.transform("yes"), None);
    }
}
