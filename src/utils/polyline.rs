// Encoded polyline decoder (Google format), used by ORS for route geometry.

/// ORS encodes 2D geometry with 5 decimal places.
pub const ORS_PRECISION: u32 = 5;

/// Decodes an encoded polyline into `[lat, lon]` pairs.
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<[f64; 2]>, String> {
    let factor = 10_f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(format!("Truncated polyline at byte {}", index));
        }
        lon += next_delta(bytes, &mut index)?;
        points.push([lat as f64 / factor, lon as f64 / factor]);
    }

    Ok(points)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, String> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| format!("Truncated polyline at byte {}", index))?;
        if !(63..=126).contains(&byte) {
            return Err(format!("Invalid polyline character {:?} at byte {}", byte as char, index));
        }
        *index += 1;

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
        if shift > 60 {
            return Err("Polyline value overflow".to_string());
        }
    }

    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_polyline() {
        // Reference example from the format documentation
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 5).unwrap();
        assert_eq!(points.len(), 3);
        let expected = [[38.5, -120.2], [40.7, -120.95], [43.252, -126.453]];
        for (p, e) in points.iter().zip(expected.iter()) {
            assert!((p[0] - e[0]).abs() < 1e-9);
            assert!((p[1] - e[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("", ORS_PRECISION).unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated() {
        assert!(decode("_p~iF", ORS_PRECISION).is_err());
        assert!(decode("_p~i", ORS_PRECISION).is_err());
    }

    #[test]
    fn test_decode_invalid_char() {
        assert!(decode("_p~iF ~ps|U", ORS_PRECISION).is_err());
    }
}
