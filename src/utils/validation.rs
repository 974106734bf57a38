/// Lightweight e-mail check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(l), Some(d), None) => (l, d),
        _ => return false,
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn is_valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emails() {
        assert!(is_valid_email("ana@triap.com.br"));
        assert!(is_valid_email(" joao.silva@gmail.com "));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("@triap.com"));
        assert!(!is_valid_email("ana@triap"));
        assert!(!is_valid_email("ana@@triap.com"));
        assert!(!is_valid_email("ana silva@triap.com"));
        assert!(!is_valid_email("ana@triap..com"));
    }

    #[test]
    fn test_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some("x")));
    }

    #[test]
    fn test_coordinates() {
        assert!(is_valid_latitude(-23.55));
        assert!(!is_valid_latitude(91.0));
        assert!(!is_valid_longitude(f64::NAN));
        assert!(is_valid_longitude(-46.63));
    }
}
