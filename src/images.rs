//! Image URL resolution for car pictures and profile photos.
//!
//! The backend stores uploads as paths relative to its own origin
//! (`uploads/abc.jpg`, `/uploads/abc.jpg`) but may also hand back absolute
//! URLs from a CDN. Both are turned into something a browser can open.

pub const PLACEHOLDER_CAR: &str = "https://placehold.co/400x250?text=No+Image";
pub const PLACEHOLDER_CAR_SMALL: &str = "https://placehold.co/150x100?text=Car";
pub const PLACEHOLDER_CAR_TINY: &str = "https://placehold.co/80x50?text=Car";
pub const PLACEHOLDER_CAR_LARGE: &str = "https://placehold.co/600x400?text=No+Image";
pub const PLACEHOLDER_AVATAR: &str = "https://placehold.co/120x120?text=User";

/// Resolve a raw image path against `base_url`.
///
/// Returns `None` for an absent or empty path, the input unchanged when it
/// already carries an `http`/`https` scheme, and otherwise the base joined to
/// the path with exactly one slash between them.
pub fn resolve_image_url(base_url: &str, raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }

    let base = base_url.trim_end_matches('/');
    let path = raw.trim_start_matches('/');

    Some(format!("{}/{}", base, path))
}

/// Resolve a raw image path, falling back to `placeholder`
pub fn image_or_placeholder(base_url: &str, raw: Option<&str>, placeholder: &str) -> String {
    resolve_image_url(base_url, raw).unwrap_or_else(|| placeholder.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://autorentx.onrender.com";

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(resolve_image_url(BASE, None), None);
        assert_eq!(resolve_image_url(BASE, Some("")), None);
    }

    #[test]
    fn test_absolute_urls_unchanged() {
        let cdn = "https://cdn.example.com/cars/1.png";
        assert_eq!(resolve_image_url(BASE, Some(cdn)).as_deref(), Some(cdn));

        let plain = "http://10.0.0.2:9000//weird//path.jpg";
        assert_eq!(resolve_image_url(BASE, Some(plain)).as_deref(), Some(plain));
    }

    #[test]
    fn test_relative_paths_get_one_slash() {
        for raw in ["uploads/car.jpg", "/uploads/car.jpg", "///uploads/car.jpg"] {
            let url = resolve_image_url(BASE, Some(raw)).unwrap();
            assert_eq!(url, "https://autorentx.onrender.com/uploads/car.jpg");
            assert!(!url["https://".len()..].contains("//"));
        }
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let url = resolve_image_url("http://localhost:5000/", Some("/uploads/a.png")).unwrap();
        assert_eq!(url, "http://localhost:5000/uploads/a.png");
    }

    #[test]
    fn test_scheme_match_is_prefix_only() {
        // "httpdocs/" is a relative directory, not a scheme
        let url = resolve_image_url(BASE, Some("httpdocs/a.png")).unwrap();
        assert_eq!(url, "https://autorentx.onrender.com/httpdocs/a.png");
    }

    #[test]
    fn test_placeholder_fallback() {
        assert_eq!(
            image_or_placeholder(BASE, None, PLACEHOLDER_AVATAR),
            PLACEHOLDER_AVATAR
        );
        assert_eq!(
            image_or_placeholder(BASE, Some("me.png"), PLACEHOLDER_AVATAR),
            "https://autorentx.onrender.com/me.png"
        );
    }
}
