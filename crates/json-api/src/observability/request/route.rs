//! Low-cardinality route labels for spans and metrics.

use uuid::Uuid;

/// Replace identifier path segments so every cart line shares one label.
pub(super) fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_segments_are_templated() {
        assert_eq!(
            route_template("/cart/update/0190d1b4-5a6e-7c3d-8f2a-1b2c3d4e5f60"),
            "/cart/update/{id}"
        );
        assert_eq!(
            route_template("/cart/remove/0190D1B4-5A6E-7C3D-8F2A-1B2C3D4E5F60"),
            "/cart/remove/{id}"
        );
    }

    #[test]
    fn static_paths_are_unchanged() {
        assert_eq!(route_template("/"), "/");
        assert_eq!(route_template("/cart"), "/cart");
        assert_eq!(route_template("/cart/clear"), "/cart/clear");
        assert_eq!(route_template("/cart/update/not-an-id"), "/cart/update/not-an-id");
    }
}
