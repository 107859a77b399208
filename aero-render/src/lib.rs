//! Rendering for the air-quality map and charts.
//!
//! Scenes are plain data: the web apps turn them into live SVG elements and
//! the CLI serializes them with `to_svg`.

pub mod chart;
pub mod map;
pub mod marker;
pub mod projection;
pub mod timelapse;
pub mod transition;

/// Minimal helpers for writing SVG text.
pub mod svg {
    pub use aero_utils::format::fmt_coord as num;

    /// Escape text and attribute values.
    pub fn escape(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                c => out.push(c),
            }
        }
        out
    }

    /// Opening `<svg>` tag with a viewBox matching `width` x `height`.
    pub fn open(width: f64, height: f64) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(width),
            h = num(height)
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_escape() {
            assert_eq!(escape(r#"Hà Nội <"A&B">"#), "Hà Nội &lt;&quot;A&amp;B&quot;&gt;");
            assert!(open(900.0, 600.0).contains(r#"viewBox="0 0 900 600""#));
        }
    }
}
