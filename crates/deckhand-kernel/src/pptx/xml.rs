//! Shared DrawingML fragments.
//!
//! Writers append to a `String` through `std::fmt::Write`; the only error
//! they can raise is `fmt::Error`, which the package writer maps to a backend
//! failure.

use std::borrow::Cow;
use std::fmt::{self, Write};

use deckhand_types::geometry::points_to_emu;
use deckhand_types::{Rect, Rgb, TextStyle};

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

/// Escape text for element content or attribute values.
///
/// Control characters XML 1.0 cannot carry are dropped first.
pub(crate) fn esc(s: &str) -> Cow<'_, str> {
    let illegal = |c: char| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r');
    if s.chars().any(illegal) {
        let cleaned: String = s.chars().filter(|&c| !illegal(c)).collect();
        Cow::Owned(quick_xml::escape::escape(cleaned.as_str()).into_owned())
    } else {
        quick_xml::escape::escape(s)
    }
}

/// Root opening tag with the p/a/r namespaces.
pub(crate) fn open_root(xml: &mut String, tag: &str, extra_attrs: &str) -> fmt::Result {
    write!(
        xml,
        r#"<{tag} xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"{extra_attrs}>"#
    )
}

/// `<p:nvGrpSpPr>` and `<p:grpSpPr>` for the root shape tree.
pub(crate) fn write_group_props(xml: &mut String) {
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    );
}

/// `<a:xfrm>` (or `<p:xfrm>` for graphic frames) from a rect in inches.
pub(crate) fn write_xfrm(xml: &mut String, prefix: &str, rect: &Rect) -> fmt::Result {
    let (x, y, cx, cy) = rect.to_emu();
    write!(
        xml,
        r#"<{prefix}:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></{prefix}:xfrm>"#
    )
}

pub(crate) fn write_solid_fill(xml: &mut String, color: Rgb) -> fmt::Result {
    write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        color.to_hex()
    )
}

/// Font size in hundredths of a point, as `sz` wants it.
pub(crate) fn font_sz(points: f64) -> i64 {
    (points * 100.0).round() as i64
}

/// `<a:rPr>` for a fully specified style.
pub(crate) fn write_run_props(xml: &mut String, tag: &str, style: &TextStyle) -> fmt::Result {
    write!(xml, r#"<a:{tag} lang="en-US" sz="{}""#, font_sz(style.font_size))?;
    if style.bold {
        xml.push_str(r#" b="1""#);
    }
    if style.italic {
        xml.push_str(r#" i="1""#);
    }
    if style.underline {
        xml.push_str(r#" u="sng""#);
    }
    xml.push_str(r#" dirty="0">"#);
    write_solid_fill(xml, style.color)?;
    write!(
        xml,
        r#"<a:latin typeface="{0}"/><a:cs typeface="{0}"/>"#,
        esc(&style.font_name)
    )?;
    write!(xml, "</a:{tag}>")
}

/// One run carrying `text`, with `\n` turned into `<a:br/>`.
pub(crate) fn write_runs(xml: &mut String, text: &str, style: &TextStyle) -> fmt::Result {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<a:br>");
            write_run_props(xml, "rPr", style)?;
            xml.push_str("</a:br>");
        }
        if line.is_empty() {
            continue;
        }
        xml.push_str("<a:r>");
        write_run_props(xml, "rPr", style)?;
        write!(xml, "<a:t>{}</a:t>", esc(line))?;
        xml.push_str("</a:r>");
    }
    Ok(())
}

/// `<a:ln>` with a solid color.
pub(crate) fn write_line(xml: &mut String, color: Rgb, width_pt: f64) -> fmt::Result {
    write!(xml, r#"<a:ln w="{}">"#, points_to_emu(width_pt))?;
    write_solid_fill(xml, color)?;
    xml.push_str("</a:ln>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_drops_controls() {
        assert_eq!(esc("a & b < c"), "a &amp; b &lt; c");
        assert_eq!(esc("bell\u{7}"), "bell");
        assert_eq!(esc("tab\tok"), "tab\tok");
    }

    #[test]
    fn run_props_order() {
        let mut xml = String::new();
        let style = TextStyle::default().with_bold(true);
        write_run_props(&mut xml, "rPr", &style).unwrap();
        assert!(xml.starts_with(r#"<a:rPr lang="en-US" sz="1800" b="1" dirty="0">"#));
        // solidFill precedes latin in CT_TextCharacterProperties
        let fill = xml.find("<a:solidFill>").unwrap();
        let latin = xml.find("<a:latin").unwrap();
        assert!(fill < latin);
        assert!(xml.contains(r#"typeface="Calibri""#));
    }

    #[test]
    fn runs_split_on_newline() {
        let mut xml = String::new();
        write_runs(&mut xml, "one\ntwo", &TextStyle::default()).unwrap();
        assert_eq!(xml.matches("<a:r>").count(), 2);
        assert_eq!(xml.matches("<a:br>").count(), 1);
    }

    #[test]
    fn xfrm_in_emu() {
        let mut xml = String::new();
        write_xfrm(&mut xml, "a", &Rect::new(1.0, 2.0, 8.0, 1.0)).unwrap();
        assert!(xml.contains(r#"<a:off x="914400" y="1828800"/>"#));
        assert!(xml.contains(r#"<a:ext cx="7315200" cy="914400"/>"#));
    }
}
