//! Slide part serialization.

use std::fmt::{self, Write};

use deckhand_types::geometry::inches_to_emu;
use deckhand_types::{Alignment, Rect, Rgb, TableCell, TextStyle};

use super::model::{ChartPart, Chrome, ShapeBody, ShapePart, SlidePart, TablePart, TextBody};
use super::template::{DATE_RECT, FOOTER_RECT, LAYOUTS, SLIDE_NUMBER_RECT};
use super::xml::{
    NS_C, XML_DECL, esc, font_sz, open_root, write_group_props, write_line, write_run_props,
    write_runs, write_solid_fill, write_xfrm,
};

const URI_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const URI_TABLE: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

/// Field GUIDs; PowerPoint only needs them to be well formed.
const FLD_SLIDENUM: &str = "{6E4B2D7A-0C31-4B8E-9A55-3F1C2B7D8E01}";
const FLD_DATETIME: &str = "{6E4B2D7A-0C31-4B8E-9A55-3F1C2B7D8E02}";

/// Header text box geometry and style.
const HEADER_RECT: Rect = Rect {
    left: 0.5,
    top: 0.1,
    width: 9.0,
    height: 0.5,
};
const HEADER_COLOR: Rgb = Rgb::new(100, 100, 100);
const HEADER_SIZE: f64 = 10.0;

/// Bullet indent per level, EMU.
const BULLET_INDENT: i64 = 342_900;

/// Outbound relationship of a slide beyond its layout (always `rId1`).
#[derive(Debug)]
pub(crate) enum SlideRel<'a> {
    Image { rid: u32, media: usize },
    Chart { rid: u32, number: usize, chart: &'a ChartPart },
}

/// Serialized slide plus the relationships its XML refers to.
#[derive(Debug)]
pub(crate) struct SlideXml<'a> {
    pub xml: String,
    pub rels: Vec<SlideRel<'a>>,
}

/// Serialize one slide. `next_chart` numbers chart parts package-wide.
pub(crate) fn slide_xml<'a>(
    slide: &'a SlidePart,
    position: usize,
    next_chart: &mut usize,
) -> Result<SlideXml<'a>, fmt::Error> {
    let mut xml = String::with_capacity(4096);
    let mut rels = Vec::new();
    let mut next_rid = 2;

    xml.push_str(XML_DECL);
    open_root(&mut xml, "p:sld", "")?;
    xml.push_str("<p:cSld>");
    if let Some(bg) = slide.background {
        xml.push_str("<p:bg><p:bgPr>");
        write_solid_fill(&mut xml, bg)?;
        xml.push_str("<a:effectLst/></p:bgPr></p:bg>");
    }
    xml.push_str("<p:spTree>");
    write_group_props(&mut xml);

    if let Some(ph) = LAYOUTS.get(slide.layout).and_then(|l| l.title_ph) {
        write_title(&mut xml, ph, slide.title.as_deref())?;
    }

    for shape in &slide.shapes {
        match &shape.body {
            ShapeBody::Text(body) => write_text_shape(&mut xml, shape.id, &shape.rect, body)?,
            ShapeBody::Picture { media, descr } => {
                let rid = next_rid;
                next_rid += 1;
                write_picture(&mut xml, shape, rid, descr)?;
                rels.push(SlideRel::Image { rid, media: *media });
            }
            ShapeBody::Chart(chart) => {
                let rid = next_rid;
                next_rid += 1;
                *next_chart += 1;
                write_chart_frame(&mut xml, shape, rid)?;
                rels.push(SlideRel::Chart {
                    rid,
                    number: *next_chart,
                    chart,
                });
            }
            ShapeBody::Table(table) => write_table(&mut xml, shape, table)?,
            ShapeBody::Auto(spec) => write_auto_shape(&mut xml, shape.id, spec)?,
        }
    }

    if let Some(chrome) = &slide.chrome {
        write_chrome(&mut xml, slide.next_id(), chrome, position)?;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(SlideXml { xml, rels })
}

fn write_title(xml: &mut String, ph: &str, title: Option<&str>) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{ph}"/></p:nvPr></p:nvSpPr><p:spPr/>"#
    )?;
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/><a:p>");
    match title {
        Some(t) if !t.is_empty() => {
            write!(xml, r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#, esc(t))?;
        }
        _ => xml.push_str(r#"<a:endParaRPr lang="en-US"/>"#),
    }
    xml.push_str("</a:p></p:txBody></p:sp>");
    Ok(())
}

fn write_text_shape(xml: &mut String, id: u32, rect: &Rect, body: &TextBody) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#,
        id - 1
    )?;
    write_xfrm(xml, "a", rect)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
    if body.wrap {
        xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:noAutofit/></a:bodyPr><a:lstStyle/>"#);
    } else {
        xml.push_str(r#"<p:txBody><a:bodyPr wrap="none" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#);
    }
    for text in &body.paragraphs {
        xml.push_str("<a:p>");
        write_paragraph_props(xml, body)?;
        write_runs(xml, text, &body.style)?;
        write_run_props(xml, "endParaRPr", &body.style)?;
        xml.push_str("</a:p>");
    }
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_paragraph_props(xml: &mut String, body: &TextBody) -> fmt::Result {
    xml.push_str("<a:pPr");
    if let Some(b) = body.bullet {
        let lvl = i64::from(b.level);
        write!(
            xml,
            r#" marL="{}" lvl="{lvl}" indent="-{BULLET_INDENT}""#,
            (lvl + 1) * BULLET_INDENT
        )?;
    }
    if body.alignment != Alignment::Left {
        write!(xml, r#" algn="{}""#, body.alignment.ooxml())?;
    }
    xml.push('>');
    if let Some(spacing) = body.line_spacing {
        write!(
            xml,
            r#"<a:lnSpc><a:spcPct val="{}"/></a:lnSpc>"#,
            (spacing * 100_000.0).round() as i64
        )?;
    }
    if let Some(b) = body.bullet {
        let mut buf = [0u8; 4];
        write!(
            xml,
            r#"<a:buFont typeface="Arial"/><a:buChar char="{}"/>"#,
            esc(b.char.encode_utf8(&mut buf))
        )?;
    }
    xml.push_str("</a:pPr>");
    Ok(())
}

fn write_picture(xml: &mut String, shape: &ShapePart, rid: u32, descr: &str) -> fmt::Result {
    write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}" descr="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        shape.id,
        shape.id - 1,
        esc(descr)
    )?;
    write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="rId{rid}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#
    )?;
    write_xfrm(xml, "a", &shape.rect)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}

fn write_chart_frame(xml: &mut String, shape: &ShapePart, rid: u32) -> fmt::Result {
    write!(
        xml,
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Chart {}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>"#,
        shape.id,
        shape.id - 1
    )?;
    write_xfrm(xml, "p", &shape.rect)?;
    write!(
        xml,
        r#"<a:graphic><a:graphicData uri="{URI_CHART}"><c:chart xmlns:c="{NS_C}" r:id="rId{rid}"/></a:graphicData></a:graphic></p:graphicFrame>"#
    )
}

fn write_table(xml: &mut String, shape: &ShapePart, table: &TablePart) -> fmt::Result {
    write!(
        xml,
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Table {}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
        shape.id,
        shape.id - 1
    )?;
    write_xfrm(xml, "p", &shape.rect)?;
    write!(xml, r#"<a:graphic><a:graphicData uri="{URI_TABLE}"><a:tbl>"#)?;
    write!(
        xml,
        r#"<a:tblPr firstRow="{}" bandRow="1"/><a:tblGrid>"#,
        u8::from(table.header)
    )?;
    for w in &table.column_widths {
        write!(xml, r#"<a:gridCol w="{}"/>"#, inches_to_emu(*w))?;
    }
    xml.push_str("</a:tblGrid>");
    let row_h = inches_to_emu(table.row_height);
    for (r, row) in table.rows.iter().enumerate() {
        write!(xml, r#"<a:tr h="{row_h}">"#)?;
        for cell in row {
            xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p>");
            let bold = table.effective_bold(r, cell);
            if cell.text.is_empty() {
                write_cell_props(xml, "endParaRPr", cell, bold)?;
            } else {
                xml.push_str("<a:r>");
                write_cell_props(xml, "rPr", cell, bold)?;
                write!(xml, "<a:t>{}</a:t></a:r>", esc(&cell.text))?;
            }
            xml.push_str("</a:p></a:txBody><a:tcPr/></a:tc>");
        }
        xml.push_str("</a:tr>");
    }
    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    Ok(())
}

/// Cell run properties. Only attributes the caller set are written, so the
/// table style supplies the rest.
fn write_cell_props(xml: &mut String, tag: &str, cell: &TableCell, bold: bool) -> fmt::Result {
    write!(xml, r#"<a:{tag} lang="en-US""#)?;
    if let Some(size) = cell.options.font_size {
        write!(xml, r#" sz="{}""#, font_sz(size))?;
    }
    if bold {
        xml.push_str(r#" b="1""#);
    }
    if cell.options.italic == Some(true) {
        xml.push_str(r#" i="1""#);
    }
    xml.push_str(r#" dirty="0""#);
    match cell.options.color {
        Some(color) => {
            xml.push('>');
            write_solid_fill(xml, color)?;
            write!(xml, "</a:{tag}>")
        }
        None => {
            xml.push_str("/>");
            Ok(())
        }
    }
}

fn write_auto_shape(
    xml: &mut String,
    id: u32,
    spec: &crate::backend::AutoShapeSpec,
) -> fmt::Result {
    let preset = spec.shape_type.preset();
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{preset} {}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>"#,
        id - 1
    )?;
    write_xfrm(xml, "a", &spec.rect)?;
    write!(xml, r#"<a:prstGeom prst="{preset}"><a:avLst/></a:prstGeom>"#)?;
    if let Some(fill) = spec.fill {
        write_solid_fill(xml, fill)?;
    }
    if let Some(line) = spec.line {
        write_line(xml, line, spec.line_width)?;
    }
    xml.push_str("</p:spPr>");
    xml.push_str(concat!(
        r#"<p:style><a:lnRef idx="1"><a:schemeClr val="accent1"/></a:lnRef>"#,
        r#"<a:fillRef idx="3"><a:schemeClr val="accent1"/></a:fillRef>"#,
        r#"<a:effectRef idx="2"><a:schemeClr val="accent1"/></a:effectRef>"#,
        r#"<a:fontRef idx="minor"><a:schemeClr val="lt1"/></a:fontRef></p:style>"#,
    ));
    xml.push_str(r#"<p:txBody><a:bodyPr rtlCol="0" anchor="ctr"/><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#);
    Ok(())
}

fn write_chrome(xml: &mut String, mut id: u32, chrome: &Chrome, position: usize) -> fmt::Result {
    if chrome.date {
        write_footer_placeholder(xml, id, "Date Placeholder", "dt", 2, &DATE_RECT, |xml| {
            write!(
                xml,
                r#"<a:fld id="{FLD_DATETIME}" type="datetime1"><a:rPr lang="en-US"/><a:t></a:t></a:fld>"#
            )
        })?;
        id += 1;
    }
    if let Some(footer) = &chrome.footer {
        write_footer_placeholder(xml, id, "Footer Placeholder", "ftr", 3, &FOOTER_RECT, |xml| {
            write!(xml, r#"<a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r>"#, esc(footer))
        })?;
        id += 1;
    }
    if chrome.slide_number {
        write_footer_placeholder(
            xml,
            id,
            "Slide Number Placeholder",
            "sldNum",
            4,
            &SLIDE_NUMBER_RECT,
            |xml| {
                write!(
                    xml,
                    r#"<a:fld id="{FLD_SLIDENUM}" type="slidenum"><a:rPr lang="en-US"/><a:t>{}</a:t></a:fld>"#,
                    position + 1
                )
            },
        )?;
        id += 1;
    }
    if let Some(header) = &chrome.header {
        let body = TextBody {
            kind: crate::backend::ShapeKind::TextBox,
            paragraphs: vec![header.clone()],
            style: TextStyle::default()
                .with_size(HEADER_SIZE)
                .with_color(HEADER_COLOR),
            alignment: Alignment::Right,
            line_spacing: None,
            bullet: None,
            wrap: true,
        };
        write_text_shape(xml, id, &HEADER_RECT, &body)?;
    }
    Ok(())
}

fn write_footer_placeholder(
    xml: &mut String,
    id: u32,
    name: &str,
    ph: &str,
    idx: u32,
    rect: &Rect,
    content: impl FnOnce(&mut String) -> fmt::Result,
) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name} {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{ph}" sz="quarter" idx="{idx}"/></p:nvPr></p:nvSpPr><p:spPr>"#,
        id - 1
    )?;
    write_xfrm(xml, "a", rect)?;
    xml.push_str("</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p>");
    content(xml)?;
    xml.push_str("</a:p></p:txBody></p:sp>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use deckhand_types::{CellOptions, ChartType, Series, ShapeType};

    use super::*;
    use crate::backend::{AutoShapeSpec, HeaderFooterSpec, ShapeKind};
    use crate::pptx::model::{Bullet, PptxPresentation};

    fn text_body(kind: ShapeKind, paragraphs: &[&str]) -> TextBody {
        TextBody {
            kind,
            paragraphs: paragraphs.iter().map(|s| s.to_string()).collect(),
            style: TextStyle::default(),
            alignment: Alignment::Left,
            line_spacing: None,
            bullet: None,
            wrap: false,
        }
    }

    #[test]
    fn title_placeholder_and_background() {
        let mut pres = PptxPresentation::new();
        let key = pres.push_slide(0, Some("Hello & Co".into()), Some(Rgb::new(0, 0, 255)));
        let slide = pres.slide(key).unwrap();
        let out = slide_xml(slide, 0, &mut 0).unwrap();
        assert!(out.xml.contains(r#"<p:ph type="ctrTitle"/>"#));
        assert!(out.xml.contains("Hello &amp; Co"));
        assert!(out.xml.contains(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="0000FF"/>"#));
        assert!(out.rels.is_empty());
    }

    #[test]
    fn blank_layout_has_no_title() {
        let mut pres = PptxPresentation::new();
        let key = pres.push_slide(6, Some("ignored".into()), None);
        let out = slide_xml(pres.slide(key).unwrap(), 0, &mut 0).unwrap();
        assert!(!out.xml.contains("<p:ph"));
        assert!(!out.xml.contains("ignored"));
    }

    #[test]
    fn bullets_and_spacing() {
        let mut pres = PptxPresentation::new();
        let key = pres.push_slide(6, None, None);
        let slide = pres.slide_mut(key).unwrap();
        let mut bullets = text_body(ShapeKind::BulletList, &["a", "b"]);
        bullets.bullet = Some(Bullet { level: 1, char: '-' });
        bullets.wrap = true;
        slide.push_shape(Rect::new(1.0, 1.0, 8.0, 1.0), ShapeBody::Text(bullets));
        let mut para = text_body(ShapeKind::Paragraph, &["body"]);
        para.line_spacing = Some(1.5);
        para.alignment = Alignment::Justify;
        slide.push_shape(Rect::new(1.0, 3.0, 8.0, 1.0), ShapeBody::Text(para));

        let out = slide_xml(pres.slide(key).unwrap(), 0, &mut 0).unwrap();
        assert_eq!(out.xml.matches(r#"<a:buChar char="-"/>"#).count(), 2);
        assert!(out.xml.contains(r#"lvl="1""#));
        assert!(out.xml.contains(r#"<a:spcPct val="150000"/>"#));
        assert!(out.xml.contains(r#"algn="just""#));
    }

    #[test]
    fn charts_and_pictures_get_relationships() {
        let mut pres = PptxPresentation::new();
        let key = pres.push_slide(6, None, None);
        let slide = pres.slide_mut(key).unwrap();
        slide.push_shape(
            Rect::new(0.0, 0.0, 4.0, 3.0),
            ShapeBody::Picture {
                media: 0,
                descr: "logo.png".into(),
            },
        );
        slide.push_shape(
            Rect::new(1.0, 1.0, 6.0, 4.0),
            ShapeBody::Chart(ChartPart {
                chart_type: ChartType::Pie,
                categories: vec!["a".into()],
                series: vec![Series {
                    name: "s".into(),
                    values: vec![1.0],
                }],
                title: None,
            }),
        );
        let mut charts = 4;
        let out = slide_xml(pres.slide(key).unwrap(), 0, &mut charts).unwrap();
        assert_eq!(charts, 5);
        assert!(out.xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(out.xml.contains(r#"r:id="rId3""#));
        assert!(matches!(out.rels[0], SlideRel::Image { rid: 2, media: 0 }));
        assert!(matches!(out.rels[1], SlideRel::Chart { rid: 3, number: 5, .. }));
    }

    #[test]
    fn table_header_and_cell_styles() {
        let mut pres = PptxPresentation::new();
        let key = pres.push_slide(6, None, None);
        let mut styled = TableCell::plain("red");
        styled.options = CellOptions {
            italic: Some(true),
            color: Some(Rgb::new(255, 0, 0)),
            ..CellOptions::default()
        };
        let table = TablePart {
            rows: vec![
                vec![TableCell::plain("H1"), TableCell::plain("H2")],
                vec![styled, TableCell::plain("")],
            ],
            column_widths: vec![2.0, 3.0],
            row_height: 0.5,
            header: true,
        };
        pres.slide_mut(key)
            .unwrap()
            .push_shape(Rect::new(1.0, 1.0, 5.0, 1.0), ShapeBody::Table(table));
        let out = slide_xml(pres.slide(key).unwrap(), 0, &mut 0).unwrap();
        assert!(out.xml.contains(r#"<a:gridCol w="1828800"/><a:gridCol w="2743200"/>"#));
        assert_eq!(out.xml.matches("<a:tr ").count(), 2);
        assert_eq!(out.xml.matches(r#" b="1""#).count(), 2);
        assert!(out.xml.contains(r#"i="1""#));
        assert!(out.xml.contains(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#));
    }

    #[test]
    fn auto_shape_line_only_with_color() {
        let mut pres = PptxPresentation::new();
        let key = pres.push_slide(6, None, None);
        let slide = pres.slide_mut(key).unwrap();
        slide.push_shape(
            Rect::new(1.0, 1.0, 2.0, 2.0),
            ShapeBody::Auto(AutoShapeSpec {
                shape_type: ShapeType::Oval,
                rect: Rect::new(1.0, 1.0, 2.0, 2.0),
                fill: Some(Rgb::new(0, 128, 0)),
                line: None,
                line_width: 3.0,
            }),
        );
        let out = slide_xml(pres.slide(key).unwrap(), 0, &mut 0).unwrap();
        assert!(out.xml.contains(r#"<a:prstGeom prst="ellipse">"#));
        assert!(out.xml.contains(r#"val="008000""#));
        assert!(!out.xml.contains("<a:ln "));
    }

    #[test]
    fn chrome_header_skipped_on_first_slide() {
        let spec = HeaderFooterSpec {
            header: Some("Quarterly".into()),
            footer: Some("ACME".into()),
            slide_number: true,
            date: true,
        };
        let mut pres = PptxPresentation::new();
        let first = pres.push_slide(1, None, None);
        let second = pres.push_slide(1, None, None);
        pres.slide_mut(first).unwrap().chrome = Some(Chrome::for_position(&spec, 0));
        pres.slide_mut(second).unwrap().chrome = Some(Chrome::for_position(&spec, 1));

        let one = slide_xml(pres.slide(first).unwrap(), 0, &mut 0).unwrap();
        assert!(one.xml.contains(r#"type="ftr""#));
        assert!(one.xml.contains(r#"type="slidenum""#));
        assert!(one.xml.contains(r#"type="datetime1""#));
        assert!(!one.xml.contains("Quarterly"));

        let two = slide_xml(pres.slide(second).unwrap(), 1, &mut 0).unwrap();
        assert!(two.xml.contains("Quarterly"));
        assert!(two.xml.contains(r#"sz="1000""#));
        assert!(two.xml.contains(r#"val="646464""#));
        assert!(two.xml.contains(r#"algn="r""#));
    }
}
