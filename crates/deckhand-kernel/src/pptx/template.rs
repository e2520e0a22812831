//! Minimal slide master, layouts, theme, and document properties.
//!
//! Just enough structure for a valid package: one master, the nine standard
//! layouts addressed by index, and a theme whose format scheme backs the
//! `p:style` references auto shapes use.

use std::fmt::{self, Write};

use deckhand_types::Rect;

use super::xml::{XML_DECL, esc, open_root, write_group_props, write_xfrm};

/// Title placeholder geometry shared by content layouts.
const TITLE_RECT: Rect = Rect {
    left: 0.5,
    top: 0.3,
    width: 9.0,
    height: 1.25,
};

/// Body placeholder geometry shared by content layouts.
const BODY_RECT: Rect = Rect {
    left: 0.5,
    top: 1.75,
    width: 9.0,
    height: 4.95,
};

/// One slide layout.
#[derive(Debug)]
pub(crate) struct Layout {
    pub name: &'static str,
    /// `p:sldLayout/@type`.
    pub kind: &'static str,
    /// Placeholder type of the title, if the layout has one.
    pub title_ph: Option<&'static str>,
    pub title_rect: Rect,
    pub has_body: bool,
}

pub(crate) const LAYOUTS: [Layout; 9] = [
    Layout {
        name: "Title Slide",
        kind: "title",
        title_ph: Some("ctrTitle"),
        title_rect: Rect {
            left: 0.75,
            top: 2.33,
            width: 8.5,
            height: 1.61,
        },
        has_body: false,
    },
    Layout {
        name: "Title and Content",
        kind: "obj",
        title_ph: Some("title"),
        title_rect: TITLE_RECT,
        has_body: true,
    },
    Layout {
        name: "Section Header",
        kind: "secHead",
        title_ph: Some("title"),
        title_rect: Rect {
            left: 0.79,
            top: 4.82,
            width: 8.5,
            height: 1.49,
        },
        has_body: false,
    },
    Layout {
        name: "Two Content",
        kind: "twoObj",
        title_ph: Some("title"),
        title_rect: TITLE_RECT,
        has_body: true,
    },
    Layout {
        name: "Comparison",
        kind: "twoTxTwoObj",
        title_ph: Some("title"),
        title_rect: TITLE_RECT,
        has_body: true,
    },
    Layout {
        name: "Title Only",
        kind: "titleOnly",
        title_ph: Some("title"),
        title_rect: TITLE_RECT,
        has_body: false,
    },
    Layout {
        name: "Blank",
        kind: "blank",
        title_ph: None,
        title_rect: TITLE_RECT,
        has_body: false,
    },
    Layout {
        name: "Content with Caption",
        kind: "objTx",
        title_ph: Some("title"),
        title_rect: Rect {
            left: 0.5,
            top: 0.3,
            width: 3.29,
            height: 1.27,
        },
        has_body: true,
    },
    Layout {
        name: "Picture with Caption",
        kind: "picTx",
        title_ph: Some("title"),
        title_rect: Rect {
            left: 1.96,
            top: 5.25,
            width: 6.0,
            height: 0.62,
        },
        has_body: false,
    },
];

/// Placeholder `<p:sp>` with explicit geometry.
fn write_placeholder(
    xml: &mut String,
    id: u32,
    name: &str,
    ph: &str,
    idx: Option<u32>,
    rect: &Rect,
) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>"#,
        esc(name)
    )?;
    match idx {
        Some(i) => write!(xml, r#"<p:ph type="{ph}" idx="{i}"/>"#)?,
        None => write!(xml, r#"<p:ph type="{ph}"/>"#)?,
    }
    xml.push_str("</p:nvPr></p:nvSpPr><p:spPr>");
    write_xfrm(xml, "a", rect)?;
    xml.push_str(r#"</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#);
    Ok(())
}

pub(crate) fn slide_layout_xml(layout: &Layout) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    open_root(
        &mut xml,
        "p:sldLayout",
        &format!(r#" type="{}" preserve="1""#, layout.kind),
    )?;
    write!(xml, r#"<p:cSld name="{}"><p:spTree>"#, esc(layout.name))?;
    write_group_props(&mut xml);
    if let Some(ph) = layout.title_ph {
        write_placeholder(&mut xml, 2, "Title 1", ph, None, &layout.title_rect)?;
    }
    if layout.has_body {
        write_placeholder(&mut xml, 3, "Content Placeholder 2", "body", Some(1), &BODY_RECT)?;
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    Ok(xml)
}

/// Geometry of the footer-row placeholders on the master.
pub(crate) const DATE_RECT: Rect = Rect {
    left: 0.5,
    top: 6.95,
    width: 2.33,
    height: 0.4,
};
pub(crate) const FOOTER_RECT: Rect = Rect {
    left: 3.42,
    top: 6.95,
    width: 3.17,
    height: 0.4,
};
pub(crate) const SLIDE_NUMBER_RECT: Rect = Rect {
    left: 7.17,
    top: 6.95,
    width: 2.33,
    height: 0.4,
};

pub(crate) fn slide_master_xml() -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    open_root(&mut xml, "p:sldMaster", "")?;
    xml.push_str("<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg><p:spTree>");
    write_group_props(&mut xml);
    write_placeholder(&mut xml, 2, "Title Placeholder 1", "title", None, &TITLE_RECT)?;
    write_placeholder(&mut xml, 3, "Text Placeholder 2", "body", Some(1), &BODY_RECT)?;
    write_placeholder(&mut xml, 4, "Date Placeholder 3", "dt", Some(2), &DATE_RECT)?;
    write_placeholder(&mut xml, 5, "Footer Placeholder 4", "ftr", Some(3), &FOOTER_RECT)?;
    write_placeholder(&mut xml, 6, "Slide Number Placeholder 5", "sldNum", Some(4), &SLIDE_NUMBER_RECT)?;
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#);
    xml.push_str("<p:sldLayoutIdLst>");
    for i in 0..LAYOUTS.len() {
        write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            2_147_483_649u64 + i as u64,
            i + 1
        )?;
    }
    xml.push_str("</p:sldLayoutIdLst>");
    xml.push_str("<p:txStyles>");
    xml.push_str(r#"<p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#);
    xml.push_str(r#"<p:bodyStyle><a:lvl1pPr marL="342900" indent="-342900"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="3200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#);
    xml.push_str(r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#);
    xml.push_str("</p:txStyles></p:sldMaster>");
    Ok(xml)
}

pub(crate) fn theme_xml() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
        r#"<a:clrScheme name="Office">"#,
        r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
        r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
        r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
        r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
        r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
        r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
        r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
        r#"</a:clrScheme>"#,
        r#"<a:fontScheme name="Office">"#,
        r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
        r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        r#"</a:fontScheme>"#,
        r#"<a:fmtScheme name="Office"><a:fillStyleLst>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="95000"/></a:schemeClr></a:solidFill>"#,
        r#"</a:fillStyleLst><a:lnStyleLst>"#,
        r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"><a:shade val="95000"/></a:schemeClr></a:solidFill></a:ln>"#,
        r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"</a:lnStyleLst><a:effectStyleLst>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"</a:effectStyleLst><a:bgFillStyleLst>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill>"#,
        r#"</a:bgFillStyleLst></a:fmtScheme>"#,
        r#"</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#,
    )
}

pub(crate) fn core_props_xml(title: Option<&str>) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    if let Some(t) = title {
        xml.push_str("<dc:title>");
        xml.push_str(&esc(t));
        xml.push_str("</dc:title>");
    }
    xml.push_str("<dc:creator>deckhand</dc:creator><cp:revision>1</cp:revision></cp:coreProperties>");
    xml
}

pub(crate) fn app_props_xml(slides: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>deckhand</Application><Slides>{slides}</Slides></Properties>"#
    )
}
