//! OPC package assembly.
//!
//! The whole archive is built in memory, written to a temporary file next to
//! the target and renamed over it. A failed save leaves any previous file at
//! that path untouched.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{DeckError, Result};

use super::chart::chart_xml;
use super::media::content_type;
use super::model::PptxPresentation;
use super::slide::{SlideRel, slide_xml};
use super::template::{
    LAYOUTS, app_props_xml, core_props_xml, slide_layout_xml, slide_master_xml, theme_xml,
};
use super::xml::{XML_DECL, open_root};

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_CORE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_MASTER: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_LAYOUT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

const MASTER_ID: u64 = 2_147_483_648;

/// Accumulates parts and their content-type overrides.
struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    overrides: Vec<(String, &'static str)>,
    defaults: BTreeSet<&'static str>,
}

impl PackageWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            overrides: Vec::new(),
            defaults: BTreeSet::new(),
        }
    }

    fn add(&mut self, name: &str, content: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip
            .write_all(content)
            .map_err(|e| DeckError::backend(format!("zip write {name}: {e}")))
    }

    fn add_part(&mut self, name: &str, content_type: &'static str, content: &[u8]) -> Result<()> {
        self.overrides.push((format!("/{name}"), content_type));
        self.add(name, content)
    }

    fn add_media(&mut self, name: &str, ext: &'static str, content: &[u8]) -> Result<()> {
        self.defaults.insert(ext);
        self.add(name, content)
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let types = self.content_types()?;
        self.add("[Content_Types].xml", types.as_bytes())?;
        Ok(self.zip.finish()?.into_inner())
    }

    fn content_types(&self) -> Result<String> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(XML_DECL);
        xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        for ext in &self.defaults {
            write!(
                xml,
                r#"<Default Extension="{ext}" ContentType="{}"/>"#,
                content_type(ext)
            )?;
        }
        for (part, ct) in &self.overrides {
            write!(xml, r#"<Override PartName="{part}" ContentType="{ct}"/>"#)?;
        }
        xml.push_str("</Types>");
        Ok(xml)
    }
}

/// Relationship list for one `.rels` part.
#[derive(Default)]
struct Rels(String);

impl Rels {
    fn push(&mut self, id: u32, rel_type: &str, target: &str) -> Result<()> {
        write!(
            self.0,
            r#"<Relationship Id="rId{id}" Type="{rel_type}" Target="{target}"/>"#
        )?;
        Ok(())
    }

    fn into_xml(self) -> String {
        format!(
            r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            self.0
        )
    }
}

fn rel(kind: &str) -> String {
    format!("{REL_BASE}/{kind}")
}

/// Serialize `pres` into `.pptx` bytes.
pub(crate) fn to_bytes(pres: &PptxPresentation, title: Option<&str>) -> Result<Vec<u8>> {
    let mut pkg = PackageWriter::new();

    let mut root = Rels::default();
    root.push(1, &rel("officeDocument"), "ppt/presentation.xml")?;
    root.push(2, REL_CORE, "docProps/core.xml")?;
    root.push(3, &rel("extended-properties"), "docProps/app.xml")?;
    pkg.add("_rels/.rels", root.into_xml().as_bytes())?;
    pkg.add_part("docProps/core.xml", CT_CORE, core_props_xml(title).as_bytes())?;
    pkg.add_part("docProps/app.xml", CT_APP, app_props_xml(pres.slides.len()).as_bytes())?;

    // presentation.xml: master is rId1, slides rId2.., theme last
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    open_root(&mut xml, "p:presentation", r#" saveSubsetFonts="1""#)?;
    write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="{MASTER_ID}" r:id="rId1"/></p:sldMasterIdLst>"#
    )?;
    let mut pres_rels = Rels::default();
    pres_rels.push(1, &rel("slideMaster"), "slideMasters/slideMaster1.xml")?;
    if !pres.slides.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (i, slide) in pres.slides.iter().enumerate() {
            let rid = i as u32 + 2;
            write!(xml, r#"<p:sldId id="{}" r:id="rId{rid}"/>"#, slide.id)?;
            pres_rels.push(rid, &rel("slide"), &format!("slides/slide{}.xml", i + 1))?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
        pres.slide_width, pres.slide_height, pres.slide_height, pres.slide_width
    )?;
    pres_rels.push(pres.slides.len() as u32 + 2, &rel("theme"), "theme/theme1.xml")?;
    pkg.add_part("ppt/presentation.xml", CT_PRESENTATION, xml.as_bytes())?;
    pkg.add("ppt/_rels/presentation.xml.rels", pres_rels.into_xml().as_bytes())?;

    pkg.add_part(
        "ppt/slideMasters/slideMaster1.xml",
        CT_MASTER,
        slide_master_xml()?.as_bytes(),
    )?;
    let mut master_rels = Rels::default();
    for i in 0..LAYOUTS.len() {
        master_rels.push(
            i as u32 + 1,
            &rel("slideLayout"),
            &format!("../slideLayouts/slideLayout{}.xml", i + 1),
        )?;
    }
    master_rels.push(LAYOUTS.len() as u32 + 1, &rel("theme"), "../theme/theme1.xml")?;
    pkg.add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        master_rels.into_xml().as_bytes(),
    )?;

    for (i, layout) in LAYOUTS.iter().enumerate() {
        let n = i + 1;
        pkg.add_part(
            &format!("ppt/slideLayouts/slideLayout{n}.xml"),
            CT_LAYOUT,
            slide_layout_xml(layout)?.as_bytes(),
        )?;
        let mut rels = Rels::default();
        rels.push(1, &rel("slideMaster"), "../slideMasters/slideMaster1.xml")?;
        pkg.add(
            &format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"),
            rels.into_xml().as_bytes(),
        )?;
    }

    pkg.add_part("ppt/theme/theme1.xml", CT_THEME, theme_xml().as_bytes())?;

    let mut charts = 0;
    for (i, slide) in pres.slides.iter().enumerate() {
        let n = i + 1;
        let out = slide_xml(slide, i, &mut charts)?;
        pkg.add_part(&format!("ppt/slides/slide{n}.xml"), CT_SLIDE, out.xml.as_bytes())?;

        let mut rels = Rels::default();
        rels.push(
            1,
            &rel("slideLayout"),
            &format!("../slideLayouts/slideLayout{}.xml", slide.layout + 1),
        )?;
        for r in &out.rels {
            match r {
                SlideRel::Image { rid, media } => {
                    let part = pres
                        .media
                        .get(*media)
                        .ok_or_else(|| DeckError::backend(format!("dangling media index {media}")))?;
                    let name = format!("image{}.{}", media + 1, part.ext());
                    rels.push(*rid, &rel("image"), &format!("../media/{name}"))?;
                }
                SlideRel::Chart { rid, number, .. } => {
                    rels.push(*rid, &rel("chart"), &format!("../charts/chart{number}.xml"))?;
                }
            }
        }
        pkg.add(
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            rels.into_xml().as_bytes(),
        )?;

        for r in out.rels {
            if let SlideRel::Chart { number, chart, .. } = r {
                pkg.add_part(
                    &format!("ppt/charts/chart{number}.xml"),
                    CT_CHART,
                    chart_xml(chart)?.as_bytes(),
                )?;
            }
        }
    }

    for (i, media) in pres.media.iter().enumerate() {
        let ext = media.ext();
        pkg.add_media(&format!("ppt/media/image{}.{ext}", i + 1), ext, &media.bytes)?;
    }

    pkg.finish()
}

/// Serialize and write to `path`, creating parent directories.
pub(crate) fn save(pres: &PptxPresentation, title: Option<&str>, path: &Path) -> Result<()> {
    let bytes = to_bytes(pres, title)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| DeckError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| DeckError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    tmp.write_all(&bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    tmp.persist(path).map_err(|e| DeckError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
