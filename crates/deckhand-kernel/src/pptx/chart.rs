//! Chart part serialization.
//!
//! Data is written as string and number literals (`c:strLit` / `c:numLit`),
//! so charts render without an embedded workbook. Editing the data in
//! PowerPoint is not supported.

use std::fmt::{self, Write};

use deckhand_types::{ChartType, Series};

use super::model::ChartPart;
use super::xml::{NS_A, NS_C, NS_R, XML_DECL, esc};

const CAT_AX: u32 = 1;
const VAL_AX: u32 = 2;

/// Plot element and its fixed settings for one chart type.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Plot {
    Bar { dir: &'static str, grouping: &'static str },
    Line { grouping: &'static str, markers: bool },
    Pie,
    Doughnut,
    Area { grouping: &'static str },
    Scatter,
    Radar,
}

impl Plot {
    fn of(chart_type: ChartType) -> Self {
        use ChartType::*;
        match chart_type {
            BarClustered => Plot::Bar { dir: "bar", grouping: "clustered" },
            BarStacked => Plot::Bar { dir: "bar", grouping: "stacked" },
            BarStacked100 => Plot::Bar { dir: "bar", grouping: "percentStacked" },
            ColumnClustered => Plot::Bar { dir: "col", grouping: "clustered" },
            ColumnStacked => Plot::Bar { dir: "col", grouping: "stacked" },
            ColumnStacked100 => Plot::Bar { dir: "col", grouping: "percentStacked" },
            Line => Plot::Line { grouping: "standard", markers: false },
            LineMarkers => Plot::Line { grouping: "standard", markers: true },
            LineStacked => Plot::Line { grouping: "stacked", markers: false },
            Pie => Plot::Pie,
            Doughnut => Plot::Doughnut,
            Area => Plot::Area { grouping: "standard" },
            AreaStacked => Plot::Area { grouping: "stacked" },
            XyScatter => Plot::Scatter,
            Radar => Plot::Radar,
        }
    }

    fn element(&self) -> &'static str {
        match self {
            Plot::Bar { .. } => "c:barChart",
            Plot::Line { .. } => "c:lineChart",
            Plot::Pie => "c:pieChart",
            Plot::Doughnut => "c:doughnutChart",
            Plot::Area { .. } => "c:areaChart",
            Plot::Scatter => "c:scatterChart",
            Plot::Radar => "c:radarChart",
        }
    }

    fn has_axes(&self) -> bool {
        !matches!(self, Plot::Pie | Plot::Doughnut)
    }
}

pub(crate) fn chart_xml(chart: &ChartPart) -> Result<String, fmt::Error> {
    let plot = Plot::of(chart.chart_type);
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<c:chartSpace xmlns:c="{NS_C}" xmlns:a="{NS_A}" xmlns:r="{NS_R}">"#
    )?;
    xml.push_str(r#"<c:date1904 val="0"/><c:roundedCorners val="0"/><c:chart>"#);

    match &chart.title {
        Some(title) => {
            write!(
                xml,
                r#"<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p></c:rich></c:tx><c:overlay val="0"/></c:title>"#,
                esc(title)
            )?;
            xml.push_str(r#"<c:autoTitleDeleted val="0"/>"#);
        }
        None => xml.push_str(r#"<c:autoTitleDeleted val="1"/>"#),
    }

    xml.push_str("<c:plotArea><c:layout/>");
    write_plot(&mut xml, plot, chart)?;
    write_axes(&mut xml, plot)?;
    xml.push_str("</c:plotArea>");

    if chart.series.len() > 1 || !plot.has_axes() {
        xml.push_str(r#"<c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#);
    }
    xml.push_str(r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart></c:chartSpace>"#);
    Ok(xml)
}

fn write_plot(xml: &mut String, plot: Plot, chart: &ChartPart) -> fmt::Result {
    let tag = plot.element();
    write!(xml, "<{tag}>")?;
    match plot {
        Plot::Bar { dir, grouping } => {
            write!(xml, r#"<c:barDir val="{dir}"/><c:grouping val="{grouping}"/>"#)?;
        }
        Plot::Line { grouping, .. } | Plot::Area { grouping } => {
            write!(xml, r#"<c:grouping val="{grouping}"/>"#)?;
        }
        Plot::Scatter => xml.push_str(r#"<c:scatterStyle val="lineMarker"/>"#),
        Plot::Radar => xml.push_str(r#"<c:radarStyle val="marker"/>"#),
        Plot::Pie | Plot::Doughnut => {}
    }
    let vary = u8::from(!plot.has_axes());
    write!(xml, r#"<c:varyColors val="{vary}"/>"#)?;

    for (i, series) in chart.series.iter().enumerate() {
        write_series(xml, plot, i, series, &chart.categories)?;
    }

    match plot {
        Plot::Bar { grouping, .. } => {
            xml.push_str(r#"<c:gapWidth val="150"/>"#);
            if grouping != "clustered" {
                xml.push_str(r#"<c:overlap val="100"/>"#);
            }
        }
        Plot::Line { .. } => xml.push_str(r#"<c:marker val="1"/>"#),
        Plot::Pie => xml.push_str(r#"<c:firstSliceAng val="0"/>"#),
        Plot::Doughnut => xml.push_str(r#"<c:firstSliceAng val="0"/><c:holeSize val="50"/>"#),
        Plot::Area { .. } | Plot::Scatter | Plot::Radar => {}
    }
    if plot.has_axes() {
        write!(xml, r#"<c:axId val="{CAT_AX}"/><c:axId val="{VAL_AX}"/>"#)?;
    }
    write!(xml, "</{tag}>")
}

fn write_series(
    xml: &mut String,
    plot: Plot,
    index: usize,
    series: &Series,
    categories: &[String],
) -> fmt::Result {
    write!(
        xml,
        r#"<c:ser><c:idx val="{index}"/><c:order val="{index}"/><c:tx><c:v>{}</c:v></c:tx>"#,
        esc(&series.name)
    )?;
    match plot {
        Plot::Bar { .. } => xml.push_str(r#"<c:invertIfNegative val="0"/>"#),
        Plot::Line { markers: false, .. } => {
            xml.push_str(r#"<c:marker><c:symbol val="none"/></c:marker>"#)
        }
        Plot::Scatter => xml.push_str(r#"<c:spPr><a:ln w="47625"><a:noFill/></a:ln></c:spPr>"#),
        _ => {}
    }

    if plot == Plot::Scatter {
        xml.push_str("<c:xVal>");
        write_category_literal(xml, categories)?;
        xml.push_str("</c:xVal><c:yVal>");
        write_num_literal(xml, &series.values)?;
        xml.push_str(r#"</c:yVal><c:smooth val="0"/>"#);
    } else {
        xml.push_str("<c:cat>");
        write_str_literal(xml, categories)?;
        xml.push_str("</c:cat><c:val>");
        write_num_literal(xml, &series.values)?;
        xml.push_str("</c:val>");
        if matches!(plot, Plot::Line { .. }) {
            xml.push_str(r#"<c:smooth val="0"/>"#);
        }
    }
    xml.push_str("</c:ser>");
    Ok(())
}

/// X values as numbers when every category parses as one, else as labels.
fn write_category_literal(xml: &mut String, categories: &[String]) -> fmt::Result {
    let numeric: Option<Vec<f64>> = categories.iter().map(|c| c.trim().parse().ok()).collect();
    match numeric {
        Some(values) => write_num_literal(xml, &values),
        None => write_str_literal(xml, categories),
    }
}

fn write_str_literal(xml: &mut String, values: &[String]) -> fmt::Result {
    write!(xml, r#"<c:strLit><c:ptCount val="{}"/>"#, values.len())?;
    for (i, v) in values.iter().enumerate() {
        write!(xml, r#"<c:pt idx="{i}"><c:v>{}</c:v></c:pt>"#, esc(v))?;
    }
    xml.push_str("</c:strLit>");
    Ok(())
}

fn write_num_literal(xml: &mut String, values: &[f64]) -> fmt::Result {
    write!(
        xml,
        r#"<c:numLit><c:formatCode>General</c:formatCode><c:ptCount val="{}"/>"#,
        values.len()
    )?;
    for (i, v) in values.iter().enumerate() {
        write!(xml, r#"<c:pt idx="{i}"><c:v>{v}</c:v></c:pt>"#)?;
    }
    xml.push_str("</c:numLit>");
    Ok(())
}

fn write_axes(xml: &mut String, plot: Plot) -> fmt::Result {
    match plot {
        Plot::Pie | Plot::Doughnut => Ok(()),
        Plot::Scatter => {
            write_val_axis(xml, CAT_AX, VAL_AX, "b", "midCat", false)?;
            write_val_axis(xml, VAL_AX, CAT_AX, "l", "midCat", true)
        }
        Plot::Bar { dir: "bar", .. } => {
            write_cat_axis(xml, "l")?;
            write_val_axis(xml, VAL_AX, CAT_AX, "b", "between", true)
        }
        _ => {
            write_cat_axis(xml, "b")?;
            write_val_axis(xml, VAL_AX, CAT_AX, "l", "between", true)
        }
    }
}

fn write_cat_axis(xml: &mut String, pos: &str) -> fmt::Result {
    write!(
        xml,
        concat!(
            r#"<c:catAx><c:axId val="{CAT_AX}"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{pos}"/><c:numFmt formatCode="General" sourceLinked="1"/>"#,
            r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/>"#,
            r#"<c:crossAx val="{VAL_AX}"/><c:crosses val="autoZero"/><c:auto val="1"/>"#,
            r#"<c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/></c:catAx>"#,
        ),
        CAT_AX = CAT_AX,
        VAL_AX = VAL_AX,
        pos = pos,
    )
}

fn write_val_axis(
    xml: &mut String,
    id: u32,
    cross: u32,
    pos: &str,
    between: &str,
    gridlines: bool,
) -> fmt::Result {
    write!(
        xml,
        r#"<c:valAx><c:axId val="{id}"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="{pos}"/>"#
    )?;
    if gridlines {
        xml.push_str("<c:majorGridlines/>");
    }
    write!(
        xml,
        concat!(
            r#"<c:numFmt formatCode="General" sourceLinked="1"/><c:majorTickMark val="out"/>"#,
            r#"<c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{cross}"/>"#,
            r#"<c:crosses val="autoZero"/><c:crossBetween val="{between}"/></c:valAx>"#,
        ),
        cross = cross,
        between = between,
    )
}
