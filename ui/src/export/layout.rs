//! Turns a captured [`SnapshotNode`] tree into measured blocks and draws them
//! as SVG.
//!
//! Layout is a simple vertical flow: tables, graphics and text paragraphs are
//! stacked in document order. Inline styling that matters for a standings
//! export (cell background fills, text colour, bold headers) is carried over;
//! everything else uses the snapshot defaults.

use std::fmt::Write as _;

use crate::export::assets::InlineAsset;
use crate::export::fonts::{self, FontWeight, FONT_FAMILY};
use crate::export::resolver::{escape_xml, SnapshotNode, FROZEN_CANVAS_ATTR};

pub const BODY_SIZE: f64 = 13.0;
pub const TEXT_COLOR: &str = "#111827";
pub const BLOCK_GAP: f64 = 12.0;

const CELL_PAD_X: f64 = 10.0;
const ROW_HEIGHT: f64 = 28.0;
const HEADER_ROW_HEIGHT: f64 = 32.0;
const CELL_IMAGE: f64 = 18.0;
const DEFAULT_IMAGE: f64 = 24.0;
const BORDER_COLOR: &str = "#e5e7eb";

const INLINE_TAGS: [&str; 12] = [
    "span", "strong", "b", "em", "i", "a", "small", "label", "sup", "sub", "abbr", "time",
];
const FORM_TAGS: [&str; 4] = ["input", "select", "textarea", "option"];

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub weight: FontWeight,
    pub color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: BODY_SIZE,
            weight: FontWeight::Regular,
            color: TEXT_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub style: TextStyle,
}

impl TextBlock {
    /// Greedy word wrap against `max_width`.
    pub fn lines(&self, max_width: f64) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in self.text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && self.measure(&candidate) > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    pub fn natural_width(&self) -> f64 {
        self.measure(&self.text)
    }

    pub fn height(&self, max_width: f64) -> f64 {
        let metrics = fonts::measure(self.style.weight, self.style.size);
        metrics.line_h * self.lines(max_width).len() as f64
    }

    fn measure(&self, text: &str) -> f64 {
        fonts::text_width(text, self.style.weight, self.style.size)
    }

    fn render(&self, x: f64, y: f64, max_width: f64, out: &mut String) {
        let metrics = fonts::measure(self.style.weight, self.style.size);
        for (index, line) in self.lines(max_width).iter().enumerate() {
            let baseline = y + metrics.asc + metrics.line_h * index as f64;
            write_text(out, x, baseline, line, &self.style, "start");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub image: Option<(String, f64)>,
    pub fill: Option<String>,
    pub color: Option<String>,
    pub header: bool,
}

impl TableCell {
    fn style(&self) -> TextStyle {
        TextStyle {
            size: BODY_SIZE,
            weight: if self.header {
                FontWeight::Bold
            } else {
                FontWeight::Regular
            },
            color: self.color.clone().unwrap_or_else(|| TEXT_COLOR.to_string()),
        }
    }

    fn content_width(&self) -> f64 {
        let style = self.style();
        let image = self.image.as_ref().map(|(_, w)| w + 6.0).unwrap_or(0.0);
        image + fonts::text_width(&self.text, style.weight, style.size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub rows: Vec<Vec<TableCell>>,
    pub columns: Vec<f64>,
}

impl TableBlock {
    pub fn from_node(table: &SnapshotNode) -> Self {
        let mut rows = Vec::new();
        table.visit(&mut |node| {
            if node.tag() == Some("tr") {
                let cells: Vec<TableCell> = node
                    .children()
                    .iter()
                    .filter(|cell| matches!(cell.tag(), Some("td") | Some("th")))
                    .map(table_cell)
                    .collect();
                if !cells.is_empty() {
                    rows.push(cells);
                }
            }
        });

        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut columns = vec![0.0_f64; column_count];
        for row in &rows {
            for (index, cell) in row.iter().enumerate() {
                let width = (cell.content_width() + CELL_PAD_X * 2.0).ceil();
                columns[index] = columns[index].max(width);
            }
        }

        Self { rows, columns }
    }

    pub fn width(&self) -> f64 {
        self.columns.iter().sum()
    }

    pub fn height(&self) -> f64 {
        self.rows.iter().map(|row| row_height(row)).sum()
    }

    fn render(&self, x: f64, y: f64, out: &mut String) {
        let mut top = y;
        for row in &self.rows {
            let height = row_height(row);
            let mut left = x;
            for (index, cell) in row.iter().enumerate() {
                let width = self.columns[index];
                if let Some(fill) = &cell.fill {
                    let _ = write!(
                        out,
                        r#"<rect x="{left}" y="{top}" width="{width}" height="{height}" fill="{}"/>"#,
                        escape_xml(fill)
                    );
                }
                let mut text_x = left + CELL_PAD_X;
                if let Some((href, size)) = &cell.image {
                    write_image(out, text_x, top + (height - size) / 2.0, *size, *size, href);
                    text_x += size + 6.0;
                }
                let style = cell.style();
                let metrics = fonts::measure(style.weight, style.size);
                let baseline = top + (height - metrics.line_h) / 2.0 + metrics.asc;
                write_text(out, text_x, baseline, &cell.text, &style, "start");
                left += width;
            }
            top += height;
            let _ = write!(
                out,
                r#"<line x1="{x}" y1="{top}" x2="{}" y2="{top}" stroke="{BORDER_COLOR}" stroke-width="1"/>"#,
                x + self.width()
            );
        }
    }
}

fn row_height(row: &[TableCell]) -> f64 {
    if row.iter().all(|cell| cell.header) {
        HEADER_ROW_HEIGHT
    } else {
        ROW_HEIGHT
    }
}

fn table_cell(node: &SnapshotNode) -> TableCell {
    let mut image = None;
    node.visit(&mut |inner| {
        if image.is_none() && inner.tag() == Some("img") {
            if let Some(src) = inner.attr("src").filter(|src| src.starts_with("data:")) {
                image = Some((src.to_string(), CELL_IMAGE));
            }
        }
    });

    let fill = node
        .attr("style")
        .and_then(|style| style_value(style, "background-color").or_else(|| style_value(style, "background")))
        .or_else(|| node.attr("bgcolor").map(str::to_string));
    let color = node.attr("style").and_then(|style| style_value(style, "color"));

    TableCell {
        text: node.text_content(),
        image,
        fill,
        color,
        header: node.tag() == Some("th"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Table(TableBlock),
    /// An inlined `<img>`.
    Image { href: String, width: f64, height: f64 },
    /// Inline SVG or a frozen canvas; drives the chart width policy.
    Graphic { href: String, width: f64, height: f64 },
    /// A canvas that could not be frozen.
    Placeholder { width: f64, height: f64 },
    Text(TextBlock),
}

impl Block {
    pub fn is_graphic(&self) -> bool {
        matches!(self, Block::Graphic { .. } | Block::Placeholder { .. })
    }

    pub fn natural_width(&self) -> f64 {
        match self {
            Block::Table(table) => table.width(),
            Block::Image { width, .. }
            | Block::Graphic { width, .. }
            | Block::Placeholder { width, .. } => *width,
            Block::Text(text) => text.natural_width(),
        }
    }

    /// Height once laid out in a column `content_width` wide.
    pub fn height(&self, content_width: f64) -> f64 {
        match self {
            Block::Table(table) => table.height(),
            Block::Image { height, .. } | Block::Placeholder { height, .. } => *height,
            Block::Graphic { width, height, .. } => scaled(*width, *height, content_width).1,
            Block::Text(text) => text.height(content_width),
        }
    }

    pub fn render(&self, x: f64, y: f64, content_width: f64, out: &mut String) {
        match self {
            Block::Table(table) => table.render(x, y, out),
            Block::Image {
                href,
                width,
                height,
            } => write_image(out, x, y, *width, *height, href),
            Block::Graphic {
                href,
                width,
                height,
            } => {
                let (w, h) = scaled(*width, *height, content_width);
                write_image(out, x, y, w, h, href);
            }
            Block::Placeholder { width, height } => {
                let _ = write!(
                    out,
                    r##"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="#f3f4f6" stroke="{BORDER_COLOR}"/>"##
                );
            }
            Block::Text(text) => text.render(x, y, content_width, out),
        }
    }
}

/// Shrink a graphic to fit the column, keeping its aspect ratio.
fn scaled(width: f64, height: f64, max_width: f64) -> (f64, f64) {
    if width <= max_width || width <= 0.0 {
        (width, height)
    } else {
        (max_width, height * max_width / width)
    }
}

/// Flatten `root` into blocks. `chart_width` sizes graphics that declare no
/// width of their own.
pub fn collect_blocks(root: &SnapshotNode, chart_width: f64) -> Vec<Block> {
    let mut blocks = Vec::new();
    collect_into(root, &TextStyle::default(), chart_width, &mut blocks);
    blocks
}

fn collect_into(node: &SnapshotNode, inherited: &TextStyle, chart_width: f64, out: &mut Vec<Block>) {
    let Some(tag) = node.tag() else {
        if let SnapshotNode::Text(raw) = node {
            push_text(out, raw, inherited);
        }
        return;
    };

    if FORM_TAGS.contains(&tag) {
        return;
    }

    let style = element_style(node, inherited);
    match tag {
        "table" => {
            let table = TableBlock::from_node(node);
            if !table.rows.is_empty() {
                out.push(Block::Table(table));
            }
        }
        "svg" => out.push(svg_block(node, chart_width)),
        "img" => {
            if let Some(block) = image_block(node, chart_width) {
                out.push(block);
            }
        }
        "canvas" => out.push(Block::Placeholder {
            width: dimension(node, "width").unwrap_or(chart_width),
            height: dimension(node, "height").unwrap_or(chart_width / 2.0),
        }),
        _ if is_inline_only(node) => push_text(out, &node.text_content(), &style),
        _ => {
            for child in node.children() {
                collect_into(child, &style, chart_width, out);
            }
        }
    }
}

fn push_text(out: &mut Vec<Block>, raw: &str, style: &TextStyle) {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        out.push(Block::Text(TextBlock {
            text,
            style: style.clone(),
        }));
    }
}

fn is_inline_only(node: &SnapshotNode) -> bool {
    node.children().iter().all(|child| match child.tag() {
        None => true,
        Some(tag) => INLINE_TAGS.contains(&tag) && is_inline_only(child),
    })
}

fn element_style(node: &SnapshotNode, inherited: &TextStyle) -> TextStyle {
    let mut style = inherited.clone();
    match node.tag() {
        Some("h1") => style.size = 26.0,
        Some("h2") => style.size = 21.0,
        Some("h3") => style.size = 17.0,
        Some("h4" | "h5" | "h6") => style.size = 15.0,
        _ => {}
    }
    if matches!(
        node.tag(),
        Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "strong" | "b" | "th")
    ) {
        style.weight = FontWeight::Bold;
    }

    if let Some(css) = node.attr("style") {
        if let Some(color) = style_value(css, "color") {
            style.color = color;
        }
        if let Some(size) = style_value(css, "font-size").and_then(|v| parse_px(&v)) {
            style.size = size;
        }
        if let Some(weight) = style_value(css, "font-weight") {
            style.weight = match weight.as_str() {
                "bold" | "bolder" | "700" | "800" | "900" => FontWeight::Bold,
                "600" => FontWeight::SemiBold,
                _ => FontWeight::Regular,
            };
        }
    }
    style
}

fn svg_block(node: &SnapshotNode, chart_width: f64) -> Block {
    let mut svg = node.clone();
    if svg.attr("xmlns").is_none() {
        svg.set_attr("xmlns", "http://www.w3.org/2000/svg");
    }
    let (width, height) = declared_size(node).unwrap_or((chart_width, chart_width / 2.0));
    if svg.attr("width").is_none() {
        svg.set_attr("width", &format!("{width}"));
        svg.set_attr("height", &format!("{height}"));
    }
    Block::Graphic {
        href: InlineAsset::from_svg(&svg.to_markup()).data_uri,
        width,
        height,
    }
}

fn image_block(node: &SnapshotNode, chart_width: f64) -> Option<Block> {
    let href = node.attr("src").filter(|src| src.starts_with("data:"))?;
    if node.attr(FROZEN_CANVAS_ATTR).is_some() {
        let width = dimension(node, "width").unwrap_or(chart_width);
        let height = dimension(node, "height").unwrap_or(chart_width / 2.0);
        return Some(Block::Graphic {
            href: href.to_string(),
            width,
            height,
        });
    }
    Some(Block::Image {
        href: href.to_string(),
        width: dimension(node, "width").unwrap_or(DEFAULT_IMAGE),
        height: dimension(node, "height").unwrap_or(DEFAULT_IMAGE),
    })
}

fn declared_size(node: &SnapshotNode) -> Option<(f64, f64)> {
    if let (Some(width), Some(height)) = (dimension(node, "width"), dimension(node, "height")) {
        return Some((width, height));
    }
    let view_box: Vec<f64> = node
        .attr("viewBox")
        .or_else(|| node.attr("viewbox"))?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|part| part.parse().ok())
        .collect();
    match view_box.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => Some((*width, *height)),
        _ => None,
    }
}

fn dimension(node: &SnapshotNode, name: &str) -> Option<f64> {
    node.attr(name)
        .and_then(parse_px)
        .or_else(|| node.attr("style").and_then(|css| style_value(css, name)).and_then(|v| parse_px(&v)))
        .filter(|value| *value > 0.0)
}

fn parse_px(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches("px").trim().parse().ok()
}

/// Value of `property` in an inline `style` attribute.
pub(crate) fn style_value(css: &str, property: &str) -> Option<String> {
    css.split(';').find_map(|declaration| {
        let (key, value) = declaration.split_once(':')?;
        if key.trim().eq_ignore_ascii_case(property) {
            Some(value.trim().to_string()).filter(|v| !v.is_empty())
        } else {
            None
        }
    })
}

pub(crate) fn write_text(out: &mut String, x: f64, baseline: f64, text: &str, style: &TextStyle, anchor: &str) {
    let _ = write!(
        out,
        r#"<text x="{x}" y="{baseline}" font-family="{FONT_FAMILY}" font-size="{}" font-weight="{}" fill="{}" text-anchor="{anchor}">{}</text>"#,
        style.size,
        style.weight.css_value(),
        escape_xml(&style.color),
        escape_xml(text)
    );
}

pub(crate) fn write_image(out: &mut String, x: f64, y: f64, width: f64, height: f64, href: &str) {
    let _ = write!(
        out,
        r#"<image x="{x}" y="{y}" width="{width}" height="{height}" preserveAspectRatio="xMidYMid meet" href="{}"/>"#,
        escape_xml(href)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(tag: &str, attrs: &[(&str, &str)], text: &str) -> SnapshotNode {
        SnapshotNode::element(tag, attrs, vec![SnapshotNode::text(text)])
    }

    fn standings() -> SnapshotNode {
        SnapshotNode::element(
            "table",
            &[("class", "cwv-table")],
            vec![SnapshotNode::element(
                "tbody",
                &[],
                vec![
                    SnapshotNode::element(
                        "tr",
                        &[],
                        vec![cell("th", &[], "Team"), cell("th", &[], "CWV")],
                    ),
                    SnapshotNode::element(
                        "tr",
                        &[],
                        vec![
                            cell("td", &[], "North Carolina"),
                            cell("td", &[("style", "background-color: #bbf7d0")], "+1.25"),
                        ],
                    ),
                ],
            )],
        )
    }

    #[test]
    fn tables_measure_columns_from_their_widest_cell() {
        let table = TableBlock::from_node(&standings());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.columns.len(), 2);
        assert!(table.columns[0] > table.columns[1]);
        assert_eq!(table.rows[1][1].fill.as_deref(), Some("#bbf7d0"));
        assert_eq!(table.height(), HEADER_ROW_HEIGHT + ROW_HEIGHT);
    }

    #[test]
    fn mixed_content_flattens_in_document_order() {
        let root = SnapshotNode::element(
            "div",
            &[],
            vec![
                cell("h2", &[], "ACC standings"),
                standings(),
                SnapshotNode::element("input", &[("type", "checkbox")], vec![]),
                SnapshotNode::element("svg", &[("viewBox", "0 0 600 300")], vec![]),
                cell("p", &[("style", "color: #6b7280")], "Values computed nightly."),
            ],
        );

        let blocks = collect_blocks(&root, 960.0);

        assert_eq!(blocks.len(), 4);
        assert!(matches!(&blocks[0], Block::Text(t) if t.style.weight == FontWeight::Bold));
        assert!(matches!(blocks[1], Block::Table(_)));
        assert!(matches!(
            blocks[2],
            Block::Graphic { width, height, .. } if width == 600.0 && height == 300.0
        ));
        assert!(matches!(&blocks[3], Block::Text(t) if t.style.color == "#6b7280"));
    }

    #[test]
    fn undecorated_images_are_skipped() {
        let root = SnapshotNode::element(
            "div",
            &[],
            vec![SnapshotNode::element("img", &[("src", "/logos/duke.png")], vec![])],
        );
        assert!(collect_blocks(&root, 960.0).is_empty());
    }

    #[test]
    fn long_text_wraps_inside_the_column() {
        let block = TextBlock {
            text: "Conference win value compares each team against an average bubble team".into(),
            style: TextStyle::default(),
        };
        let lines = block.lines(160.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), block.text);
    }

    #[test]
    fn wide_graphics_shrink_to_the_column() {
        assert_eq!(scaled(1200.0, 600.0, 600.0), (600.0, 300.0));
        assert_eq!(scaled(400.0, 200.0, 600.0), (400.0, 200.0));
    }

    #[test]
    fn inline_style_lookup_is_case_insensitive() {
        assert_eq!(
            style_value("Color: red; font-size: 12px", "color").as_deref(),
            Some("red")
        );
        assert_eq!(style_value("color:", "color"), None);
    }
}
