//! Writing tab text to disk: a plain `.txt` file and a paginated document.
//!
//! The document is a series of SVG pages in a monospaced font. Long tab lines
//! are wrapped into aligned blocks so every block still reads as a full set of
//! strings.

use crate::config::ExportConfig;
use std::fs;
use std::path::{Path, PathBuf};
use svg::Document;
use svg::node::element::{Rectangle, Text};

const FONT_FAMILY: &str = "Courier, monospace";
/// Advance width of one Courier glyph, relative to the font size.
const CHAR_WIDTH: f32 = 0.6;
const LINE_HEIGHT: f32 = 1.2;
const MARGIN: f32 = 36.0;

/// `<stem>.txt`, next to the stem.
pub fn text_path(stem: &Path) -> PathBuf {
    sibling(stem, "txt", None)
}

/// `<stem>-page-<page>.svg`, pages counted from 1.
pub fn page_path(stem: &Path, page: usize) -> PathBuf {
    sibling(stem, "svg", Some(page))
}

fn sibling(stem: &Path, ext: &str, page: Option<usize>) -> PathBuf {
    let name = stem
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tab".to_string());
    let file = match page {
        Some(page) => format!("{name}-page-{page}.{ext}"),
        None => format!("{name}.{ext}"),
    };
    stem.with_file_name(file)
}

/// Write the tab text verbatim.
pub fn write_text(tab: &str, path: &Path) -> crate::Result<()> {
    fs::write(path, tab)?;
    tracing::info!(path = %path.display(), "wrote tab text");
    Ok(())
}

/// Split `tab` into pages of at most `lines_per_page` printed lines.
///
/// Each input line is cut into `chars_per_line` pieces. The n-th pieces of
/// all lines form a block; blocks are separated by one blank line and a block
/// is moved to the next page whole when it fits there but not on the current
/// one. Always returns at least one page.
pub fn paginate(tab: &str, chars_per_line: usize, lines_per_page: usize) -> Vec<Vec<String>> {
    let width = chars_per_line.max(1);
    let per_page = lines_per_page.max(1);

    let lines: Vec<Vec<char>> = tab.lines().map(|l| l.chars().collect()).collect();
    let n_blocks = lines
        .iter()
        .map(|l| l.len().div_ceil(width))
        .max()
        .unwrap_or(0);

    let blocks: Vec<Vec<String>> = (0..n_blocks)
        .map(|b| {
            lines
                .iter()
                .map(|line| {
                    let start = (b * width).min(line.len());
                    let end = ((b + 1) * width).min(line.len());
                    line[start..end].iter().collect()
                })
                .collect()
        })
        .collect();

    let mut pages = Vec::new();
    let mut page: Vec<String> = Vec::new();
    for block in blocks {
        let needed = block.len() + usize::from(!page.is_empty());
        if !page.is_empty() && page.len() + needed > per_page {
            pages.push(std::mem::take(&mut page));
        }
        if !page.is_empty() {
            page.push(String::new());
        }
        for line in block {
            if page.len() == per_page {
                pages.push(std::mem::take(&mut page));
            }
            page.push(line);
        }
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }
    pages
}

/// One page as an SVG document.
pub fn render_page(lines: &[String], layout: &ExportConfig) -> Document {
    let font = layout.font_size;
    let width = 2.0 * MARGIN + layout.chars_per_line as f32 * CHAR_WIDTH * font;
    let height = 2.0 * MARGIN + layout.lines_per_page as f32 * LINE_HEIGHT * font;

    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("width", width)
                .set("height", height)
                .set("fill", "white"),
        );

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = MARGIN + (i as f32 + 1.0) * LINE_HEIGHT * font;
        doc = doc.add(
            Text::new(line.as_str())
                .set("x", MARGIN)
                .set("y", y)
                .set("font-family", FONT_FAMILY)
                .set("font-size", font)
                .set("xml:space", "preserve"),
        );
    }
    doc
}

/// Write every page of `tab` next to `stem`, returning the paths in order.
pub fn write_document(tab: &str, stem: &Path, layout: &ExportConfig) -> crate::Result<Vec<PathBuf>> {
    let pages = paginate(tab, layout.chars_per_line, layout.lines_per_page);
    let mut paths = Vec::with_capacity(pages.len());
    for (i, lines) in pages.iter().enumerate() {
        let path = page_path(stem, i + 1);
        svg::save(&path, &render_page(lines, layout))?;
        paths.push(path);
    }
    tracing::info!(pages = paths.len(), stem = %stem.display(), "wrote tab document");
    Ok(paths)
}

/// Write the outputs enabled in `config`.
pub fn export(tab: &str, stem: &Path, config: &ExportConfig) -> crate::Result<Vec<PathBuf>> {
    config.validate()?;
    let mut written = Vec::new();
    if config.text {
        let path = text_path(stem);
        write_text(tab, &path)?;
        written.push(path);
    }
    if config.document {
        written.extend(write_document(tab, stem, config)?);
    }
    Ok(written)
}
