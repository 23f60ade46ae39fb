//! PDF report document: title block, chart image, heading-styled body

use chrono::Utc;
use genpdf::elements::{Break, Image, Paragraph};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element, SimplePageDecorator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::RenderResult;
use crate::config::OutputConfig;

const TITLE_SIZE: u8 = 18;
const HEADING_SIZE: u8 = 13;
const BODY_SIZE: u8 = 12;
const NOTICE_SIZE: u8 = 11;

pub struct PdfRenderer {
    config: OutputConfig,
}

impl PdfRenderer {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Lay out the report into a paginated PDF. The output path embeds
    /// the generation timestamp, so repeated runs never collide.
    pub fn render(
        &self,
        report_text: &str,
        chart_path: &Path,
        symbol: &str,
    ) -> RenderResult<PathBuf> {
        fs::create_dir_all(&self.config.reports_dir)?;

        let font_family = genpdf::fonts::from_files(
            &self.config.font_dir,
            &self.config.font_family,
            None,
        )?;

        let mut doc = genpdf::Document::new(font_family);
        let title = sanitize_text(&format!("Financial Analysis Report: {}", symbol));
        doc.set_title(title.clone());

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        doc.push(Paragraph::new(title).styled(Style::new().bold().with_font_size(TITLE_SIZE)));
        doc.push(Break::new(1));

        let generated = Utc::now().format("%Y-%m-%d %H:%M");
        doc.push(
            Paragraph::new(sanitize_text(&format!("Generated on: {}", generated)))
                .styled(Style::new().with_font_size(BODY_SIZE)),
        );
        doc.push(Break::new(1));

        // Embed the chart when it can be loaded; otherwise a visible
        // notice stands in and the render carries on.
        let mut chart_embedded = false;
        if chart_path.exists() {
            match Image::from_path(chart_path) {
                Ok(image) => {
                    doc.push(image.with_alignment(Alignment::Center));
                    chart_embedded = true;
                }
                Err(e) => warn!("Chart image could not be loaded: {}", e),
            }
        } else {
            warn!("Chart file missing at {}", chart_path.display());
        }
        if !chart_embedded {
            doc.push(
                Paragraph::new(sanitize_text("Chart could not be loaded.")).styled(
                    Style::new()
                        .italic()
                        .with_color(Color::Rgb(255, 0, 0))
                        .with_font_size(NOTICE_SIZE),
                ),
            );
        }
        doc.push(Break::new(1));

        for line in report_text.lines() {
            let clean = sanitize_text(line);
            if clean.trim().is_empty() {
                doc.push(Break::new(1));
            } else if is_heading(&clean) {
                doc.push(
                    Paragraph::new(clean)
                        .styled(Style::new().bold().with_font_size(HEADING_SIZE)),
                );
            } else {
                doc.push(Paragraph::new(clean).styled(Style::new().with_font_size(BODY_SIZE)));
            }
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self
            .config
            .reports_dir
            .join(format!("REPORT_{}_{}.pdf", symbol, timestamp));

        doc.render_to_file(&path)?;

        info!("PDF saved at {}", path.display());
        Ok(path)
    }
}

/// A body line starting with "N." for N in 1-8 marks a section heading.
pub fn is_heading(line: &str) -> bool {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some('.')) if ('1'..='8').contains(&first)
    )
}

/// Map typographic punctuation and accented letters to plain ASCII.
/// The layout encoding cannot represent them directly; every string
/// placed into the document passes through here. Idempotent because the
/// output is pure ASCII.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\u{2192}' => out.push_str("->"),
            '\u{2190}' => out.push_str("<-"),
            '\u{21D2}' => out.push_str("=>"),
            '\u{21D0}' => out.push_str("<="),
            '\u{2022}' | '\u{25E6}' | '\u{25AA}' | '\u{00B7}' | '\u{2219}' => out.push('*'),
            '\u{00A0}' => out.push(' '),
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => out.push('a'),
            'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => out.push('A'),
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'É' | 'È' | 'Ê' | 'Ë' => out.push('E'),
            'í' | 'ì' | 'î' | 'ï' => out.push('i'),
            'Í' | 'Ì' | 'Î' | 'Ï' => out.push('I'),
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => out.push('o'),
            'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ø' => out.push('O'),
            'ú' | 'ù' | 'û' | 'ü' => out.push('u'),
            'Ú' | 'Ù' | 'Û' | 'Ü' => out.push('U'),
            'ç' => out.push('c'),
            'Ç' => out.push('C'),
            'ñ' => out.push('n'),
            'Ñ' => out.push('N'),
            'ý' | 'ÿ' => out.push('y'),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'ß' => out.push_str("ss"),
            _ if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
