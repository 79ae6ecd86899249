//! Input normalization: pull the image reference out of command markup.

use crate::markup::{self, Element, Visit, Visitor};
use crate::models::NormalizedInput;
use crate::{Error, Result};

/// Captures the source of the first `img` element and removes every `img`
/// from the text. A second image with a source is an error.
#[derive(Default)]
struct ImageExtractor {
    image_ref: Option<String>,
}

impl Visitor for ImageExtractor {
    fn visit_element(&mut self, element: &Element) -> Result<Visit> {
        if element.tag != "img" {
            return Ok(Visit::Descend);
        }

        let source = element
            .attr("src")
            .filter(|src| !src.is_empty())
            .or_else(|| element.attr("url").filter(|url| !url.is_empty()));

        match source {
            Some(_) if self.image_ref.is_some() => return Err(Error::MultipleImages),
            Some(source) => self.image_ref = Some(source.to_string()),
            None => tracing::debug!("Dropping img element without a source"),
        }

        Ok(Visit::Replace(Vec::new()))
    }
}

/// Split raw command text into cleaned text and at most one image reference.
pub fn normalize_input(raw: &str) -> Result<NormalizedInput> {
    let nodes = markup::parse(raw);
    tracing::debug!("Parsed command markup: {:?}", nodes);

    let mut extractor = ImageExtractor::default();
    let rewritten = markup::transform(nodes, &mut extractor)?;

    Ok(NormalizedInput {
        text: markup::render_text(&rewritten),
        image_ref: extractor.image_ref,
    })
}
