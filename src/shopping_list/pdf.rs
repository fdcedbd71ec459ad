use printpdf::{Mm, PdfDocument};

use crate::{
    constants::{
        PDF_FIRST_LINE_Y, PDF_LINE_FONT_SIZE, PDF_LINE_STEP, PDF_MARGIN_BOTTOM, PDF_MARGIN_LEFT,
        PDF_PAGE_HEIGHT, PDF_PAGE_WIDTH, PDF_TITLE_FONT_SIZE, PDF_TITLE_Y, SHOPPING_LIST_TITLE,
    },
    error::Error,
};

use super::aggregate::ShoppingList;

const LAYER_NAME: &str = "Layer 1";

/// Embedded in every document; the builtin PDF fonts only cover WinAnsi.
const FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// A line of text at a fixed height on a page, in millimetres from the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub y: f32,
    pub font_size: f32,
}

/// Splits the list into pages. The first page always exists and carries the title.
pub fn layout_pages(list: &ShoppingList) -> Vec<Vec<PlacedLine>> {
    let mut pages = vec![vec![PlacedLine {
        text: SHOPPING_LIST_TITLE.to_owned(),
        y: PDF_TITLE_Y,
        font_size: PDF_TITLE_FONT_SIZE,
    }]];
    let mut y = PDF_FIRST_LINE_Y;

    for (index, entry) in list.entries.iter().enumerate() {
        if y < PDF_MARGIN_BOTTOM {
            pages.push(Vec::new());
            y = PDF_TITLE_Y;
        }

        let text = format!(
            "{}. {} - {} {}",
            index + 1,
            entry.name,
            entry.amount,
            entry.measurement_unit
        );
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine {
                text,
                y,
                font_size: PDF_LINE_FONT_SIZE,
            });
        }
        y -= PDF_LINE_STEP;
    }

    pages
}

pub fn render_pdf(list: &ShoppingList) -> Result<Vec<u8>, Error> {
    let pages = layout_pages(list);

    let (doc, first_page, first_layer) = PdfDocument::new(
        SHOPPING_LIST_TITLE,
        Mm(PDF_PAGE_WIDTH),
        Mm(PDF_PAGE_HEIGHT),
        LAYER_NAME,
    );
    let font = doc
        .add_external_font(FONT)
        .map_err(|e| Error::Render(e.to_string()))?;

    for (index, lines) in pages.iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PDF_PAGE_WIDTH), Mm(PDF_PAGE_HEIGHT), LAYER_NAME)
        };
        let layer = doc.get_page(page).get_layer(layer);
        for line in lines {
            layer.use_text(
                line.text.as_str(),
                line.font_size,
                Mm(PDF_MARGIN_LEFT),
                Mm(line.y),
                &font,
            );
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| Error::Render(e.to_string()))?;

    log::debug!(
        "Rendered shopping list with {} entries on {} pages",
        list.len(),
        pages.len()
    );

    Ok(bytes)
}
