use serde::Deserialize;
use warp::{
    http::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE},
    hyper::Body,
    reply::Response,
    Reply,
};

use crate::error::Error;

use super::{aggregate::ShoppingList, pdf::render_pdf, text::render_text};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShoppingListFormat {
    #[default]
    Text,
    Pdf,
}

impl ShoppingListFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ShoppingListFormat::Text => "text/plain; charset=utf-8",
            ShoppingListFormat::Pdf => "application/pdf",
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            ShoppingListFormat::Text => "shopping_list.txt",
            ShoppingListFormat::Pdf => "shopping_list.pdf",
        }
    }

    pub fn content_disposition(&self) -> &'static str {
        match self {
            ShoppingListFormat::Text => "attachment; filename=\"shopping_list.txt\"",
            ShoppingListFormat::Pdf => "attachment; filename=\"shopping_list.pdf\"",
        }
    }
}

/// A rendered shopping list, served as a file download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListDocument {
    pub format: ShoppingListFormat,
    pub bytes: Vec<u8>,
}

impl ShoppingListDocument {
    pub fn render(list: &ShoppingList, format: ShoppingListFormat) -> Result<Self, Error> {
        let bytes = match format {
            ShoppingListFormat::Text => render_text(list).into_bytes(),
            ShoppingListFormat::Pdf => render_pdf(list)?,
        };

        Ok(Self { format, bytes })
    }
}

impl Reply for ShoppingListDocument {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.bytes));
        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(self.format.content_type()),
        );
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static(self.format.content_disposition()),
        );
        response
    }
}
