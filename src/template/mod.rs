//! Background template list and image loading.

mod selection;

use image::RgbaImage;
use serde::Deserialize;
use thiserror::Error;

use crate::net::{Fetch, FetchError};

pub use selection::{LoadTicket, TemplateSelection};

pub const IMGFLIP_TEMPLATES_URL: &str = "https://api.imgflip.com/get_memes";
pub const DEFAULT_TEMPLATE_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub box_count: u32,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("template list is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("template API reported failure")]
    Unsuccessful,
    #[error("template image {template_id} could not be decoded: {source}")]
    Decode {
        template_id: String,
        #[source]
        source: image::ImageError,
    },
}

pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

#[derive(Debug, Deserialize)]
struct ImgflipResponse {
    success: bool,
    #[serde(default)]
    data: Option<ImgflipData>,
}

#[derive(Debug, Deserialize)]
struct ImgflipData {
    memes: Vec<Template>,
}

pub fn parse_template_list(body: &[u8], limit: usize) -> TemplateResult<Vec<Template>> {
    let response: ImgflipResponse = serde_json::from_slice(body)?;
    match response {
        ImgflipResponse {
            success: true,
            data: Some(data),
        } => Ok(data.memes.into_iter().take(limit).collect()),
        _ => Err(TemplateError::Unsuccessful),
    }
}

/// Fetches template metadata and pixels from the template API.
pub struct TemplateSource<F> {
    fetch: F,
    list_url: String,
    limit: usize,
}

impl<F: Fetch> TemplateSource<F> {
    pub fn new(fetch: F, list_url: impl Into<String>, limit: usize) -> Self {
        Self {
            fetch,
            list_url: list_url.into(),
            limit,
        }
    }

    pub fn fetch_templates(&self) -> TemplateResult<Vec<Template>> {
        let body = self.fetch.get(&self.list_url)?;
        let templates = parse_template_list(&body, self.limit)?;
        tracing::info!(count = templates.len(), "loaded meme templates");
        Ok(templates)
    }

    pub fn fetch_image(&self, template: &Template) -> TemplateResult<RgbaImage> {
        let bytes = self.fetch.get(&template.url)?;
        decode_template_image(&template.id, &bytes)
    }
}

pub fn decode_template_image(template_id: &str, bytes: &[u8]) -> TemplateResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| TemplateError::Decode {
            template_id: template_id.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::encode_png;
    use crate::net::testing::CannedFetch;
    use image::Rgba;

    const LIST_URL: &str = "https://templates.test/get_memes";

    fn list_body(count: usize) -> String {
        let memes = (0..count)
            .map(|i| {
                format!(
                    r#"{{"id":"{i}","name":"Meme {i}","url":"https://i.test/{i}.png","width":{w},"height":400,"box_count":2}}"#,
                    w = 500 + i
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        format!(r#"{{"success":true,"data":{{"memes":[{memes}]}}}}"#)
    }

    #[test]
    fn parse_template_list_keeps_first_entries_up_to_limit() {
        let templates = parse_template_list(list_body(20).as_bytes(), 12).expect("list should parse");
        assert_eq!(templates.len(), 12);
        assert_eq!(templates[0].id, "0");
        assert_eq!(templates[0].box_count, 2);
        assert_eq!(templates[11].width, 511);
    }

    #[test]
    fn parse_template_list_rejects_unsuccessful_payload() {
        let err = parse_template_list(br#"{"success":false,"error_message":"nope"}"#, 12)
            .expect_err("unsuccessful response should fail");
        assert!(matches!(err, TemplateError::Unsuccessful));

        let err = parse_template_list(b"<html>", 12).expect_err("html should fail");
        assert!(matches!(err, TemplateError::Parse(_)));
    }

    #[test]
    fn source_fetches_list_and_decodes_images() {
        let png = encode_png(&RgbaImage::from_pixel(6, 3, Rgba([9, 8, 7, 255]))).unwrap();
        let fetch = CannedFetch::default()
            .with(LIST_URL, list_body(2))
            .with("https://i.test/1.png", png);
        let source = TemplateSource::new(fetch, LIST_URL, DEFAULT_TEMPLATE_LIMIT);

        let templates = source.fetch_templates().expect("list should load");
        assert_eq!(templates.len(), 2);
        let image = source.fetch_image(&templates[1]).expect("image should decode");
        assert_eq!(image.dimensions(), (6, 3));
        assert_eq!(image.get_pixel(0, 0), &Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn unreachable_or_corrupt_images_are_errors() {
        let fetch = CannedFetch::default()
            .with(LIST_URL, list_body(2))
            .with("https://i.test/0.png", b"not an image".to_vec());
        let source = TemplateSource::new(fetch, LIST_URL, DEFAULT_TEMPLATE_LIMIT);
        let templates = source.fetch_templates().unwrap();

        assert!(matches!(
            source.fetch_image(&templates[0]),
            Err(TemplateError::Decode { .. })
        ));
        assert!(matches!(
            source.fetch_image(&templates[1]),
            Err(TemplateError::Fetch(_))
        ));
    }
}
