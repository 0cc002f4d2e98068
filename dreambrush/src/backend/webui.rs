use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use color_eyre::{
    Result,
    eyre::{Context, ensure},
};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::{ImageBackend, ImageBatchFuture, Txt2ImgRequest};

/// Client for an AUTOMATIC1111-style Stable Diffusion webui.
#[derive(Debug, Clone)]
pub struct WebUi {
    client: Client,
    base_url: String,
}

impl WebUi {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("http://{host}:{port}"),
        }
    }
}

#[derive(Deserialize)]
struct Txt2ImgResponse {
    images: Vec<String>,
}

impl ImageBackend for WebUi {
    fn txt2img<'a>(&'a self, req: Txt2ImgRequest) -> ImageBatchFuture<'a> {
        Box::pin(async move {
            let url = format!("{}/sdapi/v1/txt2img", self.base_url);
            debug!("txt2img request to {url}: {req:?}");

            let res = self
                .client
                .post(&url)
                .json(&req)
                .send()
                .await
                .context("sending txt2img request")?;

            let status = res.status();
            let body = res.text().await.context("reading txt2img response")?;
            ensure!(
                status.is_success(),
                "txt2img request failed: {status} - {body}"
            );

            let response: Txt2ImgResponse =
                serde_json::from_str(&body).context("parsing txt2img response")?;
            decode_images(&response.images)
        })
    }
}

/// The webui delivers images as base64-encoded PNG payloads.
fn decode_images(images: &[String]) -> Result<Vec<Vec<u8>>> {
    images
        .iter()
        .map(|b64| BASE64.decode(b64).context("decoding image payload"))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_base64_image_payloads() {
        let response: Txt2ImgResponse =
            serde_json::from_str(r#"{"images": ["aGVsbG8=", "d29ybGQ="]}"#).unwrap();

        let images = decode_images(&response.images).unwrap();
        assert_eq!(images, vec![b"hello".to_vec(), b"world".to_vec()]);
    }

    #[test]
    fn invalid_payload_is_an_error() {
        assert!(decode_images(&["not base64!".to_string()]).is_err());
    }
}
