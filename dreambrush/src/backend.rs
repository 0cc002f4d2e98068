use std::pin::Pin;

use color_eyre::Result;
use serde::Serialize;

pub mod webui;
pub use webui::WebUi;

/// Fixed sampling parameters for every render.
pub const STEPS: u32 = 60;
pub const CFG_SCALE: u32 = 7;

/// A text-to-image backend returning a batch of PNG byte buffers.
pub trait ImageBackend {
    fn txt2img<'a>(&'a self, req: Txt2ImgRequest) -> ImageBatchFuture<'a>;
}

pub type ImageBatchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Vec<u8>>>> + Send + 'a>>;

/// Field names match the AUTOMATIC1111 webui API.
#[derive(Debug, Clone, Serialize)]
pub struct Txt2ImgRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub steps: u32,
    pub cfg_scale: u32,
    pub batch_size: u32,
}

impl Txt2ImgRequest {
    pub fn new(prompt: String, negative_prompt: String, batch_size: u32) -> Self {
        Self {
            prompt,
            negative_prompt,
            steps: STEPS,
            cfg_scale: CFG_SCALE,
            batch_size,
        }
    }
}

#[cfg(test)]
mod test {
    use expect_test::expect;

    use super::*;

    #[test]
    fn request_serialization() {
        let req = Txt2ImgRequest::new("a cat, wizard robe".into(), "blurry".into(), 2);

        let expect = expect![[
            r#"{"prompt":"a cat, wizard robe","negative_prompt":"blurry","steps":60,"cfg_scale":7,"batch_size":2}"#
        ]];
        expect.assert_eq(&serde_json::to_string(&req).unwrap());
    }
}
