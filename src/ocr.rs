use anyhow::Result;
use image::DynamicImage;

#[derive(Debug, Clone, PartialEq)]
pub struct BBoxPx {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub boxes: Vec<BBoxPx>,
}

impl OcrOutput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            boxes: Vec::new(),
        }
    }
}

pub trait OcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrOutput>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for &E {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrOutput> {
        (**self).recognize(image)
    }
}
