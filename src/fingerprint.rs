use std::fmt;

use image::{DynamicImage, GrayImage, Luma};

use crate::cache::KeyStore;
use crate::error::{Error, Result};

pub const MAX_HASH_SIZE: u32 = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    bits: u32,
    words: Box<[u64]>,
}

impl Fingerprint {
    pub fn zeros(bits: u32) -> Self {
        let words = vec![0u64; bits.div_ceil(64) as usize].into_boxed_slice();
        Self { bits, words }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    fn set(&mut self, bit: u32) {
        self.words[(bit / 64) as usize] |= 1u64 << (bit % 64);
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.words.iter() {
            write!(f, "{:016x}", word)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    pub hash_size: u32,
    pub max_distance: u32,
    pub crop: bool,
    pub foreground_threshold: u8,
    pub crop_padding: u32,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            hash_size: 8,
            max_distance: 5,
            crop: true,
            foreground_threshold: (0.65 * 255.0) as u8,
            crop_padding: 2,
        }
    }
}

impl FingerprintConfig {
    pub fn compute(&self, image: &DynamicImage) -> Fingerprint {
        if self.crop {
            fingerprint_cropped(image, self)
        } else {
            fingerprint(image, self.hash_size)
        }
    }
}

pub fn fingerprint(image: &DynamicImage, hash_size: u32) -> Fingerprint {
    difference_hash(&to_luma(image), hash_size)
}

pub fn fingerprint_cropped(image: &DynamicImage, config: &FingerprintConfig) -> Fingerprint {
    let hash_size = config.hash_size.clamp(1, MAX_HASH_SIZE);
    let binary = binarize(&to_luma(image), config.foreground_threshold);
    let Some((left, top, right, bottom)) = foreground_bounds(&binary) else {
        return Fingerprint::zeros(hash_size * hash_size);
    };

    let (width, height) = binary.dimensions();
    let pad = config.crop_padding;
    let x = left.saturating_sub(pad);
    let y = top.saturating_sub(pad);
    let w = right.saturating_add(pad).min(width - 1) - x + 1;
    let h = bottom.saturating_add(pad).min(height - 1) - y + 1;
    let cropped = image::imageops::crop_imm(&binary, x, y, w, h).to_image();
    difference_hash(&cropped, hash_size)
}

pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32> {
    if a.bits != b.bits {
        return Err(Error::IncomparableFingerprints {
            left: a.bits,
            right: b.bits,
        });
    }
    Ok(a.words
        .iter()
        .zip(b.words.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum())
}

pub fn find_nearest<S>(
    target: &Fingerprint,
    store: &S,
    max_distance: u32,
) -> Result<Option<Fingerprint>>
where
    S: KeyStore<Fingerprint>,
{
    let mut best: Option<(u32, &Fingerprint)> = None;
    for key in store.stored_keys() {
        let distance = hamming_distance(target, key)?;
        if distance == 0 {
            return Ok(Some(key.clone()));
        }
        if distance <= max_distance && best.is_none_or(|(held, _)| distance < held) {
            best = Some((distance, key));
        }
    }
    Ok(best.map(|(_, key)| key.clone()))
}

fn difference_hash(gray: &GrayImage, hash_size: u32) -> Fingerprint {
    let hash_size = hash_size.clamp(1, MAX_HASH_SIZE);
    let mut hash = Fingerprint::zeros(hash_size * hash_size);
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return hash;
    }

    let resized = image::imageops::resize(
        gray,
        hash_size + 1,
        hash_size,
        image::imageops::FilterType::Triangle,
    );
    let mut bit = 0u32;
    for row in 0..hash_size {
        for col in 0..hash_size {
            let left = resized.get_pixel(col, row)[0];
            let right = resized.get_pixel(col + 1, row)[0];
            if left > right {
                hash.set(bit);
            }
            bit += 1;
        }
    }
    hash
}

fn to_luma(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut luma = GrayImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let r = r as f32 * alpha + 255.0 * (1.0 - alpha);
        let g = g as f32 * alpha + 255.0 * (1.0 - alpha);
        let b = b as f32 * alpha + 255.0 * (1.0 - alpha);
        let value = (0.299 * r + 0.587 * g + 0.114 * b).round() as u8;
        luma.put_pixel(x, y, Luma([value]));
    }
    luma
}

fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 255 } else { 0 };
    }
    output
}

fn foreground_bounds(binary: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in binary.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
        });
    }
    bounds
}
