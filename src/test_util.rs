use image::{DynamicImage, Rgb, RgbImage};

pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    // SAFETY: every test touching HOME holds HOME_MUTEX.
    unsafe { std::env::set_var("HOME", dir.path()) };
    let result = func(dir.path());
    if let Some(old) = old_home {
        unsafe { std::env::set_var("HOME", old) };
    } else {
        unsafe { std::env::remove_var("HOME") };
    }
    result
}

pub(crate) fn solid_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
}

pub(crate) fn split_image(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255; 3])
        } else {
            Rgb([0; 3])
        }
    });
    DynamicImage::ImageRgb8(image)
}

pub(crate) fn block_image(
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    block_width: u32,
    block_height: u32,
) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |px, py| {
        let inside = px >= x && px < x + block_width && py >= y && py < y + block_height;
        if inside { Rgb([255; 3]) } else { Rgb([0; 3]) }
    });
    DynamicImage::ImageRgb8(image)
}
