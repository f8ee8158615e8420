use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// 4x4 opaque red PNG, base64 encoded.
pub fn tiny_png_base64() -> String {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 30, 30, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    STANDARD.encode(bytes)
}
