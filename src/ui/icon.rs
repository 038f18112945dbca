use image::{Rgba, RgbaImage};

pub const SIZE: u32 = 32;

const BACKGROUND: Rgba<u8> = Rgba([0xB8, 0x5C, 0x39, 0xFF]);
const WHALE: Rgba<u8> = Rgba([0xFF, 0xF8, 0xF3, 0xFF]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Round terracotta badge with a light container stack, used for the
/// window and the tray.
pub fn render() -> RgbaImage {
    let center = (SIZE as f32 - 1.0) / 2.0;
    let radius = SIZE as f32 / 2.0;

    RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        if dx * dx + dy * dy > radius * radius {
            return CLEAR;
        }
        let in_stack = (8..24).contains(&x) && (12..22).contains(&y) && (x % 5 != 2);
        if in_stack {
            WHALE
        } else {
            BACKGROUND
        }
    })
}

pub fn icon_data() -> egui::IconData {
    let image = render();
    let (width, height) = image.dimensions();
    egui::IconData {
        rgba: image.into_raw(),
        width,
        height,
    }
}
