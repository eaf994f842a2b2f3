use std::sync::Arc;

use crate::foundation::{
    core::{Rect, Rgba8},
    error::{FlipError, FlipResult},
};

/// Stable identity of a surface, used to detect flips to what is already shown.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SurfaceTag(pub i64);

/// Rendered pixels backing a surface.
#[derive(Clone, PartialEq)]
pub struct SurfaceImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl SurfaceImage {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> FlipResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FlipError::validation("surface image size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(FlipError::validation(format!(
                "surface image byte length {} does not match {width}x{height}x4",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn solid(width: u32, height: u32, color: Rgba8) -> Self {
        let px = color.to_premul();
        Self {
            width,
            height,
            rgba8_premul: Arc::new(px.repeat(width as usize * height as usize)),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Premultiplied pixel at integer coordinates, transparent outside.
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return [0, 0, 0, 0];
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let d = &self.rgba8_premul;
        [d[idx], d[idx + 1], d[idx + 2], d[idx + 3]]
    }
}

impl std::fmt::Debug for SurfaceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba8_premul.len())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Attachment {
    #[default]
    Detached,
    Attached,
}

/// Drawing hint for the canvas: `Cached` asks the backend to keep the surface
/// in an accelerated layer while a flip is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LayerHint {
    #[default]
    None,
    Cached,
}

/// Opaque, externally rendered content shown by a flip view.
#[derive(Clone, Debug)]
pub struct Surface {
    tag: SurfaceTag,
    image: SurfaceImage,
    attachment: Attachment,
    layer_hint: LayerHint,
}

impl Surface {
    pub fn new(tag: SurfaceTag, image: SurfaceImage) -> Self {
        Self {
            tag,
            image,
            attachment: Attachment::Detached,
            layer_hint: LayerHint::None,
        }
    }

    pub fn tag(&self) -> SurfaceTag {
        self.tag
    }

    pub fn image(&self) -> &SurfaceImage {
        &self.image
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    pub fn is_attached(&self) -> bool {
        self.attachment == Attachment::Attached
    }

    pub fn layer_hint(&self) -> LayerHint {
        self.layer_hint
    }

    pub fn same_identity(&self, other: &Self) -> bool {
        self.tag == other.tag
    }

    pub(crate) fn attach(&mut self) {
        self.attachment = Attachment::Attached;
    }

    pub(crate) fn detach(&mut self) {
        self.attachment = Attachment::Detached;
        self.layer_hint = LayerHint::None;
    }

    pub(crate) fn set_layer_hint(&mut self, hint: LayerHint) {
        self.layer_hint = hint;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_rejects_wrong_length() {
        assert!(SurfaceImage::new(2, 2, vec![0; 15]).is_err());
        assert!(SurfaceImage::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn pixel_lookup_is_transparent_outside() {
        let img = SurfaceImage::solid(2, 1, Rgba8::new(255, 0, 0, 255));
        assert_eq!(img.pixel(1, 0), [255, 0, 0, 255]);
        assert_eq!(img.pixel(2, 0), [0, 0, 0, 0]);
        assert_eq!(img.pixel(-1, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn detach_clears_layer_hint() {
        let mut s = Surface::new(SurfaceTag(3), SurfaceImage::solid(1, 1, Rgba8::WHITE));
        assert!(!s.is_attached());
        s.attach();
        s.set_layer_hint(LayerHint::Cached);
        assert!(s.is_attached());
        s.detach();
        assert_eq!(s.attachment(), Attachment::Detached);
        assert_eq!(s.layer_hint(), LayerHint::None);
    }
}
