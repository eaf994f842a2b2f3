use crate::{
    camera::Projective,
    foundation::core::{Rect, Rgba8},
    render::FlipCanvas,
    surface::{LayerHint, SurfaceTag},
};

/// A draw call with the clip and transform that were current when it was issued.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Surface {
        tag: SurfaceTag,
        layer_hint: LayerHint,
        clip: Rect,
        transform: Projective,
    },
    RoundRect {
        rect: Rect,
        radius: f64,
        color: Rgba8,
        clip: Rect,
        transform: Projective,
    },
}

impl DrawOp {
    pub fn clip(&self) -> Rect {
        match self {
            Self::Surface { clip, .. } | Self::RoundRect { clip, .. } => *clip,
        }
    }

    pub fn transform(&self) -> &Projective {
        match self {
            Self::Surface { transform, .. } | Self::RoundRect { transform, .. } => transform,
        }
    }
}

/// Canvas that records draw calls instead of rasterizing them.
#[derive(Clone, Debug)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    clip: Rect,
    transform: Projective,
    stack: Vec<(Rect, Projective)>,
    max_depth: usize,
}

impl DisplayList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            ops: Vec::new(),
            clip: Rect::new(0.0, 0.0, width, height),
            transform: Projective::IDENTITY,
            stack: Vec::new(),
            max_depth: 0,
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Deepest save nesting seen while recording.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Tags of drawn surfaces, in draw order.
    pub fn surface_tags(&self) -> Vec<SurfaceTag> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Surface { tag, .. } => Some(*tag),
                DrawOp::RoundRect { .. } => None,
            })
            .collect()
    }
}

impl FlipCanvas for DisplayList {
    fn save(&mut self) {
        self.stack.push((self.clip, self.transform));
        self.max_depth = self.max_depth.max(self.stack.len());
    }

    fn restore(&mut self) {
        if let Some((clip, transform)) = self.stack.pop() {
            self.clip = clip;
            self.transform = transform;
        }
    }

    fn clip_rect(&mut self, rect: Rect) {
        let device = self.transform.map_rect_bounds(rect).unwrap_or(Rect::ZERO);
        self.clip = self.clip.intersect(device);
    }

    fn concat(&mut self, transform: &Projective) {
        self.transform = self.transform * *transform;
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) {
        self.ops.push(DrawOp::RoundRect {
            rect,
            radius,
            color,
            clip: self.clip,
            transform: self.transform,
        });
    }

    fn draw_surface(&mut self, surface: &crate::surface::Surface) {
        self.ops.push(DrawOp::Surface {
            tag: surface.tag(),
            layer_hint: surface.layer_hint(),
            clip: self.clip,
            transform: self.transform,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Surface, SurfaceImage};

    #[test]
    fn records_resolved_clip_and_transform() {
        let surface = Surface::new(SurfaceTag(7), SurfaceImage::solid(2, 2, Rgba8::WHITE));
        let mut dl = DisplayList::new(10.0, 10.0);
        dl.save();
        dl.clip_rect(Rect::new(0.0, 0.0, 10.0, 5.0));
        dl.concat(&Projective::from_translation(1.0, 0.0));
        dl.draw_surface(&surface);
        dl.restore();
        dl.fill_round_rect(Rect::new(0.0, 0.0, 1.0, 1.0), 2.0, Rgba8::BLACK);

        assert_eq!(dl.save_depth(), 0);
        assert_eq!(dl.max_depth(), 1);
        assert_eq!(dl.surface_tags(), vec![SurfaceTag(7)]);
        assert_eq!(dl.ops()[0].clip(), Rect::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(dl.ops()[0].transform(), &Projective::from_translation(1.0, 0.0));
        assert_eq!(dl.ops()[1].clip(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(dl.ops()[1].transform(), &Projective::IDENTITY);
    }
}
