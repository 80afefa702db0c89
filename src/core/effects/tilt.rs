use super::{Effect, EffectContext};
use crate::domain::document::NodeId;
use crate::domain::model::Tween;

/// 依游標在元素上的位置做 3D 傾斜，離開時歸零
#[derive(Debug, Clone)]
pub struct TiltEffect {
    max_angle: f64,
    elements: Vec<NodeId>,
    tilted: Vec<NodeId>,
}

impl TiltEffect {
    pub fn new(max_angle: f64) -> Self {
        Self {
            max_angle,
            elements: Vec::new(),
            tilted: Vec::new(),
        }
    }

    /// (rotationX, rotationY)，游標在中心時為 0，在邊緣時為 ±max_angle
    pub fn angles(&self, center: (f64, f64), half_size: (f64, f64), x: f64, y: f64) -> (f64, f64) {
        let nx = if half_size.0 > 0.0 { (x - center.0) / half_size.0 } else { 0.0 };
        let ny = if half_size.1 > 0.0 { (y - center.1) / half_size.1 } else { 0.0 };
        (
            -ny.clamp(-1.0, 1.0) * self.max_angle,
            nx.clamp(-1.0, 1.0) * self.max_angle,
        )
    }
}

impl Effect for TiltEffect {
    fn name(&self) -> &'static str {
        "tilt"
    }

    fn attach(&mut self, element: NodeId, _ctx: &mut EffectContext<'_>) {
        self.elements.push(element);
    }

    fn on_pointer_move(&mut self, x: f64, y: f64, ctx: &mut EffectContext<'_>) {
        for &element in &self.elements {
            let Some(rect) = ctx.document.rect(element) else {
                continue;
            };
            if rect.contains_point(x, y) {
                let (rx, ry) = self.angles(rect.center(), (rect.width / 2.0, rect.height / 2.0), x, y);
                ctx.play(
                    "tilt",
                    element,
                    Tween::to(0.3, "power2.out")
                        .prop("rotationX", rx)
                        .prop("rotationY", ry),
                );
                if !self.tilted.contains(&element) {
                    self.tilted.push(element);
                }
            } else if let Some(position) = self.tilted.iter().position(|&e| e == element) {
                self.tilted.swap_remove(position);
                ctx.play(
                    "tilt",
                    element,
                    Tween::to(0.5, "power2.out")
                        .prop("rotationX", 0.0)
                        .prop("rotationY", 0.0),
                );
            }
        }
    }
}
