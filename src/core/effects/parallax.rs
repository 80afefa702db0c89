use super::{Effect, EffectContext};
use crate::domain::document::NodeId;
use crate::domain::model::{Rect, Tween};

const SLOW_DISTANCE: f64 = 100.0;
const FAST_DISTANCE: f64 = 200.0;

#[derive(Debug, Clone, Copy)]
struct Layer {
    element: NodeId,
    distance: f64,
    offset: f64,
}

/// 隨捲動位移的視差圖層；`parallax-fast` 的位移是 `parallax-slow` 的兩倍
#[derive(Debug, Clone)]
pub struct ParallaxEffect {
    slow_distance: f64,
    fast_distance: f64,
    layers: Vec<Layer>,
}

impl Default for ParallaxEffect {
    fn default() -> Self {
        Self::new(SLOW_DISTANCE, FAST_DISTANCE)
    }
}

impl ParallaxEffect {
    pub fn new(slow_distance: f64, fast_distance: f64) -> Self {
        Self {
            slow_distance,
            fast_distance,
            layers: Vec::new(),
        }
    }

    pub fn offset_of(&self, element: NodeId) -> Option<f64> {
        self.layers
            .iter()
            .find(|layer| layer.element == element)
            .map(|layer| layer.offset)
    }
}

/// 從元素頂端碰到畫面中線 (0) 到底端離開中線 (1) 的進度
pub fn scrub_progress(rect: &Rect, scroll_y: f64, viewport_height: f64) -> f64 {
    if rect.height <= 0.0 {
        return 0.0;
    }
    let center_line = scroll_y + viewport_height / 2.0;
    ((center_line - rect.top) / rect.height).clamp(0.0, 1.0)
}

impl Effect for ParallaxEffect {
    fn name(&self) -> &'static str {
        "parallax"
    }

    fn attach(&mut self, element: NodeId, ctx: &mut EffectContext<'_>) {
        let distance = if ctx.document.has_class(element, "parallax-fast") {
            self.fast_distance
        } else {
            self.slow_distance
        };
        self.layers.push(Layer {
            element,
            distance,
            offset: 0.0,
        });
    }

    fn on_scroll(&mut self, ctx: &mut EffectContext<'_>) {
        for layer in &mut self.layers {
            let Some(rect) = ctx.document.rect(layer.element) else {
                continue;
            };
            let progress = scrub_progress(&rect, ctx.viewport.scroll_y, ctx.viewport.height);
            let offset = -layer.distance * progress;
            if (offset - layer.offset).abs() < f64::EPSILON {
                continue;
            }
            layer.offset = offset;
            ctx.play("parallax", layer.element, Tween::set().prop("y", offset));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::effects::testing::Recorder;
    use crate::domain::document::{Document, ElementSpec};
    use crate::utils::viewport::Viewport;
    use std::time::Duration;

    #[test]
    fn test_scrub_progress() {
        let rect = Rect {
            top: 1000.0,
            left: 0.0,
            width: 100.0,
            height: 400.0,
        };
        assert_eq!(scrub_progress(&rect, 0.0, 800.0), 0.0);
        assert_eq!(scrub_progress(&rect, 800.0, 800.0), 0.5);
        assert_eq!(scrub_progress(&rect, 5000.0, 800.0), 1.0);
    }

    #[test]
    fn test_fast_layer_moves_twice_as_far() {
        let mut document = Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body")
                    .child(ElementSpec::new("div").class("parallax-slow").rect(1000.0, 0.0, 100.0, 400.0))
                    .child(ElementSpec::new("div").class("parallax-fast").rect(1000.0, 0.0, 100.0, 400.0)),
            ),
        );
        let slow = document.elements_with_class("parallax-slow")[0];
        let fast = document.elements_with_class("parallax-fast")[0];
        let mut recorder = Recorder::default();
        let mut effect = ParallaxEffect::default();
        let mut ctx = EffectContext {
            document: &mut document,
            animator: &mut recorder,
            viewport: Viewport {
                scroll_y: 800.0,
                width: 1000.0,
                height: 800.0,
            },
            now: Duration::ZERO,
        };
        effect.attach(slow, &mut ctx);
        effect.attach(fast, &mut ctx);
        effect.on_scroll(&mut ctx);
        // 位置沒變時不重複送出
        effect.on_scroll(&mut ctx);
        drop(ctx);

        assert_eq!(effect.offset_of(slow), Some(-50.0));
        assert_eq!(effect.offset_of(fast), Some(-100.0));
        assert_eq!(recorder.requests.len(), 2);
    }
}
