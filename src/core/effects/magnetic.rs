use super::{Effect, EffectContext};
use crate::config::MagneticConfig;
use crate::domain::document::NodeId;
use crate::domain::model::Tween;

const SETTLE_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Magnet {
    element: NodeId,
    current: (f64, f64),
    target: (f64, f64),
}

/// 游標靠近時元素被「吸」向游標，每幀以 `ease` 比例逼近目標位移
#[derive(Debug, Clone)]
pub struct MagneticEffect {
    strength: f64,
    ease: f64,
    radius: f64,
    magnets: Vec<Magnet>,
}

impl MagneticEffect {
    pub fn new(config: &MagneticConfig) -> Self {
        Self {
            strength: config.strength,
            ease: config.ease,
            radius: config.radius,
            magnets: Vec::new(),
        }
    }

    pub fn offset_of(&self, element: NodeId) -> Option<(f64, f64)> {
        self.magnets
            .iter()
            .find(|magnet| magnet.element == element)
            .map(|magnet| magnet.current)
    }
}

impl Effect for MagneticEffect {
    fn name(&self) -> &'static str {
        "magnetic"
    }

    fn attach(&mut self, element: NodeId, ctx: &mut EffectContext<'_>) {
        ctx.document.set_style(element, "position", "relative");
        ctx.document.set_style(element, "cursor", "pointer");
        self.magnets.push(Magnet {
            element,
            current: (0.0, 0.0),
            target: (0.0, 0.0),
        });
    }

    fn on_pointer_move(&mut self, x: f64, y: f64, ctx: &mut EffectContext<'_>) {
        for magnet in &mut self.magnets {
            let Some(rect) = ctx.document.rect(magnet.element) else {
                continue;
            };
            let (cx, cy) = rect.center();
            let (dx, dy) = (x - cx, y - cy);
            magnet.target = if dx.hypot(dy) < self.radius {
                (dx * self.strength, dy * self.strength)
            } else {
                (0.0, 0.0)
            };
        }
    }

    fn on_pointer_leave(&mut self, target: NodeId, _ctx: &mut EffectContext<'_>) {
        if let Some(magnet) = self.magnets.iter_mut().find(|m| m.element == target) {
            magnet.target = (0.0, 0.0);
        }
    }

    fn on_frame(&mut self, ctx: &mut EffectContext<'_>) {
        for magnet in &mut self.magnets {
            let (tx, ty) = magnet.target;
            let (cx, cy) = magnet.current;
            if (tx - cx).abs() < SETTLE_EPSILON && (ty - cy).abs() < SETTLE_EPSILON {
                continue;
            }
            magnet.current = (cx + (tx - cx) * self.ease, cy + (ty - cy) * self.ease);
            ctx.play(
                "magnetic",
                magnet.element,
                Tween::set()
                    .prop("x", magnet.current.0)
                    .prop("y", magnet.current.1),
            );
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
    fn test_pull_inside_radius_and_release() {
        let mut document = Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body")
                    .child(ElementSpec::new("a").class("btn").rect(100.0, 100.0, 100.0, 40.0)),
            ),
        );
        let btn = document.elements_with_class("btn")[0];
        let mut recorder = Recorder::default();
        let mut effect = MagneticEffect::new(&MagneticConfig::default());
        let mut ctx = EffectContext {
            document: &mut document,
            animator: &mut recorder,
            viewport: Viewport::default(),
            now: Duration::ZERO,
        };
        effect.attach(btn, &mut ctx);

        // 中心在 (150, 120)，游標在右方 50px
        effect.on_pointer_move(200.0, 120.0, &mut ctx);
        effect.on_frame(&mut ctx);
        let (x, y) = effect.offset_of(btn).unwrap();
        assert!((x - 4.5).abs() < 1e-9, "x = {}", x);
        assert_eq!(y, 0.0);

        // 超出半徑後往回收
        effect.on_pointer_move(400.0, 400.0, &mut ctx);
        for _ in 0..60 {
            effect.on_frame(&mut ctx);
        }
        let (x, _) = effect.offset_of(btn).unwrap();
        assert!(x.abs() < 0.05);
        drop(ctx);
        assert!(recorder.requests.iter().all(|r| r.effect == "magnetic"));
    }

    #[test]
    fn test_attach_keeps_existing_style() {
        let mut document = Document::from_spec(
            ElementSpec::new("html").child(
                ElementSpec::new("body").child(
                    ElementSpec::new("a")
                        .class("btn")
                        .attr("style", "color: red; transition: transform 0.3s"),
                ),
            ),
        );
        let btn = document.elements_with_class("btn")[0];
        let mut recorder = Recorder::default();
        let mut effect = MagneticEffect::new(&MagneticConfig::default());
        let mut ctx = EffectContext {
            document: &mut document,
            animator: &mut recorder,
            viewport: Viewport::default(),
            now: Duration::ZERO,
        };
        effect.attach(btn, &mut ctx);

        assert_eq!(
            document.attribute(btn, "style"),
            Some("color: red; transition: transform 0.3s; position: relative; cursor: pointer")
        );
    }
}
