use super::{attached_ancestor, Effect, EffectContext};
use crate::domain::document::NodeId;
use crate::domain::model::Tween;
use std::time::Duration;

const REVEAL_DURATION: Duration = Duration::from_millis(800);

/// 點擊卡片時從點擊位置以 clip-path 圓形展開；動畫進行中忽略新的點擊
#[derive(Debug, Clone, Default)]
pub struct FluidRevealEffect {
    cards: Vec<NodeId>,
    animating: Vec<(NodeId, Duration)>,
}

impl FluidRevealEffect {
    pub fn is_animating(&self, card: NodeId, now: Duration) -> bool {
        self.animating
            .iter()
            .any(|&(node, until)| node == card && until > now)
    }
}

impl Effect for FluidRevealEffect {
    fn name(&self) -> &'static str {
        "fluid-reveal"
    }

    fn attach(&mut self, element: NodeId, _ctx: &mut EffectContext<'_>) {
        self.cards.push(element);
    }

    fn on_click(&mut self, target: NodeId, x: f64, y: f64, ctx: &mut EffectContext<'_>) {
        let Some(card) = attached_ancestor(ctx.document, &self.cards, target) else {
            return;
        };
        if self.is_animating(card, ctx.now) {
            return;
        }
        let Some(rect) = ctx.document.rect(card) else {
            return;
        };
        let (local_x, local_y) = (x - rect.left, y - rect.top);
        let seconds = REVEAL_DURATION.as_secs_f64();

        ctx.play(
            "fluid-reveal",
            card,
            Tween::to(seconds, "power2.out")
                .prop("clipPathFrom", format!("circle(0% at {local_x}px {local_y}px)"))
                .prop("clipPath", format!("circle(150% at {local_x}px {local_y}px)")),
        );
        ctx.play(
            "fluid-reveal",
            card,
            Tween::to(seconds, "power2.out")
                .prop("scaleFrom", 0.95)
                .prop("scale", 1.0),
        );

        self.animating.retain(|&(node, _)| node != card);
        self.animating.push((card, ctx.now + REVEAL_DURATION));
    }

    fn on_frame(&mut self, ctx: &mut EffectContext<'_>) {
        let now = ctx.now;
        self.animating.retain(|&(_, until)| until > now);
    }
}
