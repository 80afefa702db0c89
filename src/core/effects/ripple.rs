use super::{attached_ancestor, Effect, EffectContext};
use crate::domain::document::NodeId;
use crate::domain::model::Tween;
use std::time::Duration;

const RIPPLE_DURATION: Duration = Duration::from_millis(600);

/// 點擊互動元素時從點擊位置擴散的波紋
#[derive(Debug, Clone, Default)]
pub struct RippleEffect {
    elements: Vec<NodeId>,
    live: Vec<(Duration, NodeId)>,
}

impl RippleEffect {
    pub fn live_ripples(&self) -> usize {
        self.live.len()
    }
}

impl Effect for RippleEffect {
    fn name(&self) -> &'static str {
        "ripple"
    }

    fn attach(&mut self, element: NodeId, _ctx: &mut EffectContext<'_>) {
        self.elements.push(element);
    }

    fn on_click(&mut self, target: NodeId, x: f64, y: f64, ctx: &mut EffectContext<'_>) {
        let Some(host) = attached_ancestor(ctx.document, &self.elements, target) else {
            return;
        };
        let Some(rect) = ctx.document.rect(host) else {
            return;
        };
        let size = rect.width.max(rect.height);
        let left = x - rect.left - size / 2.0;
        let top = y - rect.top - size / 2.0;

        let Some(ripple) = ctx.document.append_child(host, "span") else {
            return;
        };
        ctx.document.add_class(ripple, "ripple");
        ctx.document.set_attribute(
            ripple,
            "style",
            &format!(
                "position: absolute; width: {size}px; height: {size}px; left: {left}px; top: {top}px"
            ),
        );
        ctx.play(
            "ripple",
            ripple,
            Tween::to(RIPPLE_DURATION.as_secs_f64(), "power2.out")
                .prop("scale", 2.0)
                .prop("opacity", 0.0),
        );
        self.live.push((ctx.now + RIPPLE_DURATION, ripple));
    }

    fn on_frame(&mut self, ctx: &mut EffectContext<'_>) {
        // 動畫結束後移除波紋元素
        let now = ctx.now;
        self.live.retain(|&(expires, ripple)| {
            if expires <= now {
                ctx.document.remove(ripple);
                false
            } else {
                true
            }
        });
    }
}
