use crate::domain::model::Rect;
use serde::{Deserialize, Serialize};

/// 目前可視區域 (文件座標)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect {
            top: self.scroll_y,
            left: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// IntersectionObserver 的 rootMargin，只處理上下方向，負值代表往內縮
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: f64,
    pub bottom: f64,
}

/// 元素是否完整落在可視區域內
pub fn is_in_viewport(rect: &Rect, viewport: &Viewport) -> bool {
    let top = rect.top - viewport.scroll_y;
    let bottom = top + rect.height;
    top >= 0.0
        && rect.left >= 0.0
        && bottom <= viewport.height
        && rect.right() <= viewport.width
}

pub fn intersection_ratio(rect: &Rect, viewport: &Viewport, margin: RootMargin) -> f64 {
    let root_top = viewport.scroll_y - margin.top;
    let root_bottom = viewport.scroll_y + viewport.height + margin.bottom;
    if root_bottom <= root_top {
        return 0.0;
    }

    let overlap_top = rect.top.max(root_top);
    let overlap_bottom = rect.bottom().min(root_bottom);
    let overlap_left = rect.left.max(0.0);
    let overlap_right = rect.right().min(viewport.width);

    if overlap_bottom < overlap_top || overlap_right < overlap_left {
        return 0.0;
    }

    let area = rect.width * rect.height;
    if area <= 0.0 {
        // 零面積元素只要落在 root 內就視為完全可見
        return 1.0;
    }
    ((overlap_bottom - overlap_top) * (overlap_right - overlap_left) / area).clamp(0.0, 1.0)
}
