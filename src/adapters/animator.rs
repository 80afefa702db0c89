use crate::domain::model::AnimationRequest;
use crate::domain::ports::Animator;
use std::sync::{Arc, Mutex};

/// 把動畫請求記錄下來；clone 後共用同一份紀錄，CLI 與測試用它檢查頁面送出了什麼
#[derive(Debug, Clone, Default)]
pub struct RecordingAnimator {
    requests: Arc<Mutex<Vec<AnimationRequest>>>,
}

impl RecordingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<AnimationRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count_for(&self, effect: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.effect == effect)
            .count()
    }

    pub fn len(&self) -> usize {
        self.requests().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Animator for RecordingAnimator {
    fn play(&mut self, request: AnimationRequest) {
        tracing::trace!("🎞️ {} -> node {}", request.effect, request.target.0);
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
    }
}

/// 丟棄所有請求
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnimator;

impl Animator for NullAnimator {
    fn play(&mut self, _request: AnimationRequest) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::NodeId;
    use crate::domain::model::Tween;

    #[test]
    fn test_recording_animator_shares_log() {
        let recorder = RecordingAnimator::new();
        let mut handle = recorder.clone();
        handle.play(AnimationRequest {
            effect: "ripple".to_string(),
            target: NodeId(3),
            tween: Tween::set().prop("scale", 2.0),
        });
        handle.play(AnimationRequest {
            effect: "magnetic".to_string(),
            target: NodeId(4),
            tween: Tween::set().prop("x", 1.0),
        });

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.count_for("ripple"), 1);
        assert_eq!(recorder.requests()[1].target, NodeId(4));
    }
}
