use std::time::Duration;

/// 尾緣 (trailing-edge) 去抖動，時間由呼叫端傳入
///
/// 每次 `trigger` 都會把截止時間往後推 `wait`；只有在安靜超過 `wait`
/// 之後呼叫 `fire_if_due` 才會回傳 true，而且只回傳一次。
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.wait);
    }

    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
