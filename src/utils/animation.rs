use std::time::Duration;

/// 約 60fps 的單幀時間 (ms)
pub const FRAME_MS: f64 = 16.0;

/// 數字遞增動畫，每幀加 `target / (duration / 16)`，最後一幀精準停在目標值
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: f64,
    increment: f64,
    current: f64,
    finished: bool,
}

impl CounterAnimation {
    pub fn new(target: f64, duration: Duration) -> Self {
        let frames = (duration.as_millis() as f64 / FRAME_MS).max(1.0);
        Self {
            target,
            increment: target / frames,
            current: 0.0,
            finished: target <= 0.0,
        }
    }

    /// 前進一幀並回傳要顯示的文字
    pub fn step(&mut self) -> String {
        if self.finished {
            return format_number(self.target);
        }
        self.current += self.increment;
        if self.current < self.target {
            format_number(self.current.ceil())
        } else {
            self.finished = true;
            format_number(self.target)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// 首頁職稱的打字效果排程
#[derive(Debug, Clone)]
pub struct TypingSchedule {
    pub char_interval: Duration,
    pub role_stagger: Duration,
}

impl Default for TypingSchedule {
    fn default() -> Self {
        Self {
            char_interval: Duration::from_millis(100),
            role_stagger: Duration::from_millis(4000),
        }
    }
}

impl TypingSchedule {
    /// 第 `role_index` 個職稱在 `elapsed` 時應顯示的前綴
    pub fn visible_prefix<'a>(&self, text: &'a str, role_index: usize, elapsed: Duration) -> &'a str {
        let start = self.role_stagger * role_index as u32;
        if elapsed < start {
            return "";
        }
        let interval = self.char_interval.as_millis().max(1);
        // 開始時立即打出第一個字
        let typed = ((elapsed - start).as_millis() / interval) as usize + 1;
        match text.char_indices().nth(typed) {
            Some((byte_index, _)) => &text[..byte_index],
            None => text,
        }
    }
}
