//! Keeps the newest message in view.
//!
//! The view reports what it laid out each frame through [`Autoscroll::observe`].
//! A change in message count or busy state moves the target to the bottom;
//! the first observation snaps there, later ones are approached a step per
//! tick. Manual scrolling holds until the next change.

#[derive(Debug, Clone, Default)]
pub struct Autoscroll {
    offset: u16,
    target: u16,
    max_offset: u16,
    /// (message count, busy) at the last observation; `None` before first mount
    seen: Option<(usize, bool)>,
}

impl Autoscroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn observe(&mut self, message_count: usize, busy: bool, total_lines: u16, viewport: u16) {
        self.max_offset = total_lines.saturating_sub(viewport);
        let state = (message_count, busy);

        match self.seen {
            None => {
                self.offset = self.max_offset;
                self.target = self.max_offset;
            }
            Some(prev) if prev != state => {
                self.target = self.max_offset;
            }
            Some(_) => {}
        }
        self.seen = Some(state);

        self.offset = self.offset.min(self.max_offset);
        self.target = self.target.min(self.max_offset);
    }

    /// Advance the animation: half the remaining distance, at least one line
    pub fn tick(&mut self) {
        if self.offset < self.target {
            let step = (self.target - self.offset).div_ceil(2);
            self.offset += step;
        } else if self.offset > self.target {
            let step = (self.offset - self.target).div_ceil(2);
            self.offset -= step;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
        self.target = self.offset;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset);
        self.target = self.offset;
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.target = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset;
        self.target = self.max_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_mount_snaps_to_bottom() {
        let mut scroll = Autoscroll::new();
        scroll.observe(10, false, 50, 20);
        assert_eq!(scroll.offset(), 30);
        assert_eq!(scroll.offset, scroll.target);
    }

    #[test]
    fn test_first_mount_empty_stays_at_top() {
        let mut scroll = Autoscroll::new();
        scroll.observe(0, false, 3, 20);
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_later_change_animates() {
        let mut scroll = Autoscroll::new();
        scroll.observe(2, false, 10, 20);
        assert_eq!(scroll.offset(), 0);

        scroll.observe(3, true, 36, 20);
        assert_eq!(scroll.offset(), 0);
        assert_ne!(scroll.offset, scroll.target);

        scroll.tick();
        assert_eq!(scroll.offset(), 8);
        scroll.tick();
        assert_eq!(scroll.offset(), 12);
        for _ in 0..10 {
            scroll.tick();
        }
        assert_eq!(scroll.offset(), 16);
        assert_eq!(scroll.offset, scroll.target);
    }

    #[test]
    fn test_busy_flip_alone_retargets() {
        let mut scroll = Autoscroll::new();
        scroll.observe(1, false, 30, 20);
        scroll.scroll_to_top();

        scroll.observe(1, true, 32, 20);
        assert_ne!(scroll.offset, scroll.target);
    }

    #[test]
    fn test_manual_scroll_holds_until_change() {
        let mut scroll = Autoscroll::new();
        scroll.observe(4, false, 60, 20);
        scroll.scroll_up(15);
        assert_eq!(scroll.offset(), 25);

        scroll.observe(4, false, 60, 20);
        scroll.tick();
        assert_eq!(scroll.offset(), 25);

        scroll.scroll_down(100);
        assert_eq!(scroll.offset(), 40);
    }

    #[test]
    fn test_shrinking_content_clamps() {
        let mut scroll = Autoscroll::new();
        scroll.observe(4, false, 60, 20);
        scroll.observe(4, false, 30, 20);
        assert_eq!(scroll.offset(), 10);
    }
}
