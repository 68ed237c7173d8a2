/// Tracks the transcript viewport. The tracker follows the latest turn until
/// the user scrolls away, and re-engages when they return to the bottom.
#[derive(Debug)]
pub struct ScrollState {
    offset: u16,
    follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Snap back to the latest turn; called when the log grows.
    pub fn follow_latest(&mut self) {
        self.follow = true;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow = false;
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        if !self.follow {
            self.offset = self.offset.saturating_add(lines);
        }
    }

    /// Offset to draw with this frame. While following, the offset is pinned
    /// to the bottom; otherwise it is clamped, and reaching the bottom
    /// re-engages follow.
    pub fn effective_offset(&mut self, total_lines: u16, viewport_height: u16) -> u16 {
        let max = total_lines.saturating_sub(viewport_height);
        if self.follow {
            self.offset = max;
        } else {
            self.offset = self.offset.min(max);
            if self.offset >= max {
                self.follow = true;
            }
        }
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_the_bottom_as_lines_grow() {
        let mut scroll = ScrollState::new();
        assert_eq!(scroll.effective_offset(10, 8), 2);
        assert_eq!(scroll.effective_offset(20, 8), 12);
        assert!(scroll.is_following());
    }

    #[test]
    fn manual_scroll_releases_follow() {
        let mut scroll = ScrollState::new();
        scroll.effective_offset(20, 8);
        scroll.scroll_up(3);
        assert!(!scroll.is_following());
        assert_eq!(scroll.effective_offset(20, 8), 9);
        // New lines no longer drag the viewport down.
        assert_eq!(scroll.effective_offset(30, 8), 9);
    }

    #[test]
    fn scrolling_back_to_the_bottom_reengages_follow() {
        let mut scroll = ScrollState::new();
        scroll.effective_offset(20, 8);
        scroll.scroll_up(2);
        scroll.scroll_down(5);
        assert_eq!(scroll.effective_offset(20, 8), 12);
        assert!(scroll.is_following());
    }

    #[test]
    fn follow_latest_snaps_after_append() {
        let mut scroll = ScrollState::new();
        scroll.effective_offset(20, 8);
        scroll.scroll_up(5);
        scroll.follow_latest();
        assert_eq!(scroll.effective_offset(22, 8), 14);
    }

    #[test]
    fn short_transcripts_never_scroll() {
        let mut scroll = ScrollState::new();
        assert_eq!(scroll.effective_offset(3, 8), 0);
        scroll.scroll_up(2);
        assert_eq!(scroll.effective_offset(3, 8), 0);
    }

    #[test]
    fn scroll_down_is_inert_while_following() {
        let mut scroll = ScrollState::new();
        scroll.effective_offset(20, 8);
        scroll.scroll_down(4);
        assert_eq!(scroll.effective_offset(20, 8), 12);
    }
}
