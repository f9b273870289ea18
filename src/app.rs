use crate::conversation::{Conversation, SubmitOutcome};

pub struct App {
    pub should_quit: bool,
    pub conversation: Conversation,
    pub endpoint: String,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // One-line notice shown in the footer
    pub status: Option<String>,
}

impl App {
    pub fn new(conversation: Conversation, endpoint: &str) -> Self {
        Self {
            should_quit: false,
            conversation,
            endpoint: endpoint.to_string(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_tail: true,
            animation_frame: 0,
            status: None,
        }
    }

    pub fn submit(&mut self) {
        match self.conversation.submit() {
            SubmitOutcome::Sent => {
                self.status = None;
                self.follow_tail = true;
                self.scroll_chat_to_bottom();
            }
            SubmitOutcome::Busy => {
                self.status = Some("Still waiting for the previous answer".to_string());
            }
            SubmitOutcome::Empty => {}
        }
    }

    pub fn clear_conversation(&mut self) {
        if self.conversation.clear() {
            self.chat_scroll = 0;
            self.status = None;
        } else {
            self.status = Some("Can't clear while a request is in flight".to_string());
        }
    }

    /// Called by Tick event: advance the animation and pick up a finished answer
    pub async fn on_tick(&mut self) {
        if self.conversation.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.conversation.poll_response().await && self.follow_tail {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.total_chat_lines().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        if self.chat_scroll == max {
            self.follow_tail = true;
        }
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_height();
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Wrapped line count of the rendered transcript
    fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.conversation.transcript() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in msg.text().lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { (char_count / wrap_width) + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.conversation.is_pending() {
            total_lines = total_lines.saturating_add(2); // "AI:" + "Thinking..."
        }

        total_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatAnswer, ChatBackend};
    use crate::error::ChatResult;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl ChatBackend for Echo {
        async fn send(&self, query: &str) -> ChatResult<ChatAnswer> {
            Ok(ChatAnswer { answer: query.repeat(3), source: None })
        }
    }

    fn app() -> App {
        App::new(Conversation::new(Arc::new(Echo)), "http://127.0.0.1:8000/chat")
    }

    #[tokio::test]
    async fn test_tick_picks_up_answer() {
        let mut app = app();
        app.conversation.set_draft("ab");
        app.submit();

        while app.conversation.is_pending() {
            tokio::task::yield_now().await;
            app.on_tick().await;
        }
        assert_eq!(app.conversation.transcript().len(), 2);
        assert_eq!(app.conversation.transcript()[1].text(), "ababab");
    }

    #[tokio::test]
    async fn test_busy_submit_sets_status() {
        let mut app = app();
        app.conversation.set_draft("one");
        app.submit();
        app.conversation.set_draft("two");
        app.submit();
        assert!(app.status.is_some());
        assert_eq!(app.conversation.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_scroll_follows_long_transcript() {
        let mut app = app();
        app.chat_height = 4;
        app.chat_width = 10;
        for text in ["a long message that wraps", "another one"] {
            app.conversation.set_draft(text);
            app.submit();
            app.conversation.wait_for_response().await;
        }
        app.scroll_chat_to_bottom();
        assert!(app.chat_scroll > 0);

        app.scroll_up(100);
        assert_eq!(app.chat_scroll, 0);
        assert!(!app.follow_tail);

        app.scroll_down(u16::MAX);
        assert!(app.follow_tail);
    }
}
