use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

const PAGE: u16 = 10;

pub async fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {
            if app.follow_tail {
                app.scroll_chat_to_bottom();
            }
        }
        AppEvent::Tick => app.on_tick().await,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('l') if ctrl => app.clear_conversation(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.conversation.pop_char(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(PAGE),
        KeyCode::PageDown => app.scroll_down(PAGE),
        KeyCode::Char(c) if !ctrl => app.conversation.push_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatAnswer, ChatBackend};
    use crate::conversation::Conversation;
    use crate::error::ChatResult;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Fixed;

    #[async_trait]
    impl ChatBackend for Fixed {
        async fn send(&self, _query: &str) -> ChatResult<ChatAnswer> {
            Ok(ChatAnswer { answer: "ok".to_string(), source: None })
        }
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_typing_and_enter_submits() {
        let mut app = App::new(Conversation::new(Arc::new(Fixed)), "http://localhost/chat");
        for c in "hix".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).await;
        }
        handle_event(&mut app, key(KeyCode::Backspace)).await;
        assert_eq!(app.conversation.draft(), "hi");

        handle_event(&mut app, key(KeyCode::Enter)).await;
        assert_eq!(app.conversation.draft(), "");
        assert!(app.conversation.is_pending());

        app.conversation.wait_for_response().await;
        assert_eq!(app.conversation.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_without_typing() {
        let mut app = App::new(Conversation::new(Arc::new(Fixed)), "http://localhost/chat");
        let event = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_event(&mut app, event).await;
        assert!(app.should_quit);
        assert_eq!(app.conversation.draft(), "");
    }

    #[tokio::test]
    async fn test_ctrl_l_clears_only_when_idle() {
        let mut app = App::new(Conversation::new(Arc::new(Fixed)), "http://localhost/chat");
        let ctrl_l = || AppEvent::Key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));

        app.conversation.set_draft("hi");
        handle_event(&mut app, key(KeyCode::Enter)).await;
        assert!(app.conversation.is_pending());

        handle_event(&mut app, ctrl_l()).await;
        assert_eq!(app.conversation.transcript().len(), 1);
        assert_eq!(app.status.as_deref(), Some("Can't clear while a request is in flight"));
        // Ctrl-L must not leak into the draft
        assert_eq!(app.conversation.draft(), "");

        app.conversation.wait_for_response().await;
        handle_event(&mut app, ctrl_l()).await;
        assert!(app.conversation.transcript().is_empty());
        assert_eq!(app.status, None);
        assert_eq!(app.chat_scroll, 0);
    }
}
