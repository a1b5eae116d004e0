use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use educhat_core::quiz::AnswerWidget;

use crate::app::{point_in_rect, App, InputMode, QuizRow, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.poll_tasks().await;
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Popups capture all input while open
    if app.delete_prompt.is_some() {
        handle_delete_prompt(app, key);
        return;
    }
    if app.summary_modal.is_some() {
        handle_summary_modal(app, key);
        return;
    }
    if app.show_upload_form {
        handle_upload_form(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_delete_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_delete_prompt(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_delete_prompt(false),
        _ => {}
    }
}

fn handle_summary_modal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('x') => {
            app.close_summary()
        }
        _ => {}
    }
}

fn handle_upload_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.cancel_upload();
            app.show_upload_form = false;
        }
        KeyCode::Enter => app.submit_upload(),
        KeyCode::Tab | KeyCode::Down => {
            app.upload_form.focus = app.upload_form.focus.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            // Three fields, so two steps forward is one back
            app.upload_form.focus = app.upload_form.focus.next().next();
        }
        KeyCode::Backspace if !app.upload_form.busy => {
            let focus = app.upload_form.focus;
            app.upload_form.field_mut(focus).pop();
        }
        KeyCode::Char(c) if !app.upload_form.busy => {
            let focus = app.upload_form.focus;
            app.upload_form.field_mut(focus).push(c);
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => {
            app.screen = Screen::Chat;
            return;
        }
        KeyCode::Char('2') => {
            app.screen = Screen::Documents;
            return;
        }
        KeyCode::Char('3') => {
            app.screen = Screen::Quiz;
            return;
        }
        KeyCode::Tab => {
            app.screen = app.screen.next();
            return;
        }
        KeyCode::Char('u') => {
            app.open_upload_form();
            return;
        }
        KeyCode::Char('X') => {
            app.alerts.dismiss_latest();
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Documents => handle_documents_normal(app, key),
        Screen::Quiz => {
            if app.quiz_view.is_some() {
                handle_quiz_answers_normal(app, key)
            } else {
                handle_quiz_settings_normal(app, key)
            }
        }
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            // Cursor at end of existing text
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char('j') | KeyCode::Down => app.chat_scroll = app.chat_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('m') => app.cycle_chat_mode(),
        KeyCode::Esc => {
            app.cancel_active_request();
        }
        _ => {}
    }
}

fn handle_documents_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.document_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.document_nav_up(),
        KeyCode::Char(' ') => app.toggle_focused_document(),
        KeyCode::Char('a') => app.toggle_select_all(),
        KeyCode::Char('s') => app.request_summary(),
        KeyCode::Char('d') => app.prompt_delete(),
        KeyCode::Enter => app.request_detail(),
        KeyCode::Char('r') => app.refresh_documents(),
        KeyCode::Esc => {
            if !app.cancel_active_request() {
                app.document_detail = None;
            }
        }
        _ => {}
    }
}

fn handle_quiz_settings_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.quiz_row_down(),
        KeyCode::Char('k') | KeyCode::Up => app.quiz_row_up(),
        KeyCode::Char(' ') | KeyCode::Enter => app.activate_quiz_row(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.quiz_settings.increase_questions(),
        KeyCode::Char('-') => app.quiz_settings.decrease_questions(),
        KeyCode::Char('l') | KeyCode::Right if app.current_quiz_row() == Some(QuizRow::Count) => {
            app.quiz_settings.increase_questions()
        }
        KeyCode::Char('h') | KeyCode::Left if app.current_quiz_row() == Some(QuizRow::Count) => {
            app.quiz_settings.decrease_questions()
        }
        KeyCode::Char('g') => app.submit_quiz(),
        KeyCode::Esc => {
            app.cancel_active_request();
        }
        _ => {}
    }
}

fn handle_quiz_answers_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.quiz_card_down(),
        KeyCode::Char('k') | KeyCode::Up => app.quiz_card_up(),
        KeyCode::Char('l') | KeyCode::Right => app.shift_quiz_option(1),
        KeyCode::Char('h') | KeyCode::Left => app.shift_quiz_option(-1),
        KeyCode::Char('i') | KeyCode::Enter => {
            let is_text = app
                .quiz_view
                .as_ref()
                .and_then(|v| v.cards.get(app.quiz_card))
                .is_some_and(|c| c.widget == AnswerWidget::Text);
            let graded = app.quiz_view.as_ref().is_some_and(|v| v.is_graded());
            if is_text && !graded {
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('c') => app.check_quiz_answers(),
        KeyCode::Char('n') => app.new_quiz(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Chat => handle_chat_editing(app, key),
        Screen::Quiz => handle_quiz_editing(app, key),
        Screen::Documents => app.input_mode = InputMode::Normal,
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_chat();
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_quiz_editing(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
        app.input_mode = InputMode::Normal;
        return;
    }

    let card = app.quiz_card;
    match app.quiz_view.as_mut() {
        // Short answer on the focused question
        Some(view) => {
            let mut text = view
                .cards
                .get(card)
                .map(|c| c.text_answer.clone())
                .unwrap_or_default();
            match key.code {
                KeyCode::Backspace => {
                    text.pop();
                }
                KeyCode::Char(c) => text.push(c),
                _ => return,
            }
            view.set_text_answer(card, &text);
        }
        // Topic field of the settings form
        None => match key.code {
            KeyCode::Backspace => {
                app.quiz_settings.topic.pop();
            }
            KeyCode::Char(c) => app.quiz_settings.topic.push(c),
            _ => {}
        },
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.dismiss_alert_at(x, y) {
                return;
            }
            // Clicking the backdrop closes the summary
            if app.summary_modal.is_some() {
                let inside = app.modal_area.is_some_and(|r| point_in_rect(x, y, r));
                if !inside {
                    app.close_summary();
                }
            }
        }
        MouseEventKind::ScrollDown => match app.screen {
            Screen::Chat => {
                if app.chat_area.is_some_and(|r| point_in_rect(x, y, r)) {
                    app.chat_scroll = app.chat_scroll.saturating_add(3);
                }
            }
            Screen::Documents => app.document_nav_down(),
            Screen::Quiz => {
                if app.quiz_view.is_some() {
                    app.quiz_card_down();
                } else {
                    app.quiz_row_down();
                }
            }
        },
        MouseEventKind::ScrollUp => match app.screen {
            Screen::Chat => {
                if app.chat_area.is_some_and(|r| point_in_rect(x, y, r)) {
                    app.chat_scroll = app.chat_scroll.saturating_sub(3);
                }
            }
            Screen::Documents => app.document_nav_up(),
            Screen::Quiz => {
                if app.quiz_view.is_some() {
                    app.quiz_card_up();
                } else {
                    app.quiz_row_up();
                }
            }
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppOptions;
    use educhat_core::upload::UploadField;
    use educhat_core::{ChatMode, QuizSettings};

    fn app() -> App {
        App::new(AppOptions {
            base_url: "http://localhost:8000".to_string(),
            start_url: "http://localhost:8000/".to_string(),
            chat_mode: ChatMode::Standard,
            settings: QuizSettings::new(),
            session_id: None,
        })
        .unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Editing);
        for c in "DNA".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Char('¿'));
        assert_eq!(app.chat_input, "¿DNA");
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.chat_input, "¿DN");
    }

    #[test]
    fn test_screen_switching_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.screen, Screen::Documents);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Quiz);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_upload_form_captures_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('u'));
        assert!(app.show_upload_form);
        for c in "a.pdf".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.upload_form.file_path, "a.pdf");
        assert_eq!(app.upload_form.title, "q");
        assert!(!app.should_quit);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.upload_form.focus, UploadField::File);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_upload_form);
    }

    #[test]
    fn test_topic_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        app.quiz_settings.mode = educhat_core::quiz::QuizMode::Topic;
        app.quiz_row = app.quiz_rows().len() - 1;
        assert_eq!(app.current_quiz_row(), Some(QuizRow::Topic));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);
        for c in "Cells".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.quiz_settings.topic, "Cells");
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
