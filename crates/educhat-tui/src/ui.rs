use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use educhat_core::documents::EMPTY_LIST_MESSAGE;
use educhat_core::quiz::{AnswerWidget, QuestionCard, QuizMode, NO_QUESTIONS_MESSAGE};
use educhat_core::upload::UploadField;
use educhat_core::{ChatRole, QuizView, Severity};

use crate::app::{App, InputMode, QuizRow, Screen};

/// Parse a line of text and convert **bold** and `code` markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        let (closing, style) = match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                ("**", Style::default().add_modifier(Modifier::BOLD))
            }
            '`' => ("`", Style::default().fg(Color::Green)),
            _ => {
                current_text.push(c);
                continue;
            }
        };

        // Find the closing marker
        let mut inner = String::new();
        let mut found_close = false;
        while let Some(c) = chars.next() {
            if closing == "**" && c == '*' && chars.peek() == Some(&'*') {
                chars.next();
                found_close = true;
                break;
            }
            if closing == "`" && c == '`' {
                found_close = true;
                break;
            }
            inner.push(c);
        }

        if found_close && !inner.is_empty() {
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }
            spans.push(Span::styled(inner, style));
        } else {
            // No closing marker, treat as literal
            current_text.push_str(closing);
            current_text.push_str(&inner);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Info => Color::Cyan,
        Severity::Warning => Color::Yellow,
        Severity::Danger => Color::Red,
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Alerts stack above the body, newest last
    let alert_rows = app.alerts.alerts().len().min(3) as u16;

    let [header_area, alerts_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(alert_rows),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_alerts(app, frame, alerts_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Documents => render_documents_screen(app, frame, body_area),
        Screen::Quiz => render_quiz_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Popups (in order of priority)
    if app.delete_prompt.is_some() {
        render_delete_prompt(app, frame, area);
    } else if app.summary_modal.is_some() {
        render_summary_modal(app, frame, area);
    } else if app.show_upload_form {
        render_upload_form(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(" EduChat ", Style::default().fg(Color::Cyan).bold())];

    for (i, screen) in Screen::all().iter().enumerate() {
        let style = if *screen == app.screen {
            Style::default().fg(Color::White).bg(Color::Blue).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, screen.title()), style));
    }

    let selected = app.selection.selected().len();
    if selected > 0 {
        spans.push(Span::styled(
            format!(" [{} selected]", selected),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(session) = app.chat.session_id() {
        spans.push(Span::styled(
            format!(" session {}", session),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_alerts(app: &mut App, frame: &mut Frame, area: Rect) {
    app.alert_areas.clear();
    if area.height == 0 {
        return;
    }

    let alerts = app.alerts.alerts();
    let visible = &alerts[alerts.len().saturating_sub(area.height as usize)..];
    let mut hit_areas = Vec::with_capacity(visible.len());
    for (row, alert) in visible.iter().enumerate() {
        let rect = Rect::new(area.x, area.y + row as u16, area.width, 1);
        let color = severity_color(alert.severity);
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", alert.severity.as_str().to_uppercase()),
                Style::default().bg(color).fg(Color::Black).bold(),
            ),
            Span::styled(format!(" {} ", alert.message), Style::default().fg(color)),
            Span::styled(" [x]", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), rect);
        hit_areas.push((alert.id, rect));
    }
    app.alert_areas = hit_areas;
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = if app.delete_prompt.is_some() {
        " CONFIRM "
    } else if app.show_upload_form {
        " UPLOAD "
    } else {
        match app.screen {
            Screen::Chat => " CHAT ",
            Screen::Documents => " DOCS ",
            Screen::Quiz => " QUIZ ",
        }
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        vec![
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let pairs: Vec<(&str, &str)> = if app.delete_prompt.is_some() {
        vec![("y", "delete"), ("n", "keep")]
    } else if app.summary_modal.is_some() {
        vec![("Esc", "close")]
    } else if app.show_upload_form {
        vec![("Tab", "next field"), ("Enter", "upload"), ("Esc", "close")]
    } else {
        match (app.screen, app.input_mode) {
            (Screen::Chat, InputMode::Normal) => vec![
                ("i", "type"),
                ("j/k", "scroll"),
                ("m", "mode"),
                ("Esc", "cancel"),
                ("u", "upload"),
                ("Tab", "screen"),
                ("q", "quit"),
            ],
            (Screen::Chat, InputMode::Editing) => vec![("Enter", "send"), ("Esc", "stop typing")],
            (Screen::Documents, _) => vec![
                ("j/k", "nav"),
                ("Space", "select"),
                ("a", "all"),
                ("s", "summary"),
                ("d", "delete"),
                ("Enter", "details"),
                ("r", "refresh"),
                ("u", "upload"),
                ("q", "quit"),
            ],
            (Screen::Quiz, InputMode::Editing) => vec![("Enter", "done"), ("Esc", "done")],
            (Screen::Quiz, InputMode::Normal) => {
                if app.quiz_view.is_some() {
                    vec![
                        ("j/k", "question"),
                        ("h/l", "option"),
                        ("i", "answer"),
                        ("c", "check answers"),
                        ("n", "new quiz"),
                        ("q", "quit"),
                    ]
                } else {
                    vec![
                        ("j/k", "nav"),
                        ("Space", "toggle"),
                        ("+/-", "count"),
                        ("g", "generate"),
                        ("Esc", "cancel"),
                        ("q", "quit"),
                    ]
                }
            }
        }
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in pairs {
        spans.extend(hint(key, label));
    }
    if !app.alerts.is_empty() {
        spans.extend(hint("X", "dismiss"));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_column, context_area] = Layout::horizontal([
        Constraint::Percentage(70),
        Constraint::Percentage(30),
    ])
    .areas(area);

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_column);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Chat ({}) ", app.chat.mode.display_name()));

    let chat_text = if app.chat.messages().is_empty() && !app.chat.is_typing() {
        Text::from(Span::styled(
            "Ask a question about your documents...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.chat.messages() {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.content.clone()));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Tutor:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        if app.chat.is_typing() {
            lines.push(Line::from(Span::styled(
                "Tutor:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame / 3) as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("Typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(if app.chat_task.is_busy() {
            " Message (waiting for reply, Esc to cancel) "
        } else {
            " Message (i to type) "
        });

    // Horizontal scrolling keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };
    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    render_chat_context(app, frame, context_area);
}

fn render_chat_context(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Context ");

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Mode: ", Style::default().fg(Color::DarkGray)),
            Span::styled(app.chat.mode.display_name(), Style::default().fg(Color::Magenta).bold()),
        ]),
        Line::default(),
    ];

    let titles = app.chat_context_titles();
    if titles.is_empty() {
        lines.push(Line::from(Span::styled(
            "No documents selected",
            Style::default().fg(Color::DarkGray).italic(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Documents:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for title in titles {
            lines.push(Line::from(format!("  • {}", title)));
        }
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_documents_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, detail_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(area);

    let title = if app.documents_task.is_busy() {
        " Documents (loading...) ".to_string()
    } else {
        format!(
            " Documents ({} of {} selected) ",
            app.selection.selected().len(),
            app.document_view.len()
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    if app.document_view.is_empty() {
        let empty = Paragraph::new(Span::styled(
            EMPTY_LIST_MESSAGE,
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, list_area);
    } else {
        // Category headers sit between cards, so map the focused card to its row
        let focused = app.document_state.selected();
        let mut items: Vec<ListItem> = Vec::new();
        let mut highlighted = None;
        let mut card_index = 0;

        for section in &app.document_view.sections {
            items.push(ListItem::new(Line::from(Span::styled(
                section.name.clone(),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ))));
            for card in &section.cards {
                if focused == Some(card_index) {
                    highlighted = Some(items.len());
                }
                let checked = app.selection.is_selected(&card.id);
                items.push(ListItem::new(Text::from(vec![
                    Line::from(format!(
                        "{} {} {}",
                        checkbox(checked),
                        card.icon.glyph(),
                        card.title
                    )),
                    Line::from(Span::styled(
                        format!("      {}", card.meta),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])));
                card_index += 1;
            }
        }

        let mut state = ListState::default();
        state.select(highlighted);

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    render_document_detail(app, frame, detail_area);
}

fn render_document_detail(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Details ");

    let card = app
        .document_state
        .selected()
        .and_then(|i| app.document_view.card_at(i));

    let Some(card) = card else {
        frame.render_widget(block, area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} {}", card.icon.glyph(), card.title),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(card.meta.clone()),
        Line::default(),
    ];

    match app.document_detail.as_ref().filter(|d| d.id == card.id) {
        Some(doc) => {
            lines.push(Line::from(vec![
                Span::styled("File: ", label),
                Span::raw(doc.original_filename.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Category: ", label),
                Span::raw(doc.category.clone().unwrap_or_else(|| "-".to_string())),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Processed: ", label),
                if doc.processed {
                    Span::styled("yes", Style::default().fg(Color::Green))
                } else {
                    Span::styled("pending", Style::default().fg(Color::Yellow))
                },
            ]));
        }
        None if app.detail_task.is_busy() => {
            lines.push(Line::from(Span::styled("Loading details...", label)));
        }
        None => {
            lines.push(Line::from(Span::styled("Enter for details", label)));
        }
    }

    lines.push(Line::default());
    let mut actions = vec![
        Span::styled(" s ", Style::default().bg(Color::DarkGray).fg(Color::White)),
        Span::raw(" Summary  "),
        Span::styled(" d ", Style::default().bg(Color::DarkGray).fg(Color::White)),
        Span::raw(" Delete"),
    ];
    if app.summary_task.is_busy() {
        actions.push(Span::styled("  summarizing...", label));
    }
    if app.delete_task.is_busy() {
        actions.push(Span::styled("  deleting...", label));
    }
    lines.push(Line::from(actions));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_quiz_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    if app.quiz_view.is_some() {
        render_quiz_questions(app, frame, area);
    } else {
        render_quiz_settings(app, frame, area);
    }
}

fn render_quiz_settings(app: &App, frame: &mut Frame, area: Rect) {
    let [form_area, button_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let settings = &app.quiz_settings;
    let label = Style::default().fg(Color::DarkGray);
    let editing_topic = app.input_mode == InputMode::Editing;

    let rows = app.quiz_rows();
    let mut items: Vec<ListItem> = Vec::with_capacity(rows.len());
    for row in &rows {
        let line = match row {
            QuizRow::Document(i) => match app.document_view.card_at(*i) {
                Some(card) => Line::from(format!(
                    "{} {} {}",
                    checkbox(app.quiz_selection.is_selected(&card.id)),
                    card.icon.glyph(),
                    card.title
                )),
                None => Line::default(),
            },
            QuizRow::QuestionType(kind) => Line::from(format!(
                "{} {}",
                checkbox(settings.has_question_type(*kind)),
                kind.display_name()
            )),
            QuizRow::Mode => Line::from(vec![
                Span::styled("Quiz type: ", label),
                Span::raw(settings.mode.display_name()),
            ]),
            QuizRow::Difficulty => Line::from(vec![
                Span::styled("Difficulty: ", label),
                Span::raw(settings.difficulty.as_str()),
            ]),
            QuizRow::Count => Line::from(vec![
                Span::styled("Questions: ", label),
                Span::raw(format!("< {} >", settings.num_questions)),
            ]),
            QuizRow::Topic => {
                let cursor = if editing_topic { "_" } else { "" };
                Line::from(vec![
                    Span::styled("Topic: ", label),
                    Span::styled(
                        format!("{}{}", settings.topic, cursor),
                        Style::default().fg(Color::Cyan),
                    ),
                ])
            }
        };
        items.push(ListItem::new(line));
    }

    let title = if app.document_view.is_empty() {
        " Quiz settings (upload documents to quiz yourself) "
    } else {
        " Quiz settings: documents, question types, options "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let mut state = ListState::default();
    state.select(Some(app.quiz_row.min(rows.len().saturating_sub(1))));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, form_area, &mut state);

    let button_style = if settings.busy {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    let mode_note = if settings.mode == QuizMode::Topic {
        " (topic)"
    } else {
        ""
    };
    let button = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", settings.submit_label()), button_style),
        Span::styled(format!("{} press g", mode_note), label),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(button, button_area);
}

/// Lines for one question card; the result block appears once graded.
fn question_lines(card: &QuestionCard, focused: bool, editing: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let marker = if focused { "> " } else { "  " };
    let prompt_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(Span::styled(format!("{}{}", marker, card.prompt), prompt_style)));

    match &card.widget {
        AnswerWidget::Choice(options) => {
            for (i, option) in options.iter().enumerate() {
                let picked = card.selected_option == Some(i);
                let radio = if picked { "(•)" } else { "( )" };
                let style = if picked {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(format!("    {} {}", radio, option), style)));
            }
        }
        AnswerWidget::Text => {
            let shown = if card.text_answer.is_empty() && !editing {
                Span::styled("Your answer...", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(
                    format!("{}{}", card.text_answer, if editing { "_" } else { "" }),
                    Style::default().fg(Color::Cyan),
                )
            };
            lines.push(Line::from(vec![Span::raw("    "), shown]));
        }
    }

    if let Some(result) = &card.result {
        if result.correct {
            lines.push(Line::from(Span::styled(
                "    Correct! ✅",
                Style::default().fg(Color::Green),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "    Incorrect ❌",
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(format!("    Correct answer: {}", result.correct_answer)));
        }
        if let Some(explanation) = &result.explanation {
            lines.push(Line::from(vec![
                Span::styled("    Explanation: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(explanation.clone()),
            ]));
        }
    }

    lines.push(Line::default());
    lines
}

fn render_quiz_questions(app: &App, frame: &mut Frame, area: Rect) {
    let Some(view) = app.quiz_view.as_ref() else {
        return;
    };

    let score_height = if view.is_graded() { 7 } else { 0 };
    let [questions_area, score_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(score_height),
    ])
    .areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} | Difficulty: {} ", view.title, view.difficulty));

    if view.is_empty() {
        let empty = Paragraph::new(Span::styled(
            NO_QUESTIONS_MESSAGE,
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, questions_area);
        return;
    }

    let editing = app.input_mode == InputMode::Editing;
    let mut lines: Vec<Line> = Vec::new();
    let mut focus_line = 0;
    for (i, card) in view.cards.iter().enumerate() {
        let focused = i == app.quiz_card;
        if focused {
            focus_line = lines.len();
        }
        lines.extend(question_lines(card, focused, focused && editing));
    }
    if !view.is_graded() {
        lines.push(Line::from(Span::styled(
            " Check Answers (c) ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    }

    // Keep the focused question near the top
    let visible = questions_area.height.saturating_sub(2) as usize;
    let scroll = if focus_line + 1 > visible {
        focus_line.saturating_sub(1)
    } else {
        0
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, questions_area);

    if view.is_graded() {
        render_score(view, frame, score_area);
    }
}

fn render_score(view: &QuizView, frame: &mut Frame, area: Rect) {
    let Some(score) = view.score.as_ref() else {
        return;
    };
    let color = severity_color(score.tier.severity());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(" Quiz Results ");

    let lines = vec![
        Line::from(format!("Questions: {}", score.total)),
        Line::from(format!("Correct Answers: {}", score.correct)),
        Line::from(format!("Score: {:.1}%", score.percentage)),
        Line::default(),
        Line::from(Span::styled(score.tier.message(), Style::default().fg(color).bold())),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_upload_form(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(area, 64, 11);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Upload Document ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let form = &app.upload_form;
    let fields = [
        (UploadField::File, "File path", &form.file_path),
        (UploadField::Title, "Title (optional)", &form.title),
        (UploadField::Category, "Category (optional)", &form.category),
    ];

    let mut lines = Vec::new();
    for (field, name, value) in fields {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(name, label_style)));
        lines.push(Line::from(Span::styled(
            format!("  {}{}", value, if focused && !form.busy { "_" } else { "" }),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Line::default());
    let button_style = if form.busy {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
    } else {
        Style::default().fg(Color::Green).bold()
    };
    lines.push(Line::from(Span::styled(format!("[ {} ]", form.submit_label()), button_style)));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_delete_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let Some(prompt) = app.delete_prompt.as_ref() else {
        return;
    };
    let popup_area = centered_rect(area, 60, 6);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Delete Document ");

    let text = vec![
        Line::from(prompt.message()),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::Red).fg(Color::White)),
            Span::raw(" delete   "),
            Span::styled(" n ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" keep"),
        ]),
    ];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

fn render_summary_modal(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(area, 80, area.height.saturating_sub(6).max(8));
    app.modal_area = Some(popup_area);
    let Some(modal) = app.summary_modal.as_ref() else {
        return;
    };
    frame.render_widget(Clear, popup_area);

    // Dimmed while fading out
    let (border, text_style) = if modal.is_fading() {
        (Color::DarkGray, Style::default().fg(Color::DarkGray))
    } else {
        (Color::Cyan, Style::default())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", modal.title))
        .title_bottom(" Esc to close ");

    let lines: Vec<Line> = modal.summary.lines().map(parse_markdown_line).collect();
    let paragraph = Paragraph::new(lines)
        .style(text_style)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_bold_and_code() {
        let line = parse_markdown_line("A **cell** has `DNA` inside");
        let texts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["A ", "cell", " has ", "DNA", " inside"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("2 ** 3");
        let joined: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(joined, "2 ** 3");
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(area, 80, 20);
        assert!(popup.width <= 36);
        assert!(popup.height <= 8);
        assert!(popup.x + popup.width <= area.width);
    }
}
