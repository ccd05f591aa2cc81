use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use gitaguide::{Language, Message, Mood, Theme, VerseCitation};

use crate::app::{App, InputMode, SUGGESTIONS};

/// Colours for one theme
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    user: Color,
    bar_bg: Color,
    highlight: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            background: Color::White,
            text: Color::Black,
            muted: Color::DarkGray,
            accent: Color::Rgb(217, 119, 6),
            user: Color::Rgb(109, 40, 217),
            bar_bg: Color::Rgb(241, 240, 251),
            highlight: Color::Rgb(237, 233, 254),
        },
        Theme::Dark => Palette {
            background: Color::Rgb(15, 23, 42),
            text: Color::White,
            muted: Color::Gray,
            accent: Color::Rgb(245, 158, 11),
            user: Color::Rgb(167, 139, 250),
            bar_bg: Color::Rgb(30, 41, 59),
            highlight: Color::Rgb(51, 65, 85),
        },
    }
}

/// Parse one line of reply text, styling **bold**, *italic* and list bullets
fn parse_markdown_line(text: &str, accent: Color) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    // List items: "- item" or "* item" (but not "**bold**")
    let trimmed = text.trim_start();
    let indent = text.len() - trimmed.len();
    let body = if (trimmed.starts_with("- ") || trimmed.starts_with("* ")) && !trimmed.starts_with("**") {
        spans.push(Span::raw(format!("{}• ", " ".repeat(indent))));
        &trimmed[2..]
    } else {
        text
    };

    let mut chars = body.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c != '*' {
            current_text.push(c);
            continue;
        }

        let bold = chars.peek() == Some(&'*');
        if bold {
            chars.next();
        }

        // Find the matching closing marker
        let mut inner = String::new();
        let mut found_close = false;
        while let Some(c) = chars.next() {
            if c == '*' && (!bold || chars.peek() == Some(&'*')) {
                if bold {
                    chars.next();
                }
                found_close = true;
                break;
            }
            inner.push(c);
        }

        if found_close && !inner.is_empty() {
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }
            let style = if bold {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::ITALIC)
            };
            spans.push(Span::styled(inner, style));
        } else {
            // Unclosed marker, keep it literal
            current_text.push_str(if bold { "**" } else { "*" });
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

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let colors = palette(app.theme());

    frame.render_widget(
        Block::default().style(Style::default().bg(colors.background).fg(colors.text)),
        area,
    );

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, colors);
    render_chat(app, frame, chat_area, colors);
    render_input(app, frame, input_area, colors);
    render_footer(app, frame, footer_area, colors);

    if app.show_mood_picker {
        render_mood_picker(app, frame, area, colors);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let label = Style::default().fg(colors.muted);
    let value = Style::default().fg(colors.text).bold();

    let title = Line::from(vec![
        Span::styled(" ॐ GitaGuide AI ", Style::default().fg(colors.accent).bold()),
        Span::styled("Spiritual Companion", label),
        Span::raw("   "),
        Span::styled("Mood: ", label),
        Span::styled(app.conversation.mood().as_str(), value),
        Span::raw("  "),
        Span::styled("Lang: ", label),
        Span::styled(app.conversation.language().display_name(), value),
        Span::raw("  "),
        Span::styled("Theme: ", label),
        Span::styled(app.theme().as_str(), value),
        Span::raw(" "),
        Span::styled(format!("v{}", env!("CARGO_PKG_VERSION")), label),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(colors.bar_bg));
    frame.render_widget(header, area);
}

fn welcome_lines(colors: Palette) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("ॐ", Style::default().fg(colors.accent).bold())).centered(),
        Line::from(Span::styled("GitaGuide AI", Style::default().bold())).centered(),
        Line::from("Pranam 🙏").centered(),
        Line::from(Span::styled(
            "I am here to guide you through the eternal wisdom of the Bhagavad Gita.",
            Style::default().fg(colors.muted),
        ))
        .centered(),
        Line::from(Span::styled(
            "What weighs upon your mind today?",
            Style::default().fg(colors.accent),
        ))
        .centered(),
        Line::default(),
    ];

    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        lines.push(
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(colors.user).bold()),
                Span::styled(suggestion.to_string(), Style::default().fg(colors.user)),
            ])
            .centered(),
        );
    }
    lines.push(Line::default());
    lines.push(
        Line::from(Span::styled(
            "Press 1-3 to ask one of these, or i to write your own",
            Style::default().fg(colors.muted),
        ))
        .centered(),
    );
    lines
}

fn message_lines(
    message: &Message,
    selected: bool,
    language: Language,
    colors: Palette,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (name, name_color) = if message.is_user() {
        ("You", colors.user)
    } else {
        ("GitaGuide", colors.accent)
    };
    lines.push(Line::from(vec![
        Span::styled(name, Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", message.timestamp), Style::default().fg(colors.muted)),
    ]));

    if message.is_user() {
        for line in message.content.lines() {
            lines.push(Line::from(line.to_string()));
        }
    } else {
        for line in message.content.lines() {
            lines.push(parse_markdown_line(line, colors.accent));
        }
    }

    if let Some(verses) = message.verses.as_ref().filter(|v| !v.is_empty()) {
        let label = if message.show_verses {
            "▾ Hide Verses".to_string()
        } else {
            let plural = if verses.len() > 1 { "s" } else { "" };
            format!("▸ {} Sacred Verse{}", verses.len(), plural)
        };
        let mut style = Style::default().fg(colors.user).add_modifier(Modifier::BOLD);
        if selected {
            style = style.bg(colors.highlight);
        }
        lines.push(Line::from(Span::styled(format!("[{}]", label), style)));

        if message.show_verses {
            for verse in verses {
                lines.extend(verse_lines(verse, language, colors));
            }
        }
    }

    lines.push(Line::default());
    lines
}

fn verse_lines(verse: &VerseCitation, language: Language, colors: Palette) -> Vec<Line<'static>> {
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let mut lines = vec![Line::from(Span::styled(
        format!("  {}", verse.reference()),
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
    ))];

    if let Some(shloka) = &verse.shloka {
        for line in shloka.lines() {
            lines.push(Line::from(Span::styled(format!("    {}", line), italic)));
        }
    }
    if let Some(transliteration) = &verse.transliteration {
        lines.push(Line::from(Span::styled(
            format!("    {}", transliteration),
            italic.fg(colors.muted),
        )));
    }

    let text = match (language, &verse.hindi_translation) {
        (Language::Hindi, Some(hindi)) => hindi,
        _ => &verse.text,
    };
    lines.push(Line::from(vec![
        Span::styled("  │ ", Style::default().fg(colors.accent)),
        Span::styled(format!("\"{}\"", text), italic),
    ]));
    lines.push(Line::default());
    lines
}

/// Rows a set of lines occupies once wrapped to `width`.
///
/// The paragraph wraps at word boundaries, which can take more rows than a
/// character count suggests, so every line that wraps at all is given one
/// spare row. Overshooting only leaves blank space below the last message.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| {
            let chars = line.width().max(1);
            let rows = chars.div_ceil(width);
            if rows > 1 { rows + 1 } else { rows }
        })
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(colors.muted));
    let inner = block.inner(area);
    app.chat_height = inner.height;

    let language = app.conversation.language();
    let mut lines: Vec<Line> = Vec::new();

    if app.conversation.is_empty() && !app.conversation.is_loading() {
        lines = welcome_lines(colors);
    } else {
        for message in app.conversation.messages() {
            let selected = app.selected_message == Some(message.id);
            lines.extend(message_lines(message, selected, language, colors));
        }
    }

    if app.conversation.is_loading() {
        lines.push(Line::from(Span::styled(
            "GitaGuide",
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Reflecting{}", dots),
            Style::default().fg(colors.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    let total = wrapped_height(&lines, inner.width);
    let max_scroll = total.saturating_sub(inner.height);
    if app.follow_tail || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_tail = true;
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { colors.user } else { colors.muted };

    let title = if app.is_waiting() {
        " Waiting for guidance... "
    } else if app.can_send() {
        " Ask about the Gita (Enter to send) "
    } else {
        " Ask about the Gita "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(colors.text))
        .block(input_block);

    frame.render_widget(input, area);

    if editing && !app.show_mood_picker {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, colors: Palette) {
    let key_style = Style::default().bg(colors.muted).fg(colors.background);
    let label_style = Style::default().fg(colors.text);

    let mut hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" menu ", label_style),
        ],
        InputMode::Normal => {
            let mut hints = vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" m ", key_style),
                Span::styled(" mood ", label_style),
                Span::styled(" l ", key_style),
                Span::styled(" lang ", label_style),
                Span::styled(" t ", key_style),
                Span::styled(" theme ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" select ", label_style),
                Span::styled(" v ", key_style),
                Span::styled(" verses ", label_style),
            ];
            if app.conversation.is_empty() {
                hints.extend(vec![
                    Span::styled(" 1-3 ", key_style),
                    Span::styled(" prompt ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

    match &app.notice {
        Some(notice) => hints.push(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::Red),
        )),
        None => hints.push(Span::styled(
            "  AI guidance • Verify with scripture",
            Style::default().fg(colors.muted),
        )),
    }

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(colors.bar_bg));
    frame.render_widget(footer, area);
}

fn render_mood_picker(app: &mut App, frame: &mut Frame, area: Rect, colors: Palette) {
    let moods = Mood::all();

    // Calculate popup size and position (centered)
    let popup_width = 32.min(area.width.saturating_sub(4));
    let popup_height = (moods.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .style(Style::default().bg(colors.background))
        .title(" How are you feeling? ");

    let current = app.conversation.mood();
    let items: Vec<ListItem> = moods
        .iter()
        .map(|mood| {
            let style = if *mood == current {
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(format!(" {} ", mood.as_str())).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.user)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.mood_picker_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_bold_and_italic_spans() {
        let line = parse_markdown_line("Act **without attachment** and *rest*.", Color::Yellow);
        assert_eq!(
            contents(&line),
            vec!["Act ", "without attachment", " and ", "rest", "."]
        );
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(line.spans[3].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_unclosed_marker_stays_literal() {
        let line = parse_markdown_line("2 * 3 = six", Color::Yellow);
        assert_eq!(contents(&line).concat(), "2 * 3 = six");

        let line = parse_markdown_line("**open", Color::Yellow);
        assert_eq!(contents(&line).concat(), "**open");
    }

    #[test]
    fn test_list_items_get_bullets() {
        let line = parse_markdown_line("- Breathe slowly", Color::Yellow);
        assert_eq!(contents(&line).concat(), "• Breathe slowly");

        let line = parse_markdown_line("**Bold** start", Color::Yellow);
        assert_eq!(contents(&line)[0], "Bold");
    }

    #[test]
    fn test_empty_line() {
        assert!(parse_markdown_line("", Color::Yellow).spans.is_empty());
    }

    #[test]
    fn test_wrapped_height_counts_blank_lines() {
        let lines = vec![Line::from("abcdef"), Line::default(), Line::from("ab")];
        assert_eq!(wrapped_height(&lines, 80), 3);
        assert_eq!(wrapped_height(&lines, 4), 5);
        assert_eq!(wrapped_height(&lines, 0), 11);
    }

    #[test]
    fn test_wrapped_height_covers_word_wrapping() {
        // Word wrap at width 10 puts each word on its own row
        let lines = vec![Line::from("peace wisdom action")];
        assert!(wrapped_height(&lines, 10) >= 3);

        let lines = vec![Line::from("stillness")];
        assert_eq!(wrapped_height(&lines, 10), 1);
    }

    #[test]
    fn test_welcome_explains_prompt_keys() {
        let text: Vec<String> = welcome_lines(palette(Theme::Dark))
            .iter()
            .map(|l| contents(l).concat())
            .collect();
        assert!(text.iter().any(|l| l.contains("1-3") && l.contains("i to write")));
        for suggestion in SUGGESTIONS {
            assert!(text.iter().any(|l| l.contains(suggestion)));
        }
    }

    #[test]
    fn test_hidden_verses_render_toggle_only() {
        let mut conversation = gitaguide::Conversation::new();
        let verse = VerseCitation {
            chapter: 2,
            verse: 48,
            text: "Perform your duty".to_string(),
            shloka: None,
            transliteration: None,
            hindi_translation: Some("अपना कर्तव्य करो".to_string()),
        };
        let id = conversation.append_assistant_message("Seek stillness...", Some(vec![verse]));
        let colors = palette(Theme::Light);

        let message = conversation.get(id).unwrap().clone();
        let rendered: Vec<String> = message_lines(&message, false, Language::English, colors)
            .iter()
            .map(|l| contents(l).concat())
            .collect();
        assert!(rendered.iter().any(|l| l == "[▸ 1 Sacred Verse]"));
        assert!(!rendered.iter().any(|l| l.contains("Chapter 2, Verse 48")));

        conversation.toggle_verses(id);
        let message = conversation.get(id).unwrap().clone();
        let rendered: Vec<String> = message_lines(&message, true, Language::Hindi, colors)
            .iter()
            .map(|l| contents(l).concat())
            .collect();
        assert!(rendered.iter().any(|l| l == "[▾ Hide Verses]"));
        assert!(rendered.iter().any(|l| l.contains("Chapter 2, Verse 48")));
        assert!(rendered.iter().any(|l| l.contains("अपना कर्तव्य करो")));
    }
}
