use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::Section;
use crate::engine::scoring::LevelLabel;
use crate::session::result::TestResult;
use crate::ui::components::progress_bar::text_bar;
use crate::ui::theme::Theme;

const BAR_WIDTH: usize = 20;

pub struct ResultView<'a> {
    result: &'a TestResult,
    theme: &'a Theme,
    scroll: u16,
}

impl<'a> ResultView<'a> {
    pub fn new(result: &'a TestResult, theme: &'a Theme) -> Self {
        Self {
            result,
            theme,
            scroll: 0,
        }
    }

    pub fn scroll(mut self, offset: u16) -> Self {
        self.scroll = offset;
        self
    }

    fn level_color(&self) -> Color {
        let colors = &self.theme.colors;
        match self.result.level.label {
            LevelLabel::Beginner => colors.warning(),
            LevelLabel::Intermediate => colors.accent(),
            LevelLabel::Advanced => colors.success(),
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let r = self.result;
        let heading = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let body = Style::default().fg(colors.fg());
        let muted = Style::default().fg(colors.muted());

        let greeting = if r.profile.name.is_empty() {
            "Your placement result".to_string()
        } else {
            format!("{}, here is your placement result", r.profile.name)
        };

        let mut lines = vec![
            Line::from(Span::styled(greeting, heading)),
            Line::default(),
            Line::from(vec![
                Span::styled("Overall ", body),
                Span::styled(
                    format!("{}%", r.overall_pct),
                    body.add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  ({}/{} correct)", r.correct, r.total), muted),
            ]),
            Line::from(vec![
                Span::styled("Level   ", body),
                Span::styled(
                    r.level.label.to_string(),
                    Style::default()
                        .fg(self.level_color())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", r.level.note), muted),
            ]),
            Line::default(),
        ];

        for section in Section::ALL {
            let score = r.sections.get(section);
            let style = if section == r.weak_section {
                Style::default().fg(colors.warning())
            } else {
                Style::default().fg(colors.bar_filled())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", section.display_name()), body),
                Span::styled(text_bar(score.pct, BAR_WIDTH), style),
                Span::styled(
                    format!(" {:>3}%  {}/{}", score.pct, score.correct, score.total),
                    muted,
                ),
            ]));
        }
        lines.push(Line::from(Span::styled(
            format!("Focus area: {}", r.weak_section.display_name()),
            Style::default().fg(colors.warning()),
        )));

        if let Some(advice) = &r.plan.booking_advice {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("When to book", heading)));
            lines.push(Line::from(Span::styled(advice.clone(), body)));
        }

        if !r.plan.tips.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Tips", heading)));
            for tip in &r.plan.tips {
                lines.push(Line::from(Span::styled(format!(" \u{2022} {tip}"), body)));
            }
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(r.plan.title.clone(), heading)));
        for day in &r.plan.days {
            lines.push(Line::from(vec![
                Span::styled(day.label.clone(), body.add_modifier(Modifier::BOLD)),
                Span::styled(format!("  [{}]", day.tag), muted),
            ]));
            for task in &day.tasks {
                lines.push(Line::from(Span::styled(format!("   - {task}"), body)));
            }
        }
        lines
    }
}

impl Widget for ResultView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" Result \u{00b7} attempt {} ", self.result.attempt))
            .border_style(Style::default().fg(colors.border_focused()));
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
