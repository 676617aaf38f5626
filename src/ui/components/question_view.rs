use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::{Question, Section};
use crate::ui::theme::Theme;

pub struct QuestionView<'a> {
    question: Option<&'a Question>,
    index: usize,
    total: usize,
    chosen: Option<usize>,
    theme: &'a Theme,
}

impl<'a> QuestionView<'a> {
    pub fn new(
        question: Option<&'a Question>,
        index: usize,
        total: usize,
        chosen: Option<usize>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            question,
            index,
            total,
            chosen,
            theme,
        }
    }

    fn title(&self) -> String {
        match self.question {
            Some(q) => format!(
                " Question {}/{} \u{00b7} {} \u{00b7} level {} ",
                self.index + 1,
                self.total,
                q.section.display_name(),
                q.difficulty
            ),
            None => format!(" Question {}/{} ", self.index + 1, self.total),
        }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let Some(q) = self.question else {
            return vec![Line::from(Span::styled(
                "This question is no longer in the bank and will be skipped when scoring.",
                Style::default().fg(colors.warning()),
            ))];
        };

        let mut lines = Vec::new();
        if let Some(stimulus) = q.stimulus() {
            let heading = match q.section {
                Section::Listening => "Transcript",
                _ => "Passage",
            };
            lines.push(Line::from(Span::styled(
                heading,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )));
            for text in stimulus.lines() {
                lines.push(Line::from(Span::styled(
                    text.to_string(),
                    Style::default().fg(colors.muted()),
                )));
            }
            lines.push(Line::default());
        }

        lines.push(Line::from(Span::styled(
            q.prompt.clone(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::default());

        for (i, option) in q.options.iter().enumerate() {
            let selected = self.chosen == Some(i);
            let marker = if selected { "\u{25cf}" } else { " " };
            let style = if selected {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(
                format!(" {marker} [{}] {option}", i + 1),
                style,
            )));
        }
        lines
    }
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(self.title())
            .border_style(Style::default().fg(colors.border_focused()));
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::test_support::question;

    fn rendered(view: QuestionView<'_>) -> String {
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn shows_prompt_options_and_title() {
        let theme = Theme::default();
        let q = question("g1", Section::Grammar, 4, 0);
        let text = rendered(QuestionView::new(Some(&q), 2, 50, Some(1), &theme));
        assert!(text.contains("Question 3/50"));
        assert!(text.contains("Grammar"));
        assert!(text.contains("[1] a"));
        assert!(text.contains("[4] d"));
    }

    #[test]
    fn missing_question_is_explained() {
        let theme = Theme::default();
        let text = rendered(QuestionView::new(None, 0, 1, None, &theme));
        assert!(text.contains("no longer in the bank"));
    }
}
