use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::state::TestState;
use crate::ui::theme::Theme;

const CELL_WIDTH: u16 = 4;

/// Numbered overview of every question: answered, unanswered, current.
pub struct AnswerGrid<'a> {
    state: &'a TestState,
    theme: &'a Theme,
}

impl<'a> AnswerGrid<'a> {
    pub fn new(state: &'a TestState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl Widget for AnswerGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(
                " {}/{} answered ",
                self.state.answered_count(),
                self.state.len()
            ))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let per_row = (inner.width / CELL_WIDTH).max(1) as usize;
        let lines: Vec<Line> = self
            .state
            .answers
            .chunks(per_row)
            .enumerate()
            .map(|(row, chunk)| {
                let spans: Vec<Span> = chunk
                    .iter()
                    .enumerate()
                    .map(|(col, answer)| {
                        let i = row * per_row + col;
                        let mut style = if answer.is_some() {
                            Style::default().fg(colors.success())
                        } else {
                            Style::default().fg(colors.muted())
                        };
                        if i == self.state.current {
                            style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
                        }
                        Span::styled(format!("{:>3} ", i + 1), style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
