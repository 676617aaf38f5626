use leveltest::error::TestError;
use leveltest::placement::PlacementTest;
use leveltest::session::result::TestResult;
use leveltest::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Test,
    ConfirmFinish,
    Result,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub screen: AppScreen,
    pub test: PlacementTest,
    pub theme: &'static Theme,
    pub result: Option<TestResult>,
    pub status: Option<Status>,
    pub result_scroll: u16,
    pub should_quit: bool,
}

impl App {
    /// Expects a test that was just started or resumed.
    pub fn new(test: PlacementTest, theme: &'static Theme) -> Self {
        let screen = if test.state().is_some() {
            AppScreen::Test
        } else {
            AppScreen::Result
        };
        let result = test.last_result();
        Self {
            screen,
            test,
            theme,
            result,
            status: None,
            result_scroll: 0,
            should_quit: false,
        }
    }

    fn report(&mut self, outcome: Result<(), TestError>) {
        self.status = outcome.err().map(|e| Status {
            text: e.to_string(),
            is_error: true,
        });
    }

    /// `choice` is zero-based.
    pub fn answer(&mut self, choice: usize) {
        let outcome = self.test.answer(choice).map(|_| ());
        self.report(outcome);
    }

    pub fn next_question(&mut self) {
        let outcome = self.test.next().map(|_| ());
        self.report(outcome);
    }

    pub fn prev_question(&mut self) {
        let outcome = self.test.prev().map(|_| ());
        self.report(outcome);
    }

    pub fn unanswered(&self) -> usize {
        self.test
            .state()
            .map_or(0, |s| s.len() - s.answered_count())
    }

    /// Finish right away when everything is answered, otherwise ask first.
    pub fn request_finish(&mut self) {
        if self.unanswered() > 0 {
            self.screen = AppScreen::ConfirmFinish;
        } else {
            self.finish();
        }
    }

    pub fn cancel_finish(&mut self) {
        self.screen = AppScreen::Test;
    }

    pub fn finish(&mut self) {
        match self.test.finish() {
            Ok(result) => {
                self.result = Some(result);
                self.result_scroll = 0;
                self.screen = AppScreen::Result;
                self.status = Some(Status {
                    text: "Result saved. Registration is now unlocked.".to_string(),
                    is_error: false,
                });
            }
            Err(e) => {
                self.screen = AppScreen::Test;
                self.report(Err(e));
            }
        }
    }

    pub fn scroll_result(&mut self, delta: i16) {
        self.result_scroll = self.result_scroll.saturating_add_signed(delta);
    }

    pub fn quit(&mut self) {
        if let Some(state) = self.test.state() {
            tracing::info!(
                attempt = state.attempt,
                answered = state.answered_count(),
                "quit with progress saved"
            );
        }
        self.should_quit = true;
    }
}
