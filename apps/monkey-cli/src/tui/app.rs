use monkey_presenter::Presenter;

/// TUI state wrapped around the presenter session.
pub struct App {
    pub presenter: Presenter,
    pub status: Option<String>,
    pub finished: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(presenter: Presenter) -> Self {
        Self {
            presenter,
            status: None,
            finished: false,
            should_quit: false,
        }
    }

    pub fn connection_label(&self) -> &'static str {
        if self.presenter.is_connected() {
            "● connected"
        } else {
            "○ disconnected"
        }
    }
}
