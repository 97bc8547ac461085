//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::config::Config;
use crate::messages::ui_events::ViewKind;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use crate::routes::Route;

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    start_route: Route,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        config: Config,
        start_route: Route,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(config),
            start_route,
            network_tx,
            render_tx,
        }
    }

    fn send_all(&self, commands: Vec<NetworkCommand>) {
        for cmd in commands {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let route = std::mem::take(&mut self.start_route);
        tracing::info!(%route, "Opening start route");
        let commands = self.state.start(route);
        self.send_all(commands);
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    let commands = self.state.handle_response(response);
                    self.send_all(commands);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let view = self.state.view_kind();

        let commands = match event {
            // Navigation
            UiEvent::Back => self.state.back(),
            UiEvent::Reload => self.state.reload(),
            UiEvent::Up => match view {
                ViewKind::Home => {
                    self.state.home_up();
                    Vec::new()
                }
                ViewKind::Manga => {
                    self.state.manga_up();
                    Vec::new()
                }
                ViewKind::Reader => Vec::new(),
            },
            UiEvent::Down => match view {
                ViewKind::Home => {
                    self.state.home_down();
                    Vec::new()
                }
                ViewKind::Manga => {
                    self.state.manga_down();
                    Vec::new()
                }
                ViewKind::Reader => Vec::new(),
            },
            UiEvent::Left => match view {
                ViewKind::Home => {
                    self.state.home_prev_page();
                    Vec::new()
                }
                ViewKind::Reader => self.state.reader_prev(),
                ViewKind::Manga => Vec::new(),
            },
            UiEvent::Right => match view {
                ViewKind::Home => {
                    self.state.home_next_page();
                    Vec::new()
                }
                ViewKind::Reader => self.state.reader_next(),
                ViewKind::Manga => Vec::new(),
            },
            UiEvent::Select => match view {
                ViewKind::Home => self.state.home_select(),
                ViewKind::Manga => self.state.manga_select(),
                ViewKind::Reader => self.state.confirm_page_jump(),
            },
            UiEvent::FirstPage => match view {
                ViewKind::Manga => {
                    self.state.manga_first();
                    Vec::new()
                }
                ViewKind::Reader => self.state.reader_first(),
                ViewKind::Home => Vec::new(),
            },
            UiEvent::LastPage => match view {
                ViewKind::Manga => {
                    self.state.manga_last();
                    Vec::new()
                }
                ViewKind::Reader => self.state.reader_last(),
                ViewKind::Home => Vec::new(),
            },

            // Home
            UiEvent::StartSearch => {
                self.state.start_search();
                Vec::new()
            }
            UiEvent::SearchChar(c) => {
                self.state.search_char(c);
                Vec::new()
            }
            UiEvent::SearchBackspace => {
                self.state.search_backspace();
                Vec::new()
            }
            UiEvent::SubmitSearch => self.state.submit_search(),
            UiEvent::StopSearch => {
                self.state.stop_search();
                Vec::new()
            }
            UiEvent::CycleSource => self.state.cycle_source(),

            // Reader
            UiEvent::ToggleDataSaver => self.state.toggle_data_saver(),
            UiEvent::PageDigit(c) => {
                self.state.page_digit(c);
                Vec::new()
            }

            // Popups
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                Vec::new()
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                Vec::new()
            }

            // System
            UiEvent::Quit => return true,
        };

        self.send_all(commands);
        false
    }
}
