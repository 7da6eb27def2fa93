use anyhow::Result;
use assistant::{ChatPanel, PanelAction, SendOutcome, ThreadDispatcher};
use clap::Parser;
use eframe::egui;
use providers::{GeminiClient, TextGenerator};
use shared::chat::{ChatMessage, Sender};
use shared::settings::{AnalysisScope, ChatMode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod utils;
mod workspace;

use workspace::Workspace;

/// Gemini side panel for asking about and editing code
#[derive(Parser, Debug)]
#[command(name = "gemini-panel", version, about)]
struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// File to open in the editor pane at startup
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Gemini model for this session, e.g. gemini-1.5-flash
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let store = utils::open_settings_store();
    let settings = utils::startup_settings(
        store.as_ref(),
        std::env::var("GEMINI_API_KEY").ok(),
        cli.model.clone(),
    );
    let client = GeminiClient::new(&settings.model)?;
    let panel = ChatPanel::new(settings, store, client, Box::new(ThreadDispatcher));

    let root = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut app = GeminiPanelApp::new(panel, Workspace::new(root));
    if let Some(file) = &cli.file {
        app.open_path(file);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };
    eframe::run_native("Gemini Panel", options, Box::new(move |_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("failed to start window: {}", e))
}

struct GeminiPanelApp {
    panel: ChatPanel<GeminiClient>,
    workspace: Workspace,
    show_panel: bool,
    show_settings: bool,
    api_key_draft: String,
    status: Option<String>,
}

impl GeminiPanelApp {
    fn new(panel: ChatPanel<GeminiClient>, workspace: Workspace) -> Self {
        let api_key_draft = panel.settings().api_key.clone();
        Self {
            panel,
            workspace,
            show_panel: true,
            show_settings: false,
            api_key_draft,
            status: None,
        }
    }

    /// Editor action: set mode and scope, then reveal the panel.
    fn trigger(&mut self, action: PanelAction) {
        self.panel.apply_action(action);
        self.show_panel = true;
    }

    fn open_file_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_directory(self.workspace.root())
            .pick_file();
        if let Some(path) = picked {
            self.open_path(&path);
        }
    }

    fn open_path(&mut self, path: &Path) {
        match self.workspace.open_file(path) {
            Ok(()) => self.status = None,
            Err(e) => {
                tracing::warn!("{:#}", e);
                self.status = Some(format!("{:#}", e));
            }
        }
    }

    fn send(&mut self) {
        let outcome = self.panel.send(&self.workspace);
        if outcome != SendOutcome::Ignored {
            tracing::debug!(?outcome, "send");
        }
    }

    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(self.workspace.name());
                ui.separator();

                if ui.button("Open File…").clicked() {
                    self.open_file_dialog();
                }

                for action in [PanelAction::Ask, PanelAction::Edit] {
                    let enabled = action.is_enabled(&self.workspace);
                    if ui
                        .add_enabled(enabled, egui::Button::new(action.label()))
                        .clicked()
                    {
                        self.trigger(action);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.api_key_draft = self.panel.settings().api_key.clone();
                        self.show_settings = true;
                    }
                    ui.toggle_value(&mut self.show_panel, "Gemini AI");
                });
            });

            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::from_rgb(200, 80, 80), status);
            }
            ui.add_space(4.0);
        });
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("gemini_panel")
            .resizable(true)
            .default_width(440.0)
            .min_width(320.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label("Mode:");
                    let mut mode = self.panel.settings().chat_mode;
                    egui::ComboBox::from_id_source("chat_mode")
                        .selected_text(mode.display_name())
                        .show_ui(ui, |ui| {
                            for m in ChatMode::all() {
                                ui.selectable_value(&mut mode, *m, m.display_name());
                            }
                        });
                    self.panel.set_chat_mode(mode);

                    ui.add_space(10.0);
                    ui.label("Scope:");
                    let mut scope = self.panel.settings().analysis_scope;
                    egui::ComboBox::from_id_source("analysis_scope")
                        .selected_text(scope.display_name())
                        .show_ui(ui, |ui| {
                            for s in AnalysisScope::all() {
                                ui.selectable_value(&mut scope, *s, s.display_name());
                            }
                        });
                    self.panel.set_analysis_scope(scope);
                });
                ui.separator();

                egui::TopBottomPanel::bottom("chat_input").show_inside(ui, |ui| {
                    ui.add_space(6.0);
                    let response = ui.add(
                        egui::TextEdit::multiline(self.panel.input_mut())
                            .desired_rows(3)
                            .desired_width(f32::INFINITY)
                            .hint_text("Ask about your code (Ctrl+Enter to send)"),
                    );
                    let ctrl_enter = response.has_focus()
                        && ui.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Enter));

                    ui.horizontal(|ui| {
                        let send = ui.add_enabled(self.panel.can_send(), egui::Button::new("Send"));
                        if ui.button("Clear").clicked() {
                            self.panel.clear_transcript();
                        }
                        if ui
                            .button("Copy All")
                            .on_hover_text("Copy the transcript to the clipboard")
                            .clicked()
                        {
                            let text = self.panel.transcript().render();
                            ui.output_mut(|o| o.copied_text = text);
                        }
                        if self.panel.is_waiting() {
                            ui.spinner();
                            ui.label(egui::RichText::new("Waiting for Gemini").italics().weak());
                        }
                        if (send.clicked() || ctrl_enter) && self.panel.can_send() {
                            self.send();
                        }
                    });
                    ui.add_space(6.0);
                });

                egui::CentralPanel::default().show_inside(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .stick_to_bottom(true)
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            for entry in self.panel.transcript().entries() {
                                render_entry(ui, entry);
                            }
                        });
                });
            });
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let mut close = false;
        egui::CentralPanel::default().show(ctx, |ui| match self.workspace.open_file_mut() {
            Some(file) => {
                ui.horizontal(|ui| {
                    ui.strong(file.name());
                    ui.label(egui::RichText::new(file.path.display().to_string()).weak());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        close = ui.small_button("Close").clicked();
                    });
                });
                ui.separator();
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        let output = egui::TextEdit::multiline(&mut file.text)
                            .code_editor()
                            .desired_width(f32::INFINITY)
                            .show(ui);
                        // Keep the last selection while focus is elsewhere (e.g. the chat input).
                        if let Some(range) = output.cursor_range {
                            let a = range.primary.ccursor.index;
                            let b = range.secondary.ccursor.index;
                            file.selection = (a != b).then(|| a.min(b)..a.max(b));
                        }
                    });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("No file open. Use \"Open File…\" to choose one.");
                });
            }
        });
        if close {
            self.workspace.close_file();
        }
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let mut open = true;
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            open = false;
        }

        let mut wants_close = false;
        egui::Window::new("Gemini AI Agent")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([8.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Gemini API Key:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.api_key_draft)
                                .password(true)
                                .desired_width(280.0),
                        );
                        ui.end_row();

                        ui.label("Model:");
                        ui.label(self.panel.client().model());
                        ui.end_row();
                    });

                if !self.panel.client().is_configured() {
                    ui.colored_label(
                        egui::Color32::from_rgb(200, 150, 80),
                        "No API key configured.",
                    );
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    let modified = self.api_key_draft != self.panel.settings().api_key;
                    if ui
                        .add_enabled(modified, egui::Button::new("Apply"))
                        .clicked()
                    {
                        self.panel.apply_api_key(&self.api_key_draft);
                    }
                    if ui.button("Reset").clicked() {
                        self.api_key_draft = self.panel.settings().api_key.clone();
                    }
                    if ui.button("Done").clicked() {
                        wants_close = true;
                    }
                });
            });

        if !open || wants_close {
            self.show_settings = false;
        }
    }
}

impl eframe::App for GeminiPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Replies are delivered here, on the UI thread.
        self.panel.poll_reply();
        if self.panel.is_waiting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.render_toolbar(ctx);
        if self.show_panel {
            self.render_chat_panel(ctx);
        }
        self.render_editor(ctx);
        if self.show_settings {
            self.render_settings(ctx);
        }
    }
}

fn sender_color(sender: Sender) -> egui::Color32 {
    match sender {
        Sender::User => egui::Color32::from_rgb(70, 130, 180),
        Sender::Gemini => egui::Color32::from_rgb(90, 160, 110),
        Sender::System => egui::Color32::from_rgb(150, 150, 165),
    }
}

fn render_entry(ui: &mut egui::Ui, entry: &ChatMessage) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(entry.sender.label())
                        .strong()
                        .color(sender_color(entry.sender)),
                );
                ui.label(egui::RichText::new(&entry.timestamp).small().weak());
                if entry.sender == Sender::Gemini
                    && ui
                        .small_button("Copy")
                        .on_hover_text("Copy to clipboard")
                        .clicked()
                {
                    ui.output_mut(|o| o.copied_text = entry.text.clone());
                }
            });

            // Odd segments sit between ``` fences.
            for (i, segment) in entry.text.split("```").enumerate() {
                if i % 2 == 1 {
                    let code = segment
                        .split_once('\n')
                        .map(|(_lang, rest)| rest)
                        .unwrap_or(segment);
                    egui::Frame::none()
                        .fill(ui.visuals().extreme_bg_color)
                        .inner_margin(egui::Margin::same(6.0))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(code.trim_end()).monospace());
                        });
                } else if !segment.trim().is_empty() {
                    ui.label(segment.trim());
                }
            }
        });
    ui.add_space(4.0);
}
