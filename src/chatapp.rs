use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui;
use poll_promise::Promise;
use tokio::runtime::Runtime;

use crate::controller::{ChatController, Intent, Turn, DEFAULT_IMAGE_QUESTION};
use crate::message::Message;

const BOT_ICON_SIZE: u32 = 30;
const THUMBNAIL_SIZE: u32 = 150;

pub struct ChatApp {
    pub runtime: Runtime,
    /// Moved into the worker while a turn is running.
    pub controller: Option<ChatController>,
    pub pending_turn: Option<Promise<(ChatController, Option<Turn>)>>,
    /// User line shown while its reply is still on the way.
    pub in_flight: Option<Message>,
    pub messages: Vec<Message>,
    pub input: String,
    pub bot_icon: Option<egui::TextureHandle>,
    pub thumbnails: Thumbnails,
    pub model: Option<String>,
}

impl ChatApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Runtime,
        controller: ChatController,
        first_message: String,
        icon_path: &Path,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let bot_icon = match load_texture(&cc.egui_ctx, "bot_icon", icon_path, BOT_ICON_SIZE) {
            Ok(texture) => Some(texture),
            Err(e) => {
                tracing::warn!(path = %icon_path.display(), error = %e, "bot icon unavailable, messages will show without it");
                None
            }
        };

        let model = controller
            .relay()
            .session()
            .map(|s| s.model().to_string());

        Self {
            runtime,
            controller: Some(controller),
            pending_turn: None,
            in_flight: None,
            messages: vec![Message::assistant(first_message)],
            input: String::new(),
            bot_icon,
            thumbnails: Thumbnails::default(),
            model,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_turn.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn attachment_name(&self) -> Option<String> {
        self.controller
            .as_ref()
            .and_then(|c| c.pending().file_name())
    }

    /// Attach/clear never reach the network, so they run inline.
    pub fn apply_local(&mut self, intent: Intent) {
        if let Some(controller) = self.controller.as_mut() {
            self.runtime.block_on(controller.handle(intent));
        }
    }

    pub fn pick_attachment(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select image")
            .add_filter("Image files", &["png", "jpg", "jpeg"])
            .add_filter("All files", &["*"])
            .pick_file();

        if let Some(path) = picked {
            self.apply_local(Intent::Attach(path));
        }
    }

    pub fn send_message(&mut self, ctx: &egui::Context) {
        if self.is_busy() {
            return;
        }
        let has_attachment = self.attachment_name().is_some();
        if self.input.trim().is_empty() && !has_attachment {
            return;
        }
        let Some(mut controller) = self.controller.take() else {
            return;
        };

        let text = std::mem::take(&mut self.input);
        let preview_text = match text.trim() {
            "" => DEFAULT_IMAGE_QUESTION.to_string(),
            trimmed => trimmed.to_string(),
        };
        self.in_flight = Some(Message::user(
            preview_text,
            controller.pending().path().map(Path::to_path_buf),
        ));

        let handle = self.runtime.handle().clone();
        let ctx = ctx.clone();
        self.pending_turn = Some(Promise::spawn_thread("medmed_turn", move || {
            let turn = handle.block_on(controller.handle(Intent::Send(text)));
            ctx.request_repaint();
            (controller, turn)
        }));
    }

    pub fn process_turn(&mut self) {
        let Some(promise) = self.pending_turn.take() else {
            return;
        };

        match promise.try_take() {
            Ok((controller, turn)) => {
                self.controller = Some(controller);
                self.in_flight = None;
                if let Some(turn) = turn {
                    self.messages.push(turn.user);
                    self.messages.push(turn.reply);
                }
            }
            Err(promise) => self.pending_turn = Some(promise),
        }
    }
}

/// Preview textures for attached images, decoded once per path.
#[derive(Default)]
pub struct Thumbnails {
    cache: HashMap<PathBuf, Result<egui::TextureHandle, String>>,
}

impl Thumbnails {
    pub fn get(&mut self, ctx: &egui::Context, path: &Path) -> Result<egui::TextureHandle, String> {
        self.cache
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                let name = format!("thumb:{}", path.display());
                load_texture(ctx, &name, path, THUMBNAIL_SIZE).map_err(|e| format!("{e:#}"))
            })
            .clone()
    }
}

fn load_texture(ctx: &egui::Context, name: &str, path: &Path, size: u32) -> Result<egui::TextureHandle> {
    let img = image::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .thumbnail(size, size)
        .to_rgba8();

    let color_image = egui::ColorImage::from_rgba_unmultiplied(
        [img.width() as usize, img.height() as usize],
        img.as_raw(),
    );
    Ok(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
}
