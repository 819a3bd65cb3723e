use eframe::egui;

use crate::chatapp::{ChatApp, Thumbnails};
use crate::controller::Intent;
use crate::message::Message;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0xF8, 0xF8, 0xF8);
const SIDEBAR_GREEN: egui::Color32 = egui::Color32::from_rgb(0x4C, 0xAF, 0x50);
const LIGHT_GREEN: egui::Color32 = egui::Color32::from_rgb(0x90, 0xEE, 0x90);
const BORDER: egui::Color32 = egui::Color32::from_rgb(0xE0, 0xE0, 0xE0);
const TEXT: egui::Color32 = egui::Color32::from_rgb(0x33, 0x33, 0x33);
const BUBBLE_WIDTH: f32 = 400.0;

const DISCLAIMER: &str = "medmed is an AI assistant and does not provide medical diagnosis. \
    In an emergency, contact your local emergency services.";

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_turn();

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(200.0)
            .frame(egui::Frame::none().fill(SIDEBAR_GREEN).inner_margin(10.0))
            .show(ctx, |ui| self.render_sidebar(ui));

        egui::TopBottomPanel::bottom("input_area")
            .frame(egui::Frame::none().fill(BACKGROUND).inner_margin(10.0))
            .show(ctx, |ui| self.render_input_area(ui, ctx));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::WHITE).inner_margin(10.0))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .stick_to_bottom(true)
                    .show(ui, |ui| self.render_messages(ui, ctx));
            });
    }
}

impl ChatApp {
    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("medmed")
                    .size(24.0)
                    .strong()
                    .color(egui::Color32::WHITE),
            );
        });
        ui.add_space(40.0);

        // Navigation placeholder, there is only one screen.
        ui.add_sized(
            [ui.available_width(), 28.0],
            egui::Button::new(egui::RichText::new("🏠 Home").color(TEXT)).fill(LIGHT_GREEN),
        );

        if let Some(model) = self.model_name() {
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(model).small().color(egui::Color32::WHITE));
            });
        }
    }

    fn render_messages(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        for message in &self.messages {
            render_message(ui, ctx, message, self.bot_icon.as_ref(), &mut self.thumbnails);
        }

        if let Some(message) = &self.in_flight {
            render_message(ui, ctx, message, self.bot_icon.as_ref(), &mut self.thumbnails);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("medmed is thinking...").italics().color(TEXT));
            });
        }
    }

    fn render_input_area(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let busy = self.is_busy();

        if let Some(name) = self.attachment_name() {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("🖼 Attached image: {name}")).color(TEXT));
                if ui.small_button("✖").on_hover_text("Remove attachment").clicked() {
                    self.apply_local(Intent::ClearAttachment);
                }
            });
        }

        ui.horizontal(|ui| {
            ui.add_enabled_ui(!busy, |ui| {
                if ui.button("🖼 Attach").clicked() {
                    self.pick_attachment();
                }

                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.input)
                        .hint_text("Type your question... (Enter to send)")
                        .desired_width(ui.available_width() - 70.0),
                );
                let enter_pressed =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                if ui.button("Send").clicked() || enter_pressed {
                    self.send_message(ctx);
                    response.request_focus();
                }
            });
        });

        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(DISCLAIMER)
                .size(10.0)
                .color(egui::Color32::from_gray(0x99)),
        );
    }
}

fn render_message(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    message: &Message,
    bot_icon: Option<&egui::TextureHandle>,
    thumbnails: &mut Thumbnails,
) {
    let (fill, stroke, layout) = if message.is_user() {
        (LIGHT_GREEN, LIGHT_GREEN, egui::Layout::right_to_left(egui::Align::TOP))
    } else {
        (egui::Color32::WHITE, BORDER, egui::Layout::left_to_right(egui::Align::TOP))
    };

    let mut text = message.text.clone();
    let thumbnail = match &message.image {
        Some(path) => match thumbnails.get(ctx, path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                text = format!("Error displaying the image: {e}\n\n{text}");
                None
            }
        },
        None => None,
    };

    ui.add_space(5.0);
    ui.with_layout(layout, |ui| {
        if !message.is_user() {
            if let Some(icon) = bot_icon {
                ui.add(egui::Image::from_texture(icon).fit_to_exact_size(icon.size_vec2()));
            }
        }

        egui::Frame::none()
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, stroke))
            .rounding(8.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_max_width(BUBBLE_WIDTH);
                ui.vertical(|ui| {
                    if let Some(texture) = &thumbnail {
                        ui.add(egui::Image::from_texture(texture).fit_to_exact_size(texture.size_vec2()));
                        ui.add_space(10.0);
                    }
                    ui.add(egui::Label::new(egui::RichText::new(text).color(TEXT)).wrap(true));
                });
            });
    });
}
