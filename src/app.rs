use eframe::egui;
use image::{imageops::FilterType, DynamicImage};

use crate::config::RulerConfig;
use crate::scale;
use crate::session::{Group, Point, Session, SessionError};

const INSTRUCTIONS: &str = "Select the reference object using left click on the mouse.\n\
                            Select the actual object using right click.";

const REFERENCE_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 120, 255);
const ACTUAL_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 40, 40);

// ── Dialog state ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct Notice {
    title: String,
    body: String,
}

impl From<SessionError> for Notice {
    fn from(err: SessionError) -> Self {
        Self {
            title: err.title().to_owned(),
            body: err.to_string(),
        }
    }
}

fn parse_length(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Pixel of the displayed image under `pos`, if any.
fn canvas_pixel(image_rect: egui::Rect, pos: egui::Pos2, display_size: [u32; 2]) -> Option<(u32, u32)> {
    let rel = pos - image_rect.min;
    if rel.x < 0.0 || rel.y < 0.0 {
        return None;
    }
    let (x, y) = (rel.x.floor() as u32, rel.y.floor() as u32);
    (x < display_size[0] && y < display_size[1]).then_some((x, y))
}

fn pixel_center(image_rect: egui::Rect, p: Point) -> egui::Pos2 {
    image_rect.min + egui::vec2(p.x as f32 + 0.5, p.y as f32 + 0.5)
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct RulerApp {
    config: RulerConfig,
    // Full-resolution image, released once the display texture exists
    raw_image: Option<DynamicImage>,
    texture: Option<egui::TextureHandle>,
    // Canvas size in points
    display_size: [u32; 2],
    monitor_wait_done: bool,

    session: Session,

    notice: Option<Notice>,
    // Text of the open reference-length dialog
    length_entry: Option<String>,
}

impl RulerApp {
    pub fn new(config: RulerConfig, image: DynamicImage) -> Self {
        let notice = config.show_instructions.then(|| Notice {
            title: "Instructions".to_owned(),
            body: INSTRUCTIONS.to_owned(),
        });
        Self {
            config,
            display_size: [image.width(), image.height()],
            raw_image: Some(image),
            texture: None,
            monitor_wait_done: false,
            session: Session::new(),
            notice,
            length_entry: None,
        }
    }

    fn report(&mut self, err: SessionError) {
        log::warn!("{}: {err}", err.title());
        self.notice = Some(Notice::from(err));
    }

    fn capture_click(&mut self, group: Group, pixel: Option<(u32, u32)>) {
        if let Some((x, y)) = pixel {
            self.session.set_point(group, x, y);
        }
    }

    fn submit(&mut self) {
        if let Err(err) = self.session.submit() {
            self.report(err);
        }
    }

    fn apply_length(&mut self, value: Option<f64>) {
        if let Err(err) = self.session.set_reference_length(value) {
            self.report(err);
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() || self.raw_image.is_none() {
            return;
        }
        let screen = match ctx.input(|i| i.viewport().monitor_size) {
            Some(size) => [size.x, size.y],
            // The window system may only report the monitor after the first frame
            None if !self.monitor_wait_done => {
                self.monitor_wait_done = true;
                ctx.request_repaint();
                return;
            }
            None => self.config.fallback_screen_size,
        };
        let Some(img) = self.raw_image.take() else {
            return;
        };
        let image_size = [img.width(), img.height()];
        let factor = scale::fit_scale(image_size, screen, &self.config).unwrap_or(1.0);
        let [w, h] = scale::display_size(image_size, factor);

        let max_side = ctx.input(|i| i.max_texture_side) as u32;
        let texel_factor = scale::texture_scale(image_size, factor, ctx.pixels_per_point(), max_side);
        let [tw, th] = scale::display_size(image_size, texel_factor);
        log::debug!(
            "displaying {}x{} image at {w}x{h} points, {tw}x{th} texels (screen {}x{})",
            image_size[0],
            image_size[1],
            screen[0],
            screen[1]
        );

        let rgba = img.resize_exact(tw, th, FilterType::Lanczos3).to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("photo", color_image, egui::TextureOptions::LINEAR));
        self.display_size = [w, h];
    }

    fn draw_pairs(&self, painter: &egui::Painter, image_rect: egui::Rect) {
        for (group, color) in [(Group::Reference, REFERENCE_COLOR), (Group::Actual, ACTUAL_COLOR)] {
            let pair = self.session.pair(group);
            let start = pair.start().map(|p| pixel_center(image_rect, p));
            let end = pair.end().map(|p| pixel_center(image_rect, p));
            if let (Some(s), Some(e)) = (start, end) {
                painter.line_segment([s, e], egui::Stroke::new(2.0, color));
            }
            for p in [start, end].into_iter().flatten() {
                painter.circle_filled(p, 4.0, color);
                painter.circle_stroke(p, 4.0, egui::Stroke::new(1.0, egui::Color32::WHITE));
            }
        }
    }

    // ── Control panel ───────────────────────────────────────────────────────

    fn group_ui(&mut self, ui: &mut egui::Ui, group: Group) {
        ui.strong(format!("{} Object Coordinates:", group.name()));
        ui.horizontal(|ui| {
            ui.label(self.session.start_label(group));
            ui.separator();
            ui.label(self.session.end_label(group));
        });
        if let Some(px) = self.session.pair(group).pixel_length() {
            ui.weak(format!("{px:.1} px apart"));
        }
        if ui.button(format!("Reset {} Coordinates", group.name())).clicked() {
            self.session.reset(group);
        }
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        self.group_ui(ui, Group::Reference);
        ui.separator();
        self.group_ui(ui, Group::Actual);
        ui.separator();

        ui.strong("Reference Object Length:");
        ui.label(self.session.reference_length_label());
        if ui.button("Set Reference Length").clicked() {
            self.length_entry = Some(String::new());
        }
        ui.separator();

        ui.strong("Actual Object Length:");
        ui.label(self.session.result_label());
        if ui.button("Submit").clicked() {
            self.submit();
        }
    }

    // ── Modals ──────────────────────────────────────────────────────────────

    fn length_entry_ui(&mut self, ctx: &egui::Context) {
        let Some(text) = self.length_entry.as_mut() else {
            return;
        };
        // Some(None) is a cancel, Some(Some(v)) a confirmed value
        let mut outcome: Option<Option<f64>> = None;

        let modal = egui::Modal::new(egui::Id::new("reference_length")).show(ctx, |ui| {
            ui.set_max_width(320.0);
            ui.heading("Input");
            ui.label("Please enter the length of the reference object");
            let edit = ui.text_edit_singleline(text);
            let parsed = parse_length(text);
            if !text.trim().is_empty() && parsed.is_none() {
                ui.colored_label(ui.visuals().error_fg_color, "Not a number");
            }
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                if parsed.is_some() {
                    outcome = Some(parsed);
                }
            } else {
                edit.request_focus();
            }
            ui.separator();
            ui.horizontal(|ui| {
                if ui.add_enabled(parsed.is_some(), egui::Button::new("OK")).clicked() {
                    outcome = Some(parsed);
                }
                if ui.button("Cancel").clicked() {
                    outcome = Some(None);
                }
            });
        });
        if outcome.is_none() && modal.should_close() {
            outcome = Some(None);
        }

        if let Some(value) = outcome {
            self.length_entry = None;
            self.apply_length(value);
        }
    }

    fn notice_ui(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };
        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("notice")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.heading(&notice.title);
            ui.label(&notice.body);
            ui.separator();
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
        if dismissed || modal.should_close() {
            self.notice = None;
        }
    }

    // ── Frame ───────────────────────────────────────────────────────────────

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = self.texture.clone() else {
            ui.spinner();
            return;
        };
        let [w, h] = self.display_size;
        let (response, painter) =
            ui.allocate_painter(egui::vec2(w as f32, h as f32), egui::Sense::click());
        let image_rect = response.rect;

        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
        self.draw_pairs(&painter, image_rect);

        let pixel = response
            .interact_pointer_pos()
            .and_then(|pos| canvas_pixel(image_rect, pos, self.display_size));
        if response.clicked_by(egui::PointerButton::Primary) {
            self.capture_click(Group::Reference, pixel);
        } else if response.clicked_by(egui::PointerButton::Secondary) {
            self.capture_click(Group::Actual, pixel);
        }
    }

    fn show(&mut self, ctx: &egui::Context) {
        self.ensure_texture(ctx);

        egui::SidePanel::right("controls")
            .resizable(false)
            .min_width(240.0)
            .show(ctx, |ui| self.controls_ui(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas_ui(ui));

        self.length_entry_ui(ctx);
        self.notice_ui(ctx);
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for RulerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}
