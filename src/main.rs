//! SnowFX demo - snowfall over an egui canvas
//!
//! Drives the particle system with egui's repaint request as the frame
//! scheduler and replays the recorded frame onto the panel painter.

use eframe::egui;
use snowfx::{BufferCanvas, FrameHandle, FrameScheduler, SnowParticleSystem, SnowPreset};

/// Frame scheduler backed by `egui::Context::request_repaint`. Repaints
/// cannot be truly cancelled; the system's stale-handle check covers the
/// frames that still fire after a cancel.
struct RepaintScheduler {
    ctx: egui::Context,
    next: u64,
}

impl RepaintScheduler {
    fn new(ctx: egui::Context) -> Self {
        Self { ctx, next: 0 }
    }
}

impl FrameScheduler for RepaintScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.ctx.request_repaint();
        self.next += 1;
        FrameHandle(self.next)
    }

    fn cancel(&mut self, _handle: FrameHandle) {}
}

struct SnowDemoApp {
    system: SnowParticleSystem<BufferCanvas, RepaintScheduler>,
}

impl SnowDemoApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let scheduler = RepaintScheduler::new(cc.egui_ctx.clone());
        let canvas = BufferCanvas::new(1280.0, 720.0);
        let mut system = SnowParticleSystem::new(canvas, scheduler);
        system.start();
        Self { system }
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let toggle = if self.system.is_running() {
                    "Stop"
                } else {
                    "Start"
                };
                if ui.button(toggle).clicked() {
                    if self.system.is_running() {
                        self.system.stop();
                    } else {
                        self.system.start();
                    }
                }
                if ui.button("Reset").clicked() {
                    self.system.reset();
                }

                ui.separator();
                for preset in SnowPreset::all() {
                    if ui.button(preset.name()).clicked() {
                        self.system.use_preset(preset.name());
                    }
                }

                ui.separator();
                let mut blizzard = self.system.options().blizzard_mode;
                if ui.checkbox(&mut blizzard, "Blizzard").changed() {
                    self.system.set_blizzard_mode(blizzard);
                }

                ui.separator();
                ui.label(format!("{} particles", self.system.particle_count()));
            });
        });
    }
}

impl eframe::App for SnowDemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_controls(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            self.system.canvas_mut().set_size(rect.width(), rect.height());

            // One scheduled frame fires per egui repaint
            if let Some(handle) = self.system.pending_frame() {
                self.system.on_frame(handle);
            }

            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(6, 10, 22));
            self.system.canvas().paint_to(&painter, rect);
        });
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("SnowFX Demo")
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SnowFX Demo",
        options,
        Box::new(|cc| Box::new(SnowDemoApp::new(cc))),
    )
}
