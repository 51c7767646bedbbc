mod app;
mod config;
mod loader;
mod scale;
mod session;

use eframe::egui;

use crate::app::RulerApp;
use crate::config::RulerConfig;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Load(#[from] loader::LoadError),
    #[error("window system failure: {0}")]
    Eframe(#[from] eframe::Error),
}

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = RulerConfig::load();

    let Some(image_path) = loader::pick_image() else {
        log::info!("no image chosen, exiting");
        return Ok(());
    };

    let image = match loader::load_image(&image_path) {
        Ok(image) => image,
        Err(err) => {
            log::error!("{err}");
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Cannot open image")
                .set_description(err.to_string())
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
            return Err(err.into());
        }
    };

    let title = format!(
        "Digital Ruler - {}",
        image_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_maximized(true)
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(RulerApp::new(config, image)))),
    )?;
    Ok(())
}
