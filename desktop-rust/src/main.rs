mod app;
mod io;
mod model;

use app::{configure_fonts, DashboardApp};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();
    let ctx = io::load_context(&args)?;
    let app = DashboardApp::new(ctx)?;

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Bird Conservation Predictor",
        options,
        Box::new(|cc| {
            configure_fonts(&cc.egui_ctx);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
