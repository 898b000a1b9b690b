use crate::prelude::{println, *};

use amendments::LayoutConfig;

#[derive(Debug, clap::Parser)]
#[command(name = "lines")]
#[command(about = "Dump assembled logical lines for layout-threshold debugging")]
pub struct App {
    /// Path to the amendments PDF
    pub path: std::path::PathBuf,
}

/// Print one row per assembled line: page, y, min x, bold flag, max font
/// size, then the joined text.  Useful when tuning [`LayoutConfig`]
/// thresholds against a new document family.
pub fn run(app: App) -> Result<()> {
    let cfg = LayoutConfig::default();

    let bytes = std::fs::read(&app.path)
        .wrap_err_with(|| f!("cannot read {}", app.path.display()))?;
    let backend = amendments::extract::LopdfBackend::load_bytes(&bytes)?;
    let fragments = amendments::extract::extract_all_fragments(&backend, &cfg)?;
    let lines = amendments::lines::assemble_lines(fragments, &cfg);

    for line in &lines {
        println!(
            "p{:<3} y{:7.1} x{:7.1} {} {:5.1}  {}",
            line.page,
            line.y,
            line.min_x(),
            if line.is_bold() { "B" } else { "." },
            line.max_font_size(),
            line.text(),
        );
    }

    Ok(())
}
