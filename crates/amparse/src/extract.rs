use crate::prelude::{eprintln, *};

use amendments::{emit, JsonStyle, LayoutConfig};

#[derive(Debug, clap::Parser)]
#[command(name = "extract")]
#[command(about = "Parse an EP amendments PDF into structured JSON records")]
pub struct App {
    /// Path to the amendments PDF
    pub path: std::path::PathBuf,

    /// Output JSON file
    #[arg(short, long, default_value = "amendments.json")]
    pub output: std::path::PathBuf,

    /// Emit compact JSON instead of indented
    #[arg(long)]
    pub compact: bool,
}

pub fn run(app: App) -> Result<()> {
    let cfg = LayoutConfig::default();

    eprintln!("Extracting fragments from {} ...", app.path.display());
    let bytes = std::fs::read(&app.path)
        .wrap_err_with(|| f!("cannot read {}", app.path.display()))?;
    let backend = amendments::extract::LopdfBackend::load_bytes(&bytes)?;
    let fragments = amendments::extract::extract_all_fragments(&backend, &cfg)?;
    eprintln!("  {} fragments extracted", fragments.len());

    let lines = amendments::lines::assemble_lines(fragments, &cfg);
    eprintln!("  {} logical lines assembled", lines.len());

    let records = amendments::segment_lines(&lines, &cfg)?;
    eprintln!("  {} amendments parsed", records.len());

    let style = if app.compact {
        JsonStyle::Compact
    } else {
        JsonStyle::Indented
    };
    let json = emit::to_json(&records, style)?;
    std::fs::write(&app.output, json)
        .wrap_err_with(|| f!("cannot write {}", app.output.display()))?;
    eprintln!("Written to {}", app.output.display());

    let with_warnings = records.iter().filter(|a| !a.warnings.is_empty()).count();
    eprintln!("Amendments with warnings: {}", with_warnings);

    Ok(())
}
