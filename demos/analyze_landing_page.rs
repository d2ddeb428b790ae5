use anyhow::{Context, Result};
use culturecoded::{AnalyzeRequest, Client, DesignType, ExportFormat, ExportRequest, Priority};
use std::path::Path;

fn main() -> Result<()> {
    // Configure authentication via env vars or a `.culturecodedrc` file.
    let client = Client::from_env()?.with_progress(true);

    let user = client.get_user()?;
    eprintln!("Signed in as {} ({} tier, {} credits)", user.email, user.tier, user.credits);

    let request = AnalyzeRequest::from_url(
        "https://example.com/landing.png",
        "West Africa",
        "Nigeria",
        DesignType::LandingPage,
    )
    .with_industry("fintech");

    let analysis = client
        .analyze_design(&request)
        .context("analysis request failed")?;
    eprintln!("Analysis {} for {}", analysis.id, analysis.country);
    for rec in analysis.recommendations_with(Priority::High) {
        eprintln!("- [{}] {}", rec.category, rec.suggestion);
    }

    let export = client.export_analysis(&ExportRequest::new(&analysis.id, ExportFormat::Pdf))?;
    if export.download_url.is_some() {
        let path = client.download_export(&export, Path::new("analysis.pdf"))?;
        eprintln!("Saved report to {}", path.display());
    }
    Ok(())
}
