use clap::{Args, ValueEnum};
use mindguard_core::Catalog;

#[derive(Clone, Copy, ValueEnum)]
pub enum CatalogSection {
    Messages,
    Breaks,
    Content,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Print only one section
    #[arg(long, value_enum)]
    section: Option<CatalogSection>,
}

pub fn run(args: CatalogArgs) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::default();
    let json = match args.section {
        None => serde_json::to_string_pretty(&catalog)?,
        Some(CatalogSection::Messages) => serde_json::to_string_pretty(&catalog.messages)?,
        Some(CatalogSection::Breaks) => serde_json::to_string_pretty(&catalog.breaks)?,
        Some(CatalogSection::Content) => serde_json::to_string_pretty(&catalog.content)?,
    };
    println!("{json}");
    Ok(())
}
