use crate::cli::GenerateArgs;
use crate::dataset::DatasetFile;
use crate::error::Result;
use ptmcharge::core::models::synthetic::SyntheticDatasetBuilder;
use tracing::info;

pub async fn run(args: GenerateArgs) -> Result<()> {
    let dataset = SyntheticDatasetBuilder::new(args.sites)
        .charge_range(args.min_charge, args.max_charge)
        .copies(args.copies)
        .seed(args.seed)
        .build()?;

    info!(
        sites = dataset.len(),
        total_copies = dataset.total_copies(),
        seed = args.seed,
        "Generated synthetic dataset."
    );

    DatasetFile::from(&dataset).write_to(&args.output)?;
    println!(
        "✓ {} site(s), {} total copies written to: {}",
        dataset.len(),
        dataset.total_copies(),
        args.output.display()
    );
    Ok(())
}
