use crate::cli::{ComputeArgs, MethodChoice};
use crate::config::PartialEngineConfig;
use crate::dataset::load_dataset;
use crate::error::Result;
use crate::output::{render_compute, write_csv};
use crate::utils::progress::CliProgressHandler;
use ptmcharge::engine::cancel::CancellationToken;
use ptmcharge::engine::progress::ProgressReporter;
use ptmcharge::workflows;
use tracing::info;

pub async fn run(args: ComputeArgs, cancel: CancellationToken) -> Result<()> {
    let config =
        PartialEngineConfig::load(args.engine.config.as_deref(), &args.engine.set_values)?;
    let dataset = load_dataset(&args.engine.input)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(method = %args.method, "Invoking the compute workflow...");
    let result = tokio::task::block_in_place(|| match args.method {
        MethodChoice::Auto => workflows::compute::run(&dataset, &config, &reporter, &cancel),
        MethodChoice::Fixed(method) => {
            workflows::compute::run_with_method(&dataset, method, &config, &reporter, &cancel)
        }
    })?;

    println!("{}", render_compute(&result, args.window));

    if let Some(path) = &args.output {
        info!("Writing distribution to {:?}", path);
        write_csv(path, &result.distribution)?;
        println!("✓ Distribution written to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::EngineArgs;
    use crate::output::DisplayWindow;
    use ptmcharge::engine::methods::Method;
    use std::path::Path;
    use tempfile::tempdir;

    const SITES: &str = r#"
[[sites]]
id = "K12"
copies = 2
probabilities = { "-1" = 0.2, "0" = 0.6, "+1" = 0.2 }
"#;

    fn args(input: &Path, output: &Path, method: MethodChoice) -> ComputeArgs {
        ComputeArgs {
            engine: EngineArgs {
                input: input.to_path_buf(),
                config: None,
                set_values: vec![],
            },
            method,
            window: DisplayWindow::new(-1, 1).unwrap(),
            output: Some(output.to_path_buf()),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn compute_writes_the_full_distribution_as_csv() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("sites.toml");
        let output = dir.path().join("pmf.csv");
        std::fs::write(&input, SITES).unwrap();

        run(
            args(&input, &output, MethodChoice::Fixed(Method::Exact)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows[0], "charge,probability");
        assert_eq!(rows.len(), 6);
        assert!(rows[1].starts_with("-2,"));
        assert!(rows[5].starts_with("2,"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_token_aborts_before_writing_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("sites.toml");
        let output = dir.path().join("pmf.csv");
        std::fs::write(&input, SITES).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = run(args(&input, &output, MethodChoice::Auto), cancel).await;

        assert!(result.is_err());
        assert!(!output.exists());
    }
}
