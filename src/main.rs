//! Generator entry point: CLI wiring, config loading and artifact export.

use std::fs;
use std::process;

use tracing::info;

use renewables_synth::cli::{self, Command};
use renewables_synth::generator::Generator;
use renewables_synth::io::export::{export_csv, export_summary, output_paths};
use renewables_synth::telemetry::init_tracing;

fn main() {
    init_tracing();

    let opts = match cli::parse_args() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            cli::print_usage();
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    let config = match opts.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Report every violation at once before handing off to the generator.
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let output = match Generator::new(config).and_then(|mut g| g.run()) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("{}", output.summary);

    if let Err(e) = fs::create_dir_all(&opts.out_dir) {
        eprintln!("error: cannot create {}: {e}", opts.out_dir.display());
        process::exit(1);
    }
    let (csv_path, summary_path) = output_paths(&opts.out_dir, output.summary.generated_at);
    if let Err(e) = export_csv(&output.dataset, &csv_path) {
        eprintln!("error: failed to write CSV: {e}");
        process::exit(1);
    }
    if let Err(e) = export_summary(&output.summary, &summary_path) {
        eprintln!("error: failed to write summary: {e}");
        process::exit(1);
    }
    info!(
        csv = %csv_path.display(),
        summary = %summary_path.display(),
        "artifacts written"
    );

    #[cfg(feature = "api")]
    if opts.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(renewables_synth::api::AppState {
            summary: output.summary,
            dataset: output.dataset,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(renewables_synth::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
