use std::path::Path;
use std::process::ExitCode;

use inkstrip::config::job::JobFile;
use inkstrip::config::merged::MergedConfig;
use inkstrip::config::{self, resolve_path};
use inkstrip::logging;
use inkstrip::pipeline::job_runner::{JobConfig, run_all_jobs};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: inkstrip [-v] <jobs.yaml>...");
        eprintln!("  Extract handwriting strips from page photographs and replay drawing jobs.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("inkstrip {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    logging::init(verbose);

    let job_files: Vec<&String> = args
        .iter()
        .filter(|a| !matches!(a.as_str(), "--verbose" | "-v"))
        .collect();
    if job_files.is_empty() {
        eprintln!("Usage: inkstrip [-v] <jobs.yaml>...");
        return ExitCode::FAILURE;
    }

    let mut job_configs: Vec<JobConfig> = Vec::new();

    for job_file_arg in job_files {
        let job_file_path = Path::new(job_file_arg);

        // settings.yaml sits next to the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file = match JobFile::from_file(job_file_path) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to load job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_dir = job_file_path.parent().unwrap_or_else(|| Path::new("."));

        for job in &job_file.jobs {
            let merged = MergedConfig::new(&settings, job);
            if let Err(e) = merged.validate() {
                eprintln!("ERROR: {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }

            let text = match job.resolve_text(job_dir) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("ERROR: {job_file_arg}: failed to read text: {e}");
                    return ExitCode::FAILURE;
                }
            };

            let output = |p: &Option<String>| p.as_deref().map(|p| resolve_path(job_dir, p));
            job_configs.push(JobConfig {
                images: job.images.iter().map(|p| resolve_path(job_dir, p)).collect(),
                text,
                strip_output: output(&job.strip_output),
                report_output: output(&job.report_output),
                drawing_output: output(&job.drawing_output),
                strokes: job.strokes.clone(),
                merged,
            });
        }
    }

    let results = run_all_jobs(&job_configs);

    let mut has_error = false;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(r) => {
                let strip = match r.strip_size {
                    Some((w, h)) => format!("{} lines, {w}x{h} strip", r.lines),
                    None => "no handwriting".to_string(),
                };
                eprintln!(
                    "OK: job {} ({} images, {} skipped, {strip}, {} mode, {} fragments)",
                    i + 1,
                    r.images_processed,
                    r.images_skipped,
                    r.mode,
                    r.fragments
                );
                if let Some(path) = &r.drawing_output {
                    eprintln!("    drawing -> {}", path.display());
                }
            }
            Err(e) => {
                eprintln!("ERROR: job {}: {e}", i + 1);
                has_error = true;
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
