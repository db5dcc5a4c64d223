// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanedit — document photo editor
//
// Entry point. Initialises logging and settings, then edits one photo:
//
//   scanedit <input> <output.jpg> [edits.json] [detection.json]

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use scanedit_core::human_errors::humanize_error;
use services::editor::{EditJob, EditorService};

const USAGE: &str = "usage: scanedit <input> <output.jpg> [edits.json] [detection.json]";

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<EditJob> {
    let input = PathBuf::from(args.next()?);
    let output = PathBuf::from(args.next()?);
    let script = args.next().map(PathBuf::from);
    let detection = args.next().map(PathBuf::from);
    Some(EditJob {
        input,
        output,
        script,
        detection,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Some(job) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    tracing::info!("Scanedit starting");

    let result = match EditorService::init() {
        Ok(editor) => editor.run(&job).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(outcome) => {
            for rejected in &outcome.replay.rejected {
                eprintln!(
                    "step {} skipped: {}\n  {}",
                    rejected.index + 1,
                    rejected.reason,
                    rejected.suggestion
                );
            }
            if let Some(notice) = &outcome.report.ocr_notice {
                eprintln!("note: {notice}");
            }
            println!(
                "{} ({}x{}, quality {}, {:.1}% smaller than commit quality)",
                job.output.display(),
                outcome.report.width,
                outcome.report.height,
                outcome.report.quality.value(),
                outcome.report.compression_ratio,
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, severity = ?human.severity, "edit failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn needs_input_and_output() {
        assert!(parse_args(args(&["photo.jpg"])).is_none());
        let job = parse_args(args(&["photo.jpg", "out.jpg"])).unwrap();
        assert_eq!(job.output, PathBuf::from("out.jpg"));
        assert!(job.script.is_none() && job.detection.is_none());
    }

    #[test]
    fn optional_script_and_detection() {
        let job = parse_args(args(&["a.png", "b.jpg", "edits.json", "corners.json"])).unwrap();
        assert_eq!(job.script, Some(PathBuf::from("edits.json")));
        assert_eq!(job.detection, Some(PathBuf::from("corners.json")));
    }
}
