use anyhow::Context;
use clap::{CommandFactory, Parser};
use dcmscrub::cli::Args;
use dcmscrub::deid::{DeidentifyOptions, Session};
use dcmscrub::dicom::{self, writer, Metadata, ProcessError};
use dcmscrub::display;
use dcmscrub::image::{self, DecodeError};
use std::path::Path;
use tracing::{warn, Level};

fn main() {
    let args = Args::parse();

    if let Err(e) = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
            .with_writer(std::io::stderr)
            .finish(),
    ) {
        eprintln!("[ERROR] Could not set up global logging subscriber: {e}");
    }

    if args.files.is_empty() {
        let _ = Args::command().print_help();
        println!();
        return;
    }

    let options = match load_options(&args) {
        Ok(options) => options,
        Err(e) => {
            println!("Error: {e:#}");
            std::process::exit(2);
        }
    };
    if args.deidentify
        && let Err(e) = options.check()
    {
        warn!("{e}");
    }

    for dir in [&args.output, &args.png].into_iter().flatten() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            println!("Error: Failed to create directory {}: {e}", dir.display());
            std::process::exit(2);
        }
    }

    // One session per batch so UIDs stay linked across files
    let session = Session::new();
    let multiple_files = args.files.len() > 1;
    let mut any_failed = false;

    for (idx, file_path) in args.files.iter().enumerate() {
        if multiple_files {
            println!("{}", file_path.display());
        }

        if let Err(e) = process_file(file_path, &args, &options, &session) {
            // Already printed in verbose mode
            if !args.verbose
                && let Some(metadata) = e.metadata()
            {
                dcmscrub::print_metadata(metadata, None);
            }
            println!("Error: {e}");
            any_failed = true;
        }

        if multiple_files && idx < args.files.len() - 1 {
            println!();
        }
    }

    if any_failed {
        std::process::exit(1);
    }
}

/// Options from `--options`, or the defaults, with the CLI toggles on top
fn load_options(args: &Args) -> anyhow::Result<DeidentifyOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file: {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid options file: {}", path.display()))?
        }
        None => DeidentifyOptions::default(),
    };
    options.apply(&args.options_update());
    Ok(options)
}

/// Process a single DICOM file
fn process_file(
    file_path: &Path,
    args: &Args,
    options: &DeidentifyOptions,
    session: &Session,
) -> Result<(), ProcessError> {
    // Stage 1: Open and parse
    let dcm = dicom::open_dicom_file(file_path)?;

    // Stage 2: Deidentify
    let deidentified = args
        .deidentify
        .then(|| session.deidentify_dataset(dcm.dataset(), options));
    let dataset = deidentified.as_ref().unwrap_or(dcm.dataset());
    let metadata = match &deidentified {
        Some(ds) => Metadata::from_dataset(ds),
        None => dcm.metadata.clone(),
    };

    // Stage 3: Metadata output
    if args.verbose {
        dcmscrub::print_metadata(&metadata, Some(dcm.transfer_syntax()));
    }
    if args.json {
        let json = serde_json::to_string_pretty(&metadata)
            .context("Failed to serialize metadata")
            .map_err(ProcessError::WriteFailed)?;
        println!("{json}");
    }

    // Stage 4: DICOM output, before the preview so a pixel failure does not block it
    if let Some(dir) = &args.output {
        let out_path = dir.join(output_file_name(file_path, "dcm"));
        writer::write_dicom_file(&out_path, dataset, dcm.pixel_payload())
            .map_err(ProcessError::WriteFailed)?;
    }

    if args.no_preview && args.png.is_none() {
        return Ok(());
    }

    // Stage 5: Decode the first frame
    let raster = dcm
        .pixel_bytes()
        .ok_or(DecodeError::MissingAttribute("PixelData"))
        .and_then(|pixels| {
            let params = metadata.image_params()?;
            let window = args.window().or_else(|| metadata.default_window());
            image::convert_to_image(pixels, &params, window)
        })
        .map_err(|e| ProcessError::ConversionFailed {
            metadata: Box::new(metadata.clone()),
            error: e,
        })?;

    // Stage 6: PNG and terminal display
    if let Some(dir) = &args.png {
        let png_path = dir.join(output_file_name(file_path, "png"));
        display::save_png(&raster, &png_path).map_err(ProcessError::WriteFailed)?;
    }

    if !args.no_preview {
        display::print_image(&raster, &metadata, args)
            .map_err(|e| ProcessError::DisplayFailed {
                metadata: Box::new(metadata),
                error: e,
            })?;
    }

    Ok(())
}

/// Input file stem with a new extension
fn output_file_name(file_path: &Path, extension: &str) -> String {
    let stem = file_path
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    format!("{stem}.{extension}")
}
