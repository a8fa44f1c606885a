use clap::Parser;
use std::path::PathBuf;

use crate::deid::OptionsUpdate;
use crate::types::WindowLevel;

/// Inspect, deidentify and preview DICOM files
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// DICOM file path(s) to process
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Output width in terminal columns
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Output height in terminal rows
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Show DICOM metadata and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the (possibly deidentified) metadata as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip the terminal preview
    #[arg(long)]
    pub no_preview: bool,

    /// Deidentify each file before printing or writing it
    #[arg(short, long)]
    pub deidentify: bool,

    /// JSON file with deidentification options
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Keep the patient name
    #[arg(long)]
    pub keep_name: bool,

    /// Keep the patient ID
    #[arg(long)]
    pub keep_id: bool,

    /// Keep dates and times
    #[arg(long, conflicts_with = "shift_dates")]
    pub keep_dates: bool,

    /// Shift dates back by this many days instead of removing them
    #[arg(long, value_name = "DAYS")]
    pub shift_dates: Option<i64>,

    /// Keep institution name, address and department
    #[arg(long)]
    pub keep_institution: bool,

    /// Keep referring/performing physician and operator names
    #[arg(long)]
    pub keep_physicians: bool,

    /// Keep the original study, series and instance UIDs
    #[arg(long)]
    pub keep_uids: bool,

    /// Clear series description, number, modality and study description
    #[arg(long)]
    pub drop_series_info: bool,

    /// Directory for deidentified DICOM output
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Directory for PNG previews
    #[arg(long, value_name = "DIR")]
    pub png: Option<PathBuf>,

    /// Window center, used together with --window-width
    #[arg(long, requires = "window_width", allow_negative_numbers = true)]
    pub window_center: Option<f64>,

    /// Window width, used together with --window-center
    #[arg(long, requires = "window_center")]
    pub window_width: Option<f64>,
}

impl Args {
    /// Deidentification toggles given on the command line
    #[must_use]
    pub fn options_update(&self) -> OptionsUpdate {
        let mut update = OptionsUpdate::default();
        if self.keep_name {
            update.remove_patient_name = Some(false);
        }
        if self.keep_id {
            update.remove_patient_id = Some(false);
        }
        if self.keep_dates {
            update.remove_dates = Some(false);
        }
        if let Some(days) = self.shift_dates {
            update.shift_dates = Some(true);
            update.date_shift_days = Some(days);
        }
        if self.keep_institution {
            update.remove_institution = Some(false);
        }
        if self.keep_physicians {
            update.remove_physicians = Some(false);
        }
        if self.keep_uids {
            update.anonymize_uids = Some(false);
        }
        if self.drop_series_info {
            update.keep_series_info = Some(false);
        }
        update
    }

    /// Window given on the command line
    #[must_use]
    pub fn window(&self) -> Option<WindowLevel> {
        Some(WindowLevel::new(self.window_center?, self.window_width?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_map_to_an_update() {
        let args = Args::parse_from(["dcmscrub", "--keep-name", "--shift-dates", "30", "a.dcm"]);
        let update = args.options_update();
        assert_eq!(update.remove_patient_name, Some(false));
        assert_eq!(update.shift_dates, Some(true));
        assert_eq!(update.date_shift_days, Some(30));
        assert_eq!(update.remove_dates, None);
        assert_eq!(args.files, vec![PathBuf::from("a.dcm")]);
    }

    #[test]
    fn window_needs_both_halves() {
        let args = Args::parse_from([
            "dcmscrub",
            "--window-center",
            "-600",
            "--window-width",
            "1500",
        ]);
        assert_eq!(args.window(), Some(WindowLevel::new(-600.0, 1500.0)));
        assert!(Args::try_parse_from(["dcmscrub", "--window-width", "10"]).is_err());
    }

    #[test]
    fn keep_dates_conflicts_with_shift() {
        assert!(
            Args::try_parse_from(["dcmscrub", "--keep-dates", "--shift-dates", "5"]).is_err()
        );
    }
}
