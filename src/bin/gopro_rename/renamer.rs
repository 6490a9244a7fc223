use std::path::PathBuf;

use anyhow::Result;
use colored::{ColoredString, Colorize};

use gopro_rename::group::{Classification, classify};
use gopro_rename::media::MediaKind;
use gopro_rename::metadata::CameraMetadata;
use gopro_rename::naming::{NameSynthesizer, RenamePlan, SynthesizedName};
use gopro_rename::pattern::CameraFile;
use gopro_rename::rename::{LocalFileSystem, RenameExecutor, RenameReport, TransferMode};
use gopro_rename::{print_bold, print_error, print_warning};

use crate::Args;
use crate::config::Config;
use crate::logger::RenameLog;

#[derive(Debug)]
pub struct GoProRename {
    root: PathBuf,
    config: Config,
}

impl GoProRename {
    pub fn new(args: Args) -> Result<Self> {
        let root = gopro_rename::resolve_input_path(args.path.as_deref())?;
        if !root.is_dir() {
            anyhow::bail!("Input path is not a directory: '{}'", root.display());
        }
        let config = Config::from_args(&args)?;
        if config.verbose {
            eprintln!("Config: {config:#?}");
            eprintln!("Root: {}", root.display());
        }
        Ok(Self { root, config })
    }

    pub fn run(&self) -> Result<()> {
        let names = gopro_rename::list_file_names(&self.root)?;
        if names.is_empty() {
            if self.config.verbose {
                println!("No files to process");
            }
            return Ok(());
        }

        let classification = classify(names);
        self.print_classification(&classification);
        if classification.is_empty() {
            print_warning!("No GoPro files found in: {}", self.root.display());
            return Ok(());
        }

        for file_number in &classification.missing_first_chapter {
            print_warning!("Chaptered video {file_number} is missing its first part GOPR{file_number}");
        }

        let mut log = if self.config.log { Some(RenameLog::new()?) } else { None };
        if let Some(log) = log.as_mut() {
            log.log_init(&self.root, &self.config);
        }
        self.process(&classification, log.as_mut());
        Ok(())
    }

    /// Synthesize names and apply them, or only print them in dryrun mode.
    fn process(&self, classification: &Classification, mut log: Option<&mut RenameLog>) {
        let plan = self.create_plan(classification);
        for failure in &plan.failures {
            print_error!("{}: {}", failure.name, failure.error);
            if let Some(log) = log.as_deref_mut() {
                log.log_skip(&failure.name, &failure.error);
            }
        }

        let report = if plan.pairs.is_empty() {
            println!("Nothing to rename");
            RenameReport::default()
        } else if self.config.dryrun {
            let heading = self.heading();
            for pair in &plan.pairs {
                println!("{heading}");
                gopro_rename::show_diff(&pair.old_name, &pair.new_name);
            }
            RenameReport::default()
        } else {
            let report = self.execute(&plan, log.as_deref_mut());
            Self::print_summary(&report, plan.failures.len());
            report
        };

        if let Some(log) = log {
            log.log_summary(report.completed.len(), plan.failures.len(), report.failures.len());
        }
    }

    /// Create target names for all classified files.
    fn create_plan(&self, classification: &Classification) -> RenamePlan {
        let metadata = CameraMetadata::new(&self.config.ffprobe);
        let has_videos = classification
            .files()
            .iter()
            .any(|file| MediaKind::from_extension(file.extension()) == MediaKind::Video);

        if has_videos && !metadata.ffprobe_available() {
            print_warning!(
                "ffprobe not found: {}. Install ffmpeg first and make sure it is in PATH",
                self.config.ffprobe.display()
            );
        }

        NameSynthesizer::new(&self.root, &metadata).synthesize(classification)
    }

    fn execute(&self, plan: &RenamePlan, mut log: Option<&mut RenameLog>) -> RenameReport {
        let heading = self.heading();
        let executor = RenameExecutor::new(
            &self.root,
            LocalFileSystem::new(self.config.transfer_mode),
            self.config.overwrite,
        );
        executor.execute_with(&plan.pairs, |pair, error| {
            println!("{heading}");
            gopro_rename::show_diff(&pair.old_name, &pair.new_name);
            match error {
                Some(error) => {
                    print_error!("{error}");
                    if let Some(log) = log.as_deref_mut() {
                        log.log_failure(pair, error);
                    }
                }
                None => {
                    if let Some(log) = log.as_deref_mut() {
                        log.log_rename(pair);
                    }
                }
            }
        })
    }

    fn heading(&self) -> ColoredString {
        if self.config.dryrun {
            "Dryrun:".cyan().bold()
        } else if self.config.transfer_mode == TransferMode::Copy {
            "Copy:".blue().bold()
        } else {
            "Rename:".magenta().bold()
        }
    }

    fn print_classification(&self, classification: &Classification) {
        print_bold!(
            "Found {} GoPro file(s) in {}",
            classification.classified_count(),
            self.root.display()
        );
        println!("  chaptered videos: {}", classification.chapters.len());
        println!("  burst groups:     {}", classification.bursts.len());
        println!("  3D recordings:    {}", classification.stereo.len());
        println!("  single files:     {}", classification.singles.len());

        if !self.config.verbose {
            return;
        }

        for (file_number, members) in &classification.chapters {
            println!("{} {}", "Chapter".cyan(), file_number);
            print_members(members);
        }
        for (burst_number, members) in &classification.bursts {
            println!("{} {}", "Burst".cyan(), burst_number);
            print_members(members);
        }
        for (file_number, members) in &classification.stereo {
            println!("{} {}", "3D".cyan(), file_number);
            print_members(members);
        }
        if !classification.singles.is_empty() {
            println!("{}", "Single".cyan());
            print_members(&classification.singles);
        }
        if !classification.residual.is_empty() {
            println!("{}", "Unrecognized".yellow());
            for name in &classification.residual {
                if SynthesizedName::parse(name).is_some() {
                    println!("  {name} {}", "(already renamed)".green());
                } else {
                    println!("  {name}");
                }
            }
        }
    }

    fn print_summary(report: &RenameReport, skipped: usize) {
        println!(
            "Finished: {} renamed, {} skipped, {} failed",
            report.completed.len().to_string().green(),
            skipped.to_string().yellow(),
            report.failures.len().to_string().red()
        );
    }
}

fn print_members<T: CameraFile>(members: &[T]) {
    for member in members {
        println!("  {}", member.name());
    }
}
