use crate::config::Config;
use indicatif::ProgressBar;

pub fn create_progress_bar(config: &Config, len: usize) -> ProgressBar {
    if config.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(len as u64)
    }
}
