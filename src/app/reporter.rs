use std::path::Path;

/// Receives progress events while files are being reindented.
pub trait Reporter {
    fn skipped(&self, path: &Path);
    fn processing(&self, path: &Path);
}

/// Prints one line per entry to stdout.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn skipped(&self, path: &Path) {
        println!("Skipped non-file {}", path.display());
    }

    fn processing(&self, path: &Path) {
        println!("Reindenting {}...", path.display());
    }
}

pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn skipped(&self, _path: &Path) {}

    fn processing(&self, _path: &Path) {}
}

pub fn reporter_for(quiet: bool) -> Box<dyn Reporter> {
    if quiet {
        Box::new(QuietReporter)
    } else {
        Box::new(StdoutReporter)
    }
}
