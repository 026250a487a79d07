use indicatif::{ProgressBar, ProgressStyle};
use radiodl_engine::ProgressEvent;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

fn download_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} segments")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[derive(Clone)]
pub struct ProgressManager {
    bar: Arc<Mutex<Option<ProgressBar>>>,
    failures: Arc<Mutex<usize>>,
    disabled: bool,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            bar: Arc::new(Mutex::new(None)),
            failures: Arc::new(Mutex::new(0)),
            disabled: false,
        }
    }

    pub fn new_disabled() -> Self {
        Self {
            disabled: true,
            ..Self::new()
        }
    }

    pub fn handle_event(&self, event: ProgressEvent) {
        if self.disabled {
            return;
        }

        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        match event {
            ProgressEvent::SegmentsResolved { total } => {
                let new_bar = ProgressBar::new(total as u64);
                new_bar.set_style(download_style());
                new_bar.set_message("Downloading segments");
                new_bar.enable_steady_tick(Duration::from_millis(200));
                *bar = Some(new_bar);
            }
            ProgressEvent::SegmentFinished { succeeded, .. } => {
                if let Some(bar) = bar.as_ref() {
                    if !succeeded {
                        if let Ok(mut failures) = self.failures.lock() {
                            *failures += 1;
                            bar.set_message(format!("Downloading segments ({failures} missing)"));
                        }
                    }
                    bar.inc(1);
                }
            }
            ProgressEvent::Concatenating { segments } => {
                if let Some(bar) = bar.take() {
                    bar.finish_with_message(format!("Downloaded {segments} segments"));
                }
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(spinner_style());
                spinner.set_message("Concatenating segments");
                spinner.enable_steady_tick(Duration::from_millis(120));
                *bar = Some(spinner);
            }
            ProgressEvent::Repackaging { output } => {
                if let Some(bar) = bar.as_ref() {
                    bar.set_message(format!("Writing {}", output.display()));
                }
            }
            ProgressEvent::Finished { output } => {
                if let Some(bar) = bar.take() {
                    bar.finish_with_message(format!("Finished {}", output.display()));
                }
            }
        }
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}
