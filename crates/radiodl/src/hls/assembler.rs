// Assembler: joins the downloaded segments with ffmpeg and rewraps the result
// into a seekable container.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::hls::config::HlsAssemblerConfig;
use crate::hls::events::{OnProgress, ProgressEvent};
use crate::hls::segment::{Segment, show_identifier};
use crate::tool::MediaTool;
use crate::{RadioError, Result};

/// Container used when the show identifier carries no extension.
const DEFAULT_EXTENSION: &str = "m4a";

pub struct Assembler {
    tool: MediaTool,
    config: HlsAssemblerConfig,
    on_progress: Option<OnProgress>,
}

impl Assembler {
    pub fn new(tool: MediaTool, config: HlsAssemblerConfig) -> Self {
        Self {
            tool,
            config,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Option<OnProgress>) -> Self {
        self.on_progress = on_progress;
        self
    }

    /// Produce the final file in `output_dir` from the downloaded segments.
    ///
    /// `manifest_path` and `intermediate_path` live in the run's working
    /// directory. Nothing is spawned when no segment was downloaded.
    pub async fn assemble(
        &self,
        segments: &[Segment],
        manifest_path: &Path,
        intermediate_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let first_url = segments
            .first()
            .map(|s| s.url.as_str())
            .ok_or_else(|| RadioError::assembly("No segments to assemble"))?;
        let present = write_manifest(segments, manifest_path).await?;
        let output_name = output_file_name(first_url)?;

        tokio::fs::create_dir_all(output_dir).await?;
        let output_path = output_dir.join(output_name);

        info!(segments = present, "Concatenating files");
        self.emit(ProgressEvent::Concatenating { segments: present });
        self.tool.run(concat_args(manifest_path, intermediate_path)).await?;

        info!(output = %output_path.display(), "Writing output file");
        self.emit(ProgressEvent::Repackaging {
            output: output_path.clone(),
        });
        self.tool
            .run(repackage_args(intermediate_path, &output_path, self.config.overwrite))
            .await?;

        Ok(output_path)
    }

    /// Refuse up front when the output file already exists and overwriting is
    /// off, so no segment is fetched for a run that cannot finish.
    pub async fn ensure_output_available(
        &self,
        first_segment_url: &str,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let output_path = output_dir.join(output_file_name(first_segment_url)?);
        if !self.config.overwrite && tokio::fs::try_exists(&output_path).await? {
            return Err(RadioError::assembly(format!(
                "Output file {} already exists and overwrite is disabled",
                output_path.display()
            )));
        }
        Ok(output_path)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(event);
        }
    }
}

/// Write the concat-demuxer manifest for the present segments, in order.
///
/// Returns the number of listed files; zero is an assembly error and leaves
/// no manifest behind.
pub async fn write_manifest(segments: &[Segment], manifest_path: &Path) -> Result<usize> {
    let manifest = render_manifest(segments);
    if manifest.is_empty() {
        return Err(RadioError::assembly(
            "None of the segments could be downloaded",
        ));
    }
    let count = manifest.lines().count();
    tokio::fs::write(manifest_path, manifest).await?;
    Ok(count)
}

fn render_manifest(segments: &[Segment]) -> String {
    let mut manifest = String::new();
    for path in segments.iter().filter_map(Segment::local_path) {
        let escaped = path.to_string_lossy().replace('\'', r"'\''");
        let _ = writeln!(manifest, "file '{escaped}'");
    }
    manifest
}

/// Name of the final file: the show identifier from the CDN path.
pub fn output_file_name(first_segment_url: &str) -> Result<String> {
    let name = show_identifier(first_segment_url).ok_or_else(|| {
        RadioError::assembly(format!(
            "Cannot derive an output name from {first_segment_url}"
        ))
    })?;

    if Path::new(&name).extension().is_some() {
        Ok(name)
    } else {
        Ok(format!("{name}.{DEFAULT_EXTENSION}"))
    }
}

fn concat_args(manifest_path: &Path, intermediate_path: &Path) -> Vec<String> {
    let mut args = common_args();
    args.extend(["-y", "-safe", "0", "-f", "concat", "-i"].map(String::from));
    args.push(manifest_path.to_string_lossy().into_owned());
    args.extend(["-acodec", "copy"].map(String::from));
    args.push(intermediate_path.to_string_lossy().into_owned());
    args
}

fn repackage_args(intermediate_path: &Path, output_path: &Path, overwrite: bool) -> Vec<String> {
    let mut args = common_args();
    args.push(if overwrite { "-y" } else { "-n" }.to_string());
    args.extend(["-err_detect", "ignore_err", "-i"].map(String::from));
    args.push(intermediate_path.to_string_lossy().into_owned());
    args.extend(["-c", "copy"].map(String::from));
    args.push(output_path.to_string_lossy().into_owned());
    args
}

fn common_args() -> Vec<String> {
    ["-hide_banner", "-nostdin", "-loglevel", "error"]
        .map(String::from)
        .to_vec()
}
