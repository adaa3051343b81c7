// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand definitions and dispatch. Each command reads its inputs, runs
// one raster operation and writes the result, returning the line printed on
// success.

use std::path::PathBuf;

use bildwerk_core::ProcessorConfig;
use bildwerk_core::error::Result;
use bildwerk_raster::codec::{self, EncodeOptions};
use bildwerk_raster::{ImageProcessor, RasterBuffer, compose, synth};
use clap::Subcommand;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit an image within a bounding box, keeping its aspect ratio
    Resize {
        /// Target width (defaults to the configured width)
        #[arg(long)]
        width: Option<u32>,
        /// Target height (defaults to the configured height)
        #[arg(long)]
        height: Option<u32>,
        input: PathBuf,
        output: PathBuf,
    },
    /// Remove salt-and-pepper noise with a 3x3 median filter
    Denoise { input: PathBuf, output: PathBuf },
    /// Rotate clockwise by an arbitrary angle, growing the canvas
    Rotate {
        /// Angle in degrees (defaults to the configured angle)
        #[arg(long, allow_negative_numbers = true)]
        angle: Option<f64>,
        input: PathBuf,
        output: PathBuf,
    },
    /// Detect the dominant skew and rotate it away
    Autorotate { input: PathBuf, output: PathBuf },
    /// Convert to black and white with Otsu's threshold
    Binarize { input: PathBuf, output: PathBuf },
    /// Write the Sobel gradient magnitude
    Edges { input: PathBuf, output: PathBuf },
    /// Stack images top to bottom at the widest width
    Concatvert {
        output: PathBuf,
        #[arg(num_args = 2.., required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Place images left to right at the tallest height
    Concathorz {
        output: PathBuf,
        #[arg(num_args = 2.., required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Write a set of synthetic test images into a directory
    Generatetest {
        #[arg(long, default_value_t = 100)]
        width: u32,
        #[arg(long, default_value_t = 100)]
        height: u32,
        dir: PathBuf,
    },
}

/// Execute `command` with `config` supplying defaults and encode settings.
pub fn run(command: &Command, config: &ProcessorConfig) -> Result<String> {
    let options = EncodeOptions::from(config);
    match command {
        Command::Resize {
            width,
            height,
            input,
            output,
        } => {
            let width = width.unwrap_or(config.default_width);
            let height = height.unwrap_or(config.default_height);
            ImageProcessor::open(input)?
                .resize(width, height)?
                .save(output, &options)?;
            Ok("Image resized successfully".into())
        }
        Command::Denoise { input, output } => {
            ImageProcessor::open(input)?.denoise().save(output, &options)?;
            Ok("Image denoised successfully".into())
        }
        Command::Rotate {
            angle,
            input,
            output,
        } => {
            let angle = angle.unwrap_or(config.default_angle);
            ImageProcessor::open(input)?
                .rotate(angle)?
                .save(output, &options)?;
            Ok("Image rotated successfully".into())
        }
        Command::Autorotate { input, output } => {
            ImageProcessor::open(input)?
                .auto_rotate()?
                .save(output, &options)?;
            Ok("Image auto-rotated successfully".into())
        }
        Command::Binarize { input, output } => {
            ImageProcessor::open(input)?.binarize().save(output, &options)?;
            Ok("Image binarized successfully".into())
        }
        Command::Edges { input, output } => {
            ImageProcessor::open(input)?
                .detect_edges()
                .save(output, &options)?;
            Ok("Edges detected successfully".into())
        }
        Command::Concatvert { output, inputs } => {
            let buffers = open_all(inputs)?;
            codec::save(&compose::concatenate_vertical(&buffers)?, output, &options)?;
            Ok("Images concatenated vertically successfully".into())
        }
        Command::Concathorz { output, inputs } => {
            let buffers = open_all(inputs)?;
            codec::save(&compose::concatenate_horizontal(&buffers)?, output, &options)?;
            Ok("Images concatenated horizontally successfully".into())
        }
        Command::Generatetest { width, height, dir } => {
            let written = synth::generate_test_set(dir, *width, *height, &options)?;
            info!(count = written.len(), "Test set written");
            Ok(format!(
                "Generated {} test images in {}",
                written.len(),
                dir.display()
            ))
        }
    }
}

fn open_all(paths: &[PathBuf]) -> Result<Vec<RasterBuffer>> {
    paths.iter().map(|p| codec::open(p.as_path())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::error::BildwerkError;
    use std::path::Path;

    /// Write a synthetic PNG input into `dir` and return its path.
    fn fixture(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let buffer = synth::stripes(width, height, 1).unwrap();
        codec::save(&buffer, &path, &EncodeOptions::default()).unwrap();
        path
    }

    #[test]
    fn resize_falls_back_to_configured_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.png", 200, 100);
        let output = dir.path().join("out.png");
        let command = Command::Resize {
            width: None,
            height: None,
            input,
            output: output.clone(),
        };
        let config = ProcessorConfig {
            default_width: 50,
            default_height: 50,
            ..ProcessorConfig::default()
        };
        assert_eq!(run(&command, &config).unwrap(), "Image resized successfully");
        assert_eq!(codec::open(&output).unwrap().dimensions(), (50, 25));
    }

    #[test]
    fn rotate_uses_explicit_angle() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.png", 30, 10);
        let output = dir.path().join("out.png");
        let command = Command::Rotate {
            angle: Some(-90.0),
            input,
            output: output.clone(),
        };
        run(&command, &ProcessorConfig::default()).unwrap();
        assert_eq!(codec::open(&output).unwrap().dimensions(), (10, 30));
    }

    #[test]
    fn single_input_filters_write_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture(dir.path(), "in.png", 24, 24);
        let config = ProcessorConfig::default();
        let commands: [fn(PathBuf, PathBuf) -> Command; 4] = [
            |input, output| Command::Denoise { input, output },
            |input, output| Command::Binarize { input, output },
            |input, output| Command::Edges { input, output },
            |input, output| Command::Autorotate { input, output },
        ];
        for (i, make) in commands.into_iter().enumerate() {
            let output = dir.path().join(format!("out_{i}.jpg"));
            run(&make(input.clone(), output.clone()), &config).unwrap();
            assert!(output.exists());
        }
    }

    #[test]
    fn concatenation_commands_join_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let a = fixture(dir.path(), "a.png", 40, 20);
        let b = fixture(dir.path(), "b.png", 20, 20);
        let config = ProcessorConfig::default();

        let vertical = dir.path().join("v.png");
        let command = Command::Concatvert {
            output: vertical.clone(),
            inputs: vec![a.clone(), b.clone()],
        };
        run(&command, &config).unwrap();
        assert_eq!(codec::open(&vertical).unwrap().dimensions(), (40, 60));

        let horizontal = dir.path().join("h.png");
        let command = Command::Concathorz {
            output: horizontal.clone(),
            inputs: vec![a, b],
        };
        run(&command, &config).unwrap();
        assert_eq!(codec::open(&horizontal).unwrap().dimensions(), (60, 20));
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let command = Command::Denoise {
            input: dir.path().join("absent.png"),
            output: dir.path().join("out.png"),
        };
        let err = run(&command, &ProcessorConfig::default()).unwrap_err();
        assert!(matches!(err, BildwerkError::InvalidInput { .. }));
    }

    #[test]
    fn generatetest_reports_count() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tests");
        let command = Command::Generatetest {
            width: 40,
            height: 30,
            dir: target.clone(),
        };
        let message = run(&command, &ProcessorConfig::default()).unwrap();
        assert!(message.starts_with("Generated 8 test images"));
        assert!(target.join("skew_test.jpg").exists());
    }
}
