// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline name parsing and grouping for pickers.
//!
//! Pipeline names follow `<device>/<encoder>_<format>_<resolution><fps>`,
//! e.g. `rk3588/h265_usb_mjpeg_1080p30`. Any part may be missing.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

use crate::messages::{Pipeline, PipelinesMessage};

pub const UNKNOWN: &str = "unknown";
pub const DEVICE_RESOLUTION: &str = "[Given by the device]";

/// Components extracted from a pipeline name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineInfo {
    pub device: Option<String>,
    pub encoder: Option<String>,
    pub format: Option<String>,
    pub resolution: Option<String>,
    pub fps: Option<f64>,
}

/// A pipeline annotated with its id and parsed name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedPipeline {
    pub identifier: String,
    #[serde(flatten)]
    pub pipeline: Pipeline,
    pub extraction: PipelineInfo,
}

/// device → format → encoder → resolution → pipelines.
pub type GroupedPipelines =
    BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<GroupedPipeline>>>>>;

/// Compiled patterns for pipeline names.
pub struct PipelineParser {
    device: Regex,
    encoder: Regex,
    format: Regex,
    resolution: Regex,
    fps: Regex,
}

impl std::fmt::Debug for PipelineParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineParser").finish_non_exhaustive()
    }
}

impl PipelineParser {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            device: Regex::new(r"^([^/]+)")?,
            encoder: Regex::new(r"(h264|h265)")?,
            format: Regex::new(r"(?:h264|h265)_([^_]+(?:_[^_\d]+)*)")?,
            resolution: Regex::new(r"(\d{3,4}p)")?,
            fps: Regex::new(r"(\d+(?:\.\d+)?)(?:fps)?$")?,
        })
    }

    pub fn parse(&self, name: &str) -> PipelineInfo {
        let whole = |re: &Regex| re.find(name).map(|m| m.as_str().to_owned());
        let group = |re: &Regex| re.captures(name).and_then(|c| c.get(1)).map(|m| m.as_str());

        PipelineInfo {
            device: whole(&self.device),
            encoder: whole(&self.encoder),
            format: group(&self.format).map(|f| f.replace('_', " ")),
            resolution: whole(&self.resolution),
            fps: group(&self.fps).and_then(|f| f.parse().ok()),
        }
    }

    /// Group every pipeline by device, format, encoder and resolution.
    ///
    /// Missing parts group under [`UNKNOWN`], a missing resolution under
    /// [`DEVICE_RESOLUTION`].
    pub fn group(&self, pipelines: &PipelinesMessage) -> GroupedPipelines {
        let mut grouped = GroupedPipelines::new();
        for (id, pipeline) in pipelines {
            let extraction = self.parse(&pipeline.name);
            let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_owned());
            let device = or_unknown(&extraction.device);
            let format = or_unknown(&extraction.format);
            let encoder = or_unknown(&extraction.encoder);
            let resolution =
                extraction.resolution.clone().unwrap_or_else(|| DEVICE_RESOLUTION.to_owned());

            grouped
                .entry(device)
                .or_default()
                .entry(format)
                .or_default()
                .entry(encoder)
                .or_default()
                .entry(resolution)
                .or_default()
                .push(GroupedPipeline {
                    identifier: id.clone(),
                    pipeline: pipeline.clone(),
                    extraction,
                });
        }
        grouped
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
