/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    config.rs

    Device creation parameters for a TGUI card. Parsed from a TOML fragment
    such as:

        model = "tgui9660_pci"
        vram_mb = 2
        trace_file = "tgui_trace.log"

*/

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_derive::{Deserialize, Serialize};

use crate::{device_types::tgui::TguiModel, error::TguiError, tracelogger::TraceLogger};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TguiConfig {
    #[serde(default)]
    pub model: TguiModel,
    /// Installed video memory in megabytes. The model's default when absent.
    #[serde(default)]
    pub vram_mb: Option<u32>,
    #[serde(default)]
    pub trace_file: Option<PathBuf>,
    #[serde(default)]
    pub trace_console: bool,
}

impl TguiConfig {
    pub fn new(model: TguiModel) -> Self {
        Self {
            model,
            ..Default::default()
        }
    }

    pub fn with_vram_mb(mut self, vram_mb: u32) -> Self {
        self.vram_mb = Some(vram_mb);
        self
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, TguiError> {
        let config: TguiConfig = toml::from_str(toml_str).map_err(|e| TguiError::BadConfig(e.to_string()))?;
        config.vram_size()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("Couldn't read TGUI configuration file: {}", path.display()))?;
        let config = TguiConfig::from_toml(&toml_str)
            .with_context(|| format!("Couldn't parse TGUI configuration file: {}", path.display()))?;
        log::debug!("Loaded TGUI configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Validated VRAM size in bytes.
    pub fn vram_size(&self) -> Result<usize, TguiError> {
        let chip = self.model.chip();
        let (valid, default_mb) = chip.vram_choices();
        let vram_mb = self.vram_mb.unwrap_or(default_mb);
        if !valid.contains(&vram_mb) {
            return Err(TguiError::InvalidVramSize { chip, vram_mb, valid });
        }
        Ok((vram_mb as usize) << 20)
    }

    pub fn trace_logger(&self) -> TraceLogger {
        match (&self.trace_file, self.trace_console) {
            (Some(file), _) => TraceLogger::from_filename(file),
            (None, true) => TraceLogger::Console,
            (None, false) => TraceLogger::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vram_by_generation() {
        let cfg = TguiConfig::new(TguiModel::Tgui9440Vlb);
        assert_eq!(cfg.vram_size().unwrap(), 2 << 20);
        let cfg = TguiConfig::new(TguiModel::Tgui9680Pci);
        assert_eq!(cfg.vram_size().unwrap(), 4 << 20);
    }

    #[test]
    fn test_invalid_vram_rejected() {
        let cfg = TguiConfig::new(TguiModel::Tgui9440Pci).with_vram_mb(4);
        assert!(matches!(cfg.vram_size(), Err(TguiError::InvalidVramSize { vram_mb: 4, .. })));
        let cfg = TguiConfig::new(TguiModel::Tgui9660Pci).with_vram_mb(3);
        assert!(cfg.vram_size().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let cfg = TguiConfig::from_toml("model = \"tgui9660_onboard_pci\"\nvram_mb = 1\n").unwrap();
        assert_eq!(cfg.model, TguiModel::Tgui9660OnboardPci);
        assert_eq!(cfg.vram_size().unwrap(), 1 << 20);
        assert!(!cfg.trace_console);

        assert!(TguiConfig::from_toml("model = \"tgui9400cxi_vlb\"\nvram_mb = 4\n").is_err());
        assert!(TguiConfig::from_toml("model = \"s3_virge\"\n").is_err());
    }
}
