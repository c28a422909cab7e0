// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/output/save_image_file.rs - 保存会话投篮图
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Hoopline Developers

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, decode_url_path,
  frame::FrameDetections,
  output::{
    Render,
    draw::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Draw},
    query_param,
  },
  tracker::{FrameReport, ShotRecord},
};

#[derive(Error, Debug)]
pub enum ShotChartOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

#[derive(Default)]
struct ChartState {
  shots: Vec<ShotRecord>,
  sessions: u32,
}

/// 会话结束时写出投篮图：`image:///path/chart.png?width=1280&height=720`
///
/// 第二个及之后的会话写到 `chart-2.png`、`chart-3.png` ……
pub struct ShotChartOutput {
  path: PathBuf,
  draw: Draw,
  state: Mutex<ChartState>,
}

impl FromUrlWithScheme for ShotChartOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ShotChartOutput {
  type Error = ShotChartOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(ShotChartOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let width = query_param(uri, "width").unwrap_or(DEFAULT_WIDTH);
    let height = query_param(uri, "height").unwrap_or(DEFAULT_HEIGHT);

    Ok(ShotChartOutput {
      path: PathBuf::from(decode_url_path(uri)),
      draw: Draw::with_size(width, height),
      state: Mutex::new(ChartState::default()),
    })
  }
}

impl ShotChartOutput {
  fn session_path(&self, session: u32) -> PathBuf {
    if session <= 1 {
      return self.path.clone();
    }
    let stem = self
      .path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default();
    let name = match self.path.extension() {
      Some(ext) => format!("{}-{}.{}", stem, session, ext.to_string_lossy()),
      None => format!("{}-{}", stem, session),
    };
    self.path.with_file_name(name)
  }

  fn save_image(&self, path: &Path, image: image::RgbImage) -> Result<(), ShotChartOutputError> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    Ok(())
  }
}

impl Render<FrameDetections, FrameReport> for ShotChartOutput {
  type Error = ShotChartOutputError;

  fn render_result(&self, _frame: &FrameDetections, report: &FrameReport) -> Result<(), Self::Error> {
    if let Some(shot) = &report.shot {
      let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
      state.shots.push(shot.clone());
    }
    Ok(())
  }

  fn finish(&self) -> Result<(), Self::Error> {
    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    state.sessions += 1;
    let path = self.session_path(state.sessions);
    let image = self.draw.draw_shot_chart(&state.shots);
    self.save_image(&path, image)?;
    info!("保存投篮图到文件: {} ({} 次出手)", path.display(), state.shots.len());
    state.shots.clear();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_paths_are_numbered() {
    let url = Url::parse("image:///tmp/out/chart.png?width=320&height=200").unwrap();
    let output = ShotChartOutput::from_url(&url).unwrap();
    assert_eq!(output.draw.size(), (320, 200));
    assert_eq!(output.session_path(1), PathBuf::from("/tmp/out/chart.png"));
    assert_eq!(output.session_path(3), PathBuf::from("/tmp/out/chart-3.png"));
  }

  #[test]
  fn writes_chart_on_finish() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts").join("session.png");
    let url = Url::parse(&format!("image://{}?width=64&height=48", path.display())).unwrap();
    let output = ShotChartOutput::from_url(&url).unwrap();
    output.finish().unwrap();

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (64, 48));
  }
}
