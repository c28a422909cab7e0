// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme, decode_url_path,
  frame::FrameDetections,
  output::{
    Render,
    draw::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Draw},
    overlay::Overlay,
    query_flag, query_param,
  },
  tracker::FrameReport,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 叠加图按日期分目录保存：`folder:///dir?always&width=&height=`
///
/// 默认只保存判定帧，`always` 时每帧都保存。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw,
  overlay: Mutex<Overlay>,
  frame_counters: Mutex<u16>,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let width = query_param(uri, "width").unwrap_or(DEFAULT_WIDTH);
    let height = query_param(uri, "height").unwrap_or(DEFAULT_HEIGHT);

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(decode_url_path(uri)),
      draw: Draw::with_size(width, height),
      overlay: Mutex::new(Overlay::default()),
      frame_counters: Mutex::new(0),
      always: query_flag(uri, "always"),
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    let mut counter = self.frame_counters.lock().unwrap_or_else(|e| e.into_inner());
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn frame_path(&self, frame: u64) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}-f{}.png",
      now.format("%H-%M-%S"),
      self.frame_id(),
      frame
    )))
  }
}

impl Render<FrameDetections, FrameReport> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, _frame: &FrameDetections, report: &FrameReport) -> Result<(), Self::Error> {
    let mut overlay = self.overlay.lock().unwrap_or_else(|e| e.into_inner());
    let flash = overlay.update(report);
    if self.always || report.shot.is_some() {
      let path = self.frame_path(report.result.frame)?;
      let image = self.draw.draw_report(report, &overlay.trail, flash);
      image.save(&path)?;
      debug!("保存叠加图: {}", path.display());
    }
    Ok(())
  }

  fn finish(&self) -> Result<(), Self::Error> {
    self
      .overlay
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .reset();
    Ok(())
  }
}
