// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/output.rs - 输出定义
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

use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::FrameDetections,
  tracker::FrameReport,
};

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;

  /// 会话结束时调用一次
  fn finish(&self) -> Result<(), Self::Error> {
    Ok(())
  }
}

impl<F, D, R: Render<F, D>> Render<F, D> for &R {
  type Error = R::Error;

  fn render_result(&self, frame: &F, result: &D) -> Result<(), Self::Error> {
    (**self).render_result(frame, result)
  }

  fn finish(&self) -> Result<(), Self::Error> {
    (**self).finish()
  }
}

pub mod overlay;

mod log_output;
pub use self::log_output::{LogOutput, LogOutputError};

mod jsonl_output;
pub use self::jsonl_output::{JsonLinesOutput, JsonLinesOutputError};

#[cfg(any(feature = "save_image_file", feature = "directory_record"))]
pub mod draw;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{ShotChartOutput, ShotChartOutputError};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

pub(crate) fn query_param<T: FromStr>(url: &Url, key: &str) -> Option<T> {
  url
    .query_pairs()
    .find(|(k, _)| k == key)
    .and_then(|(_, v)| v.parse().ok())
}

pub(crate) fn query_flag(url: &Url, key: &str) -> bool {
  url.query_pairs().any(|(k, _)| k == key)
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("日志输出错误: {0}")]
  LogOutputError(#[from] LogOutputError),
  #[error("JSON Lines 输出错误: {0}")]
  JsonLinesOutputError(#[from] JsonLinesOutputError),
  #[cfg(feature = "save_image_file")]
  #[error("投篮图输出错误: {0}")]
  ShotChartOutputError(#[from] ShotChartOutputError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  LogOutput(LogOutput),
  JsonLinesOutput(JsonLinesOutput),
  #[cfg(feature = "save_image_file")]
  ShotChartOutput(ShotChartOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      LogOutput::SCHEME => {
        let output = LogOutput::from_url(url)?;
        Ok(OutputWrapper::LogOutput(output))
      }
      JsonLinesOutput::SCHEME => {
        let output = JsonLinesOutput::from_url(url)?;
        Ok(OutputWrapper::JsonLinesOutput(output))
      }
      #[cfg(feature = "save_image_file")]
      ShotChartOutput::SCHEME => {
        let output = ShotChartOutput::from_url(url)?;
        Ok(OutputWrapper::ShotChartOutput(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Render<FrameDetections, FrameReport> for OutputWrapper {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: &FrameDetections,
    result: &FrameReport,
  ) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::LogOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      OutputWrapper::JsonLinesOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "save_image_file")]
      OutputWrapper::ShotChartOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
    }
  }

  fn finish(&self) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::LogOutput(output) => output.finish().map_err(OutputError::from),
      OutputWrapper::JsonLinesOutput(output) => output.finish().map_err(OutputError::from),
      #[cfg(feature = "save_image_file")]
      OutputWrapper::ShotChartOutput(output) => output.finish().map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output.finish().map_err(OutputError::from),
    }
  }
}

/// 多个输出：依次渲染，遇到第一个错误即返回
pub struct OutputSet {
  outputs: Vec<OutputWrapper>,
}

impl OutputSet {
  pub fn new(outputs: Vec<OutputWrapper>) -> Self {
    Self { outputs }
  }

  pub fn from_urls<'a, I>(urls: I) -> Result<Self, OutputError>
  where
    I: IntoIterator<Item = &'a Url>,
  {
    let outputs = urls
      .into_iter()
      .map(OutputWrapper::from_url)
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self::new(outputs))
  }
}

impl Render<FrameDetections, FrameReport> for OutputSet {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: &FrameDetections,
    result: &FrameReport,
  ) -> Result<(), Self::Error> {
    for output in &self.outputs {
      output.render_result(frame, result)?;
    }
    Ok(())
  }

  fn finish(&self) -> Result<(), Self::Error> {
    for output in &self.outputs {
      output.finish()?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_helpers() {
    let url = Url::parse("folder:///tmp/out?always&width=640&height=abc").unwrap();
    assert!(query_flag(&url, "always"));
    assert!(!query_flag(&url, "verbose"));
    assert_eq!(query_param::<u32>(&url, "width"), Some(640));
    assert_eq!(query_param::<u32>(&url, "height"), None);
  }

  #[test]
  fn unknown_output_scheme_is_rejected() {
    let url = Url::parse("rtsp://0.0.0.0:8554/live").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch)
    ));
  }

  #[test]
  fn output_set_builds_from_urls() {
    let urls = vec![Url::parse("log:").unwrap()];
    let set = OutputSet::from_urls(&urls).unwrap();
    assert_eq!(set.outputs.len(), 1);
  }
}
