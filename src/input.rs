// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/input.rs - 检测结果输入
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

use std::fs::File;
use std::io::{BufReader, StdinLock};

use thiserror::Error;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::FrameDetections,
  model::{DetectResult, ShotLabel},
};

mod detection_log;
pub use self::detection_log::{DetectionLog, DetectionLogError};

/// 一帧检测器原始输出
#[derive(Debug, Clone)]
pub struct DetectionFrame {
  pub index: u64,
  pub result: DetectResult<ShotLabel>,
}

impl DetectionFrame {
  /// 按置信度阈值筛选出每类最佳框
  pub fn select(&self, min_ball: f32, min_hoop: f32) -> FrameDetections {
    self.result.select_best(self.index, min_ball, min_hoop)
  }
}

#[derive(Error, Debug)]
pub enum InputError {
  #[error("Detection log error: {0}")]
  DetectionLogError(#[from] DetectionLogError),
  #[error("URI scheme mismatch")]
  SchemeMismatch,
}

const STDIN_SCHEME: &str = "stdin";

pub enum InputWrapper {
  DetectionLog(DetectionLog<BufReader<File>>),
  Stdin(DetectionLog<StdinLock<'static>>),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      DetectionLog::<BufReader<File>>::SCHEME => {
        let input = DetectionLog::from_url(url)?;
        Ok(InputWrapper::DetectionLog(input))
      }
      STDIN_SCHEME => Ok(InputWrapper::Stdin(DetectionLog::new(std::io::stdin().lock()))),
      _ => Err(InputError::SchemeMismatch),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Result<DetectionFrame, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let item = match self {
      InputWrapper::DetectionLog(input) => input.next(),
      InputWrapper::Stdin(input) => input.next(),
    };
    item.map(|r| r.map_err(InputError::from))
  }
}
