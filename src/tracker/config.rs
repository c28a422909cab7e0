// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker/config.rs - 投篮检测参数
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

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("参数 {name} 必须大于 0")]
  NotPositive { name: &'static str },
  #[error("参数 {name} 无效: {value}")]
  Invalid { name: &'static str, value: f64 },
  #[error("配置文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置文件解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
}

/// 会话内固定不变的跟踪参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  /// 轨迹缓冲容量（帧）
  pub trajectory_frames: usize,
  /// 名义帧率，速度换算的时间基准
  pub nominal_fps: f64,
  /// 篮筐历史容量
  pub hoop_history: usize,
  /// 篮筐连续丢失超过该帧数后清空篮筐状态
  pub hoop_loss_timeout: u32,
  /// 出手后球连续丢失超过该帧数判为未进
  pub ball_loss_timeout: u32,
  /// 判定后的冷却帧数
  pub cooldown_frames: u32,
  /// 球的最低置信度，仅供检测预筛选使用
  pub min_ball_confidence: f32,
  /// 篮筐的最低置信度，仅供检测预筛选使用
  pub min_hoop_confidence: f32,
  /// 保留参数，评分不使用
  pub hoop_y_threshold_factor: f64,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      trajectory_frames: 30,
      nominal_fps: 30.0,
      hoop_history: 10,
      hoop_loss_timeout: 30,
      ball_loss_timeout: 15,
      cooldown_frames: 15,
      min_ball_confidence: 0.4,
      min_hoop_confidence: 0.25,
      hoop_y_threshold_factor: 0.6,
    }
  }
}

impl TrackerConfig {
  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let file = std::fs::File::open(path)?;
    let config: TrackerConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.trajectory_frames == 0 {
      return Err(ConfigError::NotPositive {
        name: "trajectory_frames",
      });
    }
    if self.hoop_history == 0 {
      return Err(ConfigError::NotPositive {
        name: "hoop_history",
      });
    }
    if !self.nominal_fps.is_finite() || self.nominal_fps <= 0.0 {
      return Err(ConfigError::Invalid {
        name: "nominal_fps",
        value: self.nominal_fps,
      });
    }
    for (name, value) in [
      ("min_ball_confidence", self.min_ball_confidence),
      ("min_hoop_confidence", self.min_hoop_confidence),
    ] {
      if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid {
          name,
          value: value as f64,
        });
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let config = TrackerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.trajectory_frames, 30);
    assert_eq!(config.cooldown_frames, 15);
  }

  #[test]
  fn rejects_bad_values() {
    let config = TrackerConfig {
      nominal_fps: 0.0,
      ..Default::default()
    };
    assert!(matches!(
      config.validate(),
      Err(ConfigError::Invalid {
        name: "nominal_fps",
        ..
      })
    ));

    let config = TrackerConfig {
      hoop_history: 0,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn partial_json_falls_back_to_defaults() {
    let config: TrackerConfig = serde_json::from_str(r#"{"nominal_fps": 60}"#).unwrap();
    assert_eq!(config.nominal_fps, 60.0);
    assert_eq!(config.hoop_loss_timeout, 30);
  }

  #[test]
  fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.json");
    std::fs::write(&path, r#"{"ball_loss_timeout": 20, "cooldown_frames": 10}"#).unwrap();
    let config = TrackerConfig::from_json_file(&path).unwrap();
    assert_eq!(config.ball_loss_timeout, 20);
    assert_eq!(config.cooldown_frames, 10);

    std::fs::write(&path, r#"{"trajectory_frames": 0}"#).unwrap();
    assert!(TrackerConfig::from_json_file(&path).is_err());
  }
}
