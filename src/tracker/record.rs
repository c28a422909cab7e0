// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker/record.rs - 出手记录与会话统计
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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::{BBox, TrackPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShotOutcome {
  Made,
  Missed,
}

impl ShotOutcome {
  pub fn is_made(&self) -> bool {
    matches!(self, ShotOutcome::Made)
  }
}

impl fmt::Display for ShotOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShotOutcome::Made => write!(f, "MADE"),
      ShotOutcome::Missed => write!(f, "MISSED"),
    }
  }
}

/// 判定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
  /// 轨迹穿越篮筐中线的几何判定
  Scored,
  /// 出手后球长时间丢失，按未进处理
  BallLost,
}

/// 一次已判定的出手
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
  pub outcome: ShotOutcome,
  pub resolution: Resolution,
  pub up_frame: u64,
  pub down_frame: Option<u64>,
  pub resolved_frame: u64,
  pub hoop: BBox,
  pub trajectory: Vec<TrackPoint>,
  pub rim_crossing_x: Option<f64>,
  pub arc_angle: Option<f64>,
  pub average_speed: Option<f64>,
}

/// 会话统计
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
  pub makes: u32,
  pub attempts: u32,
  pub misses: u32,
  /// 命中率（百分比），无出手时为 0
  pub fg_percentage: f64,
  pub mean_arc_angle: Option<f64>,
  pub mean_average_speed: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
  let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
  (count > 0).then(|| sum / count as f64)
}

impl SessionSummary {
  pub fn from_shots(makes: u32, attempts: u32, shots: &[ShotRecord]) -> Self {
    let fg_percentage = if attempts > 0 {
      makes as f64 / attempts as f64 * 100.0
    } else {
      0.0
    };
    Self {
      makes,
      attempts,
      misses: attempts - makes,
      fg_percentage,
      mean_arc_angle: mean(shots.iter().filter_map(|s| s.arc_angle)),
      mean_average_speed: mean(shots.iter().filter_map(|s| s.average_speed)),
    }
  }
}

impl fmt::Display for SessionSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "命中 {}/{} ({:.2}%)",
      self.makes, self.attempts, self.fg_percentage
    )?;
    if let Some(angle) = self.mean_arc_angle {
      write!(f, ", 平均出手角度 {:.1}°", angle)?;
    }
    if let Some(speed) = self.mean_average_speed {
      write!(f, ", 平均速度 {:.0} px/s", speed)?;
    }
    Ok(())
  }
}
