// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker/geometry.rs - 篮筐区域几何与进球判定
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

use crate::frame::{BBox, Point, TrackPoint};

// 上方触发区：篮筐顶部再往上 1.2 倍筐高，左右各放宽 2 倍筐宽
const UPPER_ZONE_HEIGHT_FACTOR: f64 = 1.2;
const UPPER_ZONE_WIDTH_FACTOR: f64 = 2.0;
// 下方触发区：篮筐底部以下，左右各放宽 1.5 倍筐宽
const LOWER_ZONE_WIDTH_FACTOR: f64 = 1.5;
// 篮筐中线，作为穿越平面
const RIM_HEIGHT_FACTOR: f64 = 0.5;
// 穿越点容差：中心左右 0.7 倍筐宽
const RIM_TOLERANCE_FACTOR: f64 = 0.7;
const MIN_SCORING_SAMPLES: usize = 3;

/// 由本帧有效篮筐推导出的触发区域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotZones {
  hoop: BBox,
}

impl ShotZones {
  pub fn new(hoop: BBox) -> Self {
    Self { hoop }
  }

  /// 上方区域下边界，y 小于该值视为在篮筐上方
  pub fn upper_zone_y(&self) -> f64 {
    self.hoop.y1 - self.hoop.height() * UPPER_ZONE_HEIGHT_FACTOR
  }

  pub fn rim_height(&self) -> f64 {
    rim_height(&self.hoop)
  }

  pub fn in_upper_zone(&self, ball: Point) -> bool {
    let w = self.hoop.width();
    ball.y < self.upper_zone_y()
      && ball.x >= self.hoop.x1 - w * UPPER_ZONE_WIDTH_FACTOR
      && ball.x <= self.hoop.x2 + w * UPPER_ZONE_WIDTH_FACTOR
  }

  pub fn in_lower_zone(&self, ball: Point) -> bool {
    let w = self.hoop.width();
    ball.y > self.hoop.y2
      && ball.x >= self.hoop.x1 - w * LOWER_ZONE_WIDTH_FACTOR
      && ball.x <= self.hoop.x2 + w * LOWER_ZONE_WIDTH_FACTOR
  }
}

pub fn rim_height(hoop: &BBox) -> f64 {
  hoop.y1 + hoop.height() * RIM_HEIGHT_FACTOR
}

/// 轨迹穿越篮筐中线的位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RimCrossing {
  pub x: f64,
  pub made: bool,
}

/// 用篮筐中线上下最近的两个采样点线性插值出穿越点。
/// 数据不足以判断时返回 `None`，调用方按未进处理。
pub fn rim_crossing(hoop: &BBox, trajectory: &[TrackPoint]) -> Option<RimCrossing> {
  if trajectory.len() < MIN_SCORING_SAMPLES {
    return None;
  }

  let rim = rim_height(hoop);
  let mut above: Option<&TrackPoint> = None;
  let mut below: Option<&TrackPoint> = None;
  for p in trajectory {
    if p.y < rim {
      // 上方最靠近中线（y 最大）的点
      if above.map(|a| p.y > a.y).unwrap_or(true) {
        above = Some(p);
      }
    } else if below.map(|b| p.y < b.y).unwrap_or(true) {
      below = Some(p);
    }
  }

  let (a, b) = (above?, below?);
  if b.y == a.y {
    return None;
  }

  let t = (rim - a.y) / (b.y - a.y);
  let x = a.x + t * (b.x - a.x);
  let center_x = hoop.center().x;
  let tolerance = RIM_TOLERANCE_FACTOR * hoop.width();
  let made = x >= center_x - tolerance && x <= center_x + tolerance;
  Some(RimCrossing { x, made })
}
