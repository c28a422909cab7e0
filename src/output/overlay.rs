// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/output/overlay.rs - 显示层状态：球轨迹尾迹与判定闪烁
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

use crate::frame::Point;
use crate::tracker::{FrameReport, RingBuffer, ShotOutcome, ShotStatus};

const TRAIL_LENGTH: usize = 15;
const FLASH_FRAMES: u32 = 15;

/// 最近若干帧的球心，越新的点权重越大
#[derive(Debug, Clone)]
pub struct BallTrail {
  positions: RingBuffer<Point>,
}

impl Default for BallTrail {
  fn default() -> Self {
    Self::with_length(TRAIL_LENGTH)
  }
}

impl BallTrail {
  pub fn with_length(length: usize) -> Self {
    Self {
      positions: RingBuffer::with_capacity(length),
    }
  }

  pub fn push(&mut self, position: Point) {
    self.positions.push(position);
  }

  pub fn clear(&mut self) {
    self.positions.clear();
  }

  pub fn len(&self) -> usize {
    self.positions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  /// 由旧到新的 `(位置, 淡出权重)`，权重为 `(i + 1) / len`
  pub fn faded(&self) -> impl Iterator<Item = (Point, f32)> + '_ {
    let len = self.positions.len() as f32;
    self
      .positions
      .iter()
      .enumerate()
      .map(move |(i, p)| (*p, (i + 1) as f32 / len))
  }
}

/// 判定后的闪烁倒计时，新的判定覆盖正在进行的闪烁
#[derive(Debug, Clone, Default)]
pub struct ShotFlash {
  active: Option<(ShotOutcome, u32)>,
}

impl ShotFlash {
  pub fn trigger(&mut self, outcome: ShotOutcome) {
    self.active = Some((outcome, FLASH_FRAMES));
  }

  /// 每帧调用一次，返回本帧闪烁类型与剩余帧数
  pub fn tick(&mut self) -> Option<(ShotOutcome, u32)> {
    let (outcome, remaining) = self.active?;
    let remaining = remaining - 1;
    self.active = (remaining > 0).then_some((outcome, remaining));
    Some((outcome, remaining))
  }

  /// 闪烁强度 0.0 ~ 1.0
  pub fn intensity(remaining: u32) -> f32 {
    remaining as f32 / FLASH_FRAMES as f32
  }

  pub fn clear(&mut self) {
    self.active = None;
  }
}

#[derive(Debug, Clone, Default)]
pub struct Overlay {
  pub trail: BallTrail,
  pub flash: ShotFlash,
}

impl Overlay {
  /// 根据一帧报告更新显示状态，返回本帧闪烁
  pub fn update(&mut self, report: &FrameReport) -> Option<(ShotOutcome, u32)> {
    if let Some(ball) = report.ball {
      self.trail.push(ball);
    }
    match report.result.status {
      ShotStatus::Made => self.flash.trigger(ShotOutcome::Made),
      ShotStatus::Missed => self.flash.trigger(ShotOutcome::Missed),
      _ => {}
    }
    self.flash.tick()
  }

  pub fn reset(&mut self) {
    self.trail.clear();
    self.flash.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trail_keeps_last_positions_with_fade() {
    let mut trail = BallTrail::with_length(3);
    for i in 0..5 {
      trail.push(Point::new(i as f64, 0.0));
    }
    let faded: Vec<(Point, f32)> = trail.faded().collect();
    assert_eq!(faded.len(), 3);
    assert_eq!(faded[0].0.x, 2.0);
    assert!((faded[0].1 - 1.0 / 3.0).abs() < 1e-6);
    assert_eq!(faded[2].1, 1.0);
  }

  #[test]
  fn flash_counts_down_and_is_replaced() {
    let mut flash = ShotFlash::default();
    assert!(flash.tick().is_none());
    flash.trigger(ShotOutcome::Made);
    assert_eq!(flash.tick(), Some((ShotOutcome::Made, 14)));
    flash.trigger(ShotOutcome::Missed);
    assert_eq!(flash.tick(), Some((ShotOutcome::Missed, 14)));
    for _ in 0..13 {
      assert!(flash.tick().is_some());
    }
    assert_eq!(flash.tick(), Some((ShotOutcome::Missed, 0)));
    assert!(flash.tick().is_none());
  }
}
