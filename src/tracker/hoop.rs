// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker/hoop.rs - 篮筐位置跟踪与平滑
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

use tracing::{debug, warn};

use crate::frame::BBox;
use crate::tracker::history::RingBuffer;

/// 本帧篮筐来源
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoopFix {
  /// 本帧检测到篮筐
  Detected(BBox),
  /// 未检测到，使用历史平均
  Smoothed(BBox),
  /// 从未见过篮筐（或已被清空）
  Absent,
  /// 丢失超时，本帧清空了篮筐状态
  Lost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoopTracker {
  current: Option<BBox>,
  history: RingBuffer<BBox>,
  missed_frames: u32,
  loss_timeout: u32,
}

impl HoopTracker {
  pub fn new(history: usize, loss_timeout: u32) -> Self {
    Self {
      current: None,
      history: RingBuffer::with_capacity(history),
      missed_frames: 0,
      loss_timeout,
    }
  }

  /// 输入本帧检测，返回本帧有效篮筐的来源
  pub fn observe(&mut self, detection: Option<BBox>) -> HoopFix {
    if let Some(bbox) = detection {
      self.current = Some(bbox);
      self.history.push(bbox);
      self.missed_frames = 0;
      return HoopFix::Detected(bbox);
    }

    if self.history.is_empty() {
      return HoopFix::Absent;
    }

    self.missed_frames += 1;
    if self.missed_frames > self.loss_timeout {
      warn!("篮筐连续 {} 帧未检测到，清空篮筐状态", self.missed_frames);
      self.clear();
      return HoopFix::Lost;
    }

    match self.history.mean() {
      Some(smoothed) => {
        debug!(
          "篮筐未检测到（第 {} 帧），使用 {} 个历史框的平均位置",
          self.missed_frames,
          self.history.len()
        );
        self.current = Some(smoothed);
        HoopFix::Smoothed(smoothed)
      }
      None => HoopFix::Absent,
    }
  }

  pub fn bbox(&self) -> Option<BBox> {
    self.current
  }

  pub fn clear(&mut self) {
    self.current = None;
    self.history.clear();
    self.missed_frames = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::Point;

  const HOOP: BBox = BBox {
    x1: 100.0,
    y1: 100.0,
    x2: 200.0,
    y2: 150.0,
  };

  #[test]
  fn detection_overrides_smoothing() {
    let mut hoop = HoopTracker::new(10, 30);
    hoop.observe(Some(HOOP));
    let moved = BBox::new(120.0, 100.0, 220.0, 150.0);
    assert_eq!(hoop.observe(Some(moved)), HoopFix::Detected(moved));
    assert_eq!(hoop.bbox(), Some(moved));
  }

  #[test]
  fn missing_hoop_uses_history_mean() {
    let mut hoop = HoopTracker::new(10, 30);
    hoop.observe(Some(HOOP));
    hoop.observe(Some(BBox::new(110.0, 100.0, 210.0, 150.0)));
    let fix = hoop.observe(None);
    assert_eq!(fix, HoopFix::Smoothed(BBox::new(105.0, 100.0, 205.0, 150.0)));
    assert_eq!(hoop.bbox().map(|b| b.center()), Some(Point::new(155.0, 125.0)));
  }

  #[test]
  fn never_seen_is_absent() {
    let mut hoop = HoopTracker::new(10, 30);
    assert_eq!(hoop.observe(None), HoopFix::Absent);
    assert_eq!(hoop.missed_frames, 0);
  }

  #[test]
  fn loss_timeout_clears_state() {
    let mut hoop = HoopTracker::new(10, 3);
    hoop.observe(Some(HOOP));
    for _ in 0..3 {
      assert!(matches!(hoop.observe(None), HoopFix::Smoothed(_)));
    }
    assert_eq!(hoop.observe(None), HoopFix::Lost);
    assert!(hoop.bbox().is_none());
    assert!(hoop.history.is_empty());
    assert_eq!(hoop.observe(None), HoopFix::Absent);
  }
}
