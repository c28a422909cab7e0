// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker/phase.rs - 单次出手的状态与冷却计数
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

use crate::frame::TrackPoint;

/// 出手生命周期：Idle → Ascending → Descending → (判定) → Idle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ShotPhase {
  #[default]
  Idle,
  /// 球已进入篮筐上方区域
  Ascending {
    up_frame: u64,
    trajectory: Vec<TrackPoint>,
  },
  /// 球随后出现在篮筐下方区域
  Descending {
    up_frame: u64,
    down_frame: u64,
    trajectory: Vec<TrackPoint>,
  },
}

impl ShotPhase {
  pub fn in_progress(&self) -> bool {
    !matches!(self, ShotPhase::Idle)
  }

  pub fn ball_up(&self) -> bool {
    self.in_progress()
  }

  pub fn ball_down(&self) -> bool {
    matches!(self, ShotPhase::Descending { .. })
  }

  pub fn up_frame(&self) -> Option<u64> {
    match self {
      ShotPhase::Idle => None,
      ShotPhase::Ascending { up_frame, .. } | ShotPhase::Descending { up_frame, .. } => {
        Some(*up_frame)
      }
    }
  }

  pub fn down_frame(&self) -> Option<u64> {
    match self {
      ShotPhase::Descending { down_frame, .. } => Some(*down_frame),
      _ => None,
    }
  }

  pub fn trajectory(&self) -> &[TrackPoint] {
    match self {
      ShotPhase::Idle => &[],
      ShotPhase::Ascending { trajectory, .. } | ShotPhase::Descending { trajectory, .. } => {
        trajectory.as_slice()
      }
    }
  }

  /// 出手进行中时追加采样，空闲时忽略
  pub fn record(&mut self, sample: TrackPoint) {
    match self {
      ShotPhase::Idle => {}
      ShotPhase::Ascending { trajectory, .. } | ShotPhase::Descending { trajectory, .. } => {
        trajectory.push(sample)
      }
    }
  }

  /// Idle → Ascending，轨迹从进入上方区域的采样重新开始
  pub fn start(&mut self, sample: TrackPoint) -> bool {
    if self.in_progress() {
      return false;
    }
    *self = ShotPhase::Ascending {
      up_frame: sample.frame,
      trajectory: vec![sample],
    };
    true
  }

  /// Ascending → Descending
  pub fn descend(&mut self, frame: u64) -> bool {
    match std::mem::take(self) {
      ShotPhase::Ascending {
        up_frame,
        trajectory,
      } => {
        *self = ShotPhase::Descending {
          up_frame,
          down_frame: frame,
          trajectory,
        };
        true
      }
      other => {
        *self = other;
        false
      }
    }
  }

  /// 上升帧严格早于下降帧时可以判定
  pub fn ready_to_resolve(&self) -> bool {
    matches!(
      self,
      ShotPhase::Descending { up_frame, down_frame, .. } if up_frame < down_frame
    )
  }

  /// 结束本次出手，回到 Idle 并取出原状态
  pub fn finish(&mut self) -> ShotPhase {
    std::mem::take(self)
  }

  pub fn into_trajectory(self) -> Vec<TrackPoint> {
    match self {
      ShotPhase::Idle => Vec::new(),
      ShotPhase::Ascending { trajectory, .. } | ShotPhase::Descending { trajectory, .. } => {
        trajectory
      }
    }
  }
}

impl fmt::Display for ShotPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShotPhase::Idle => write!(f, "Idle"),
      ShotPhase::Ascending { .. } => write!(f, "Ascending"),
      ShotPhase::Descending { .. } => write!(f, "Descending"),
    }
  }
}

/// 判定后的冷却：倒计时期间的帧不能触发判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cooldown {
  remaining: u32,
}

impl Cooldown {
  pub fn start(&mut self, frames: u32) {
    self.remaining = frames;
  }

  /// 每帧调用一次。返回 `true` 表示本帧仍处于冷却期
  pub fn tick(&mut self) -> bool {
    if self.remaining > 0 {
      self.remaining -= 1;
      true
    } else {
      false
    }
  }

  pub fn remaining(&self) -> u32 {
    self.remaining
  }
}
