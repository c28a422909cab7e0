// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker.rs - 投篮检测状态机
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

//! 投篮检测状态机
//!
//! [`ShotTracker`] 每帧接收至多一个球框和一个篮筐框，维护篮筐平滑位置、
//! 球的轨迹缓冲和当前出手状态，输出 [`ShotFrameResult`]。
//!
//! 状态机是同步、不可重入的，必须按帧序逐帧调用 `update`。丢失与冷却窗口
//! 都按帧计数，因此同一组输入重放得到完全相同的输出。
//!
//! ```
//! use hoopline::frame::BBox;
//! use hoopline::tracker::{ShotStatus, ShotTracker};
//!
//! let mut tracker = ShotTracker::default();
//! let hoop = Some(BBox::new(100.0, 100.0, 200.0, 150.0));
//! let ball = |y: f64| Some(BBox::new(140.0, y - 10.0, 160.0, y + 10.0));
//!
//! tracker.update(ball(30.0), hoop, 1);
//! tracker.update(ball(90.0), hoop, 2);
//! let result = tracker.update(ball(160.0), hoop, 3);
//! assert_eq!(result.status, ShotStatus::Made);
//! assert_eq!(result.stats(), (1, 1));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::frame::{BBox, FrameDetections, Point, TrackPoint};
use crate::model::Model;

mod config;
mod geometry;
mod history;
mod hoop;
mod kinematics;
mod phase;
mod record;

pub use self::config::{ConfigError, TrackerConfig};
pub use self::geometry::{RimCrossing, ShotZones, rim_crossing, rim_height};
pub use self::history::RingBuffer;
pub use self::hoop::{HoopFix, HoopTracker};
pub use self::kinematics::{arc_angle, average_speed, instant_speed};
pub use self::phase::{Cooldown, ShotPhase};
pub use self::record::{Resolution, SessionSummary, ShotOutcome, ShotRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShotStatus {
  /// 篮筐丢失超时，本帧清空了篮筐与出手状态
  NoDetection,
  NoAction,
  /// 球与篮筐同时可用且本帧未判定（空闲时也是）
  InProgress,
  Made,
  Missed,
}

impl ShotStatus {
  pub fn is_resolution(&self) -> bool {
    matches!(self, ShotStatus::Made | ShotStatus::Missed)
  }
}

impl From<ShotOutcome> for ShotStatus {
  fn from(outcome: ShotOutcome) -> Self {
    match outcome {
      ShotOutcome::Made => ShotStatus::Made,
      ShotOutcome::Missed => ShotStatus::Missed,
    }
  }
}

impl fmt::Display for ShotStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ShotStatus::NoDetection => "NO_DETECTION",
      ShotStatus::NoAction => "NO_ACTION",
      ShotStatus::InProgress => "IN_PROGRESS",
      ShotStatus::Made => "MADE",
      ShotStatus::Missed => "MISSED",
    };
    f.write_str(s)
  }
}

/// 每帧输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotFrameResult {
  pub frame: u64,
  pub status: ShotStatus,
  pub makes: u32,
  pub attempts: u32,
  /// 最近一次出手的角度（度）
  pub last_arc_angle: Option<f64>,
  /// 瞬时速度（像素/秒）
  pub instant_speed: Option<f64>,
  /// 最近一次出手的平均速度（像素/秒）
  pub last_shot_average_speed: Option<f64>,
  /// 球心到篮筐中心的距离（像素）
  pub ball_to_hoop_distance: Option<f64>,
  pub previous_outcome: Option<ShotOutcome>,
}

impl ShotFrameResult {
  /// `(命中, 出手)`
  pub fn stats(&self) -> (u32, u32) {
    (self.makes, self.attempts)
  }
}

/// 交给输出层的一帧报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
  pub result: ShotFrameResult,
  /// 本帧有效篮筐（检测值或平滑值）
  pub hoop: Option<BBox>,
  pub ball: Option<Point>,
  /// 本帧判定的出手
  pub shot: Option<ShotRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotTracker {
  config: TrackerConfig,
  hoop: HoopTracker,
  trajectory: RingBuffer<TrackPoint>,
  phase: ShotPhase,
  cooldown: Cooldown,
  ball_lost_frames: u32,
  frame: u64,

  shots_made: u32,
  shots_attempted: u32,
  shots: Vec<ShotRecord>,

  last_arc_angle: Option<f64>,
  instant_speed: Option<f64>,
  last_shot_average_speed: Option<f64>,
  ball_to_hoop_distance: Option<f64>,
  previous_outcome: Option<ShotOutcome>,
}

impl Default for ShotTracker {
  fn default() -> Self {
    Self::with_config(TrackerConfig::default())
  }
}

impl ShotTracker {
  pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    debug!("投篮检测器初始化: {:?}", config);
    Ok(Self::with_config(config))
  }

  fn with_config(config: TrackerConfig) -> Self {
    Self {
      hoop: HoopTracker::new(config.hoop_history, config.hoop_loss_timeout),
      trajectory: RingBuffer::with_capacity(config.trajectory_frames),
      phase: ShotPhase::Idle,
      cooldown: Cooldown::default(),
      ball_lost_frames: 0,
      frame: 0,
      shots_made: 0,
      shots_attempted: 0,
      shots: Vec::new(),
      last_arc_angle: None,
      instant_speed: None,
      last_shot_average_speed: None,
      ball_to_hoop_distance: None,
      previous_outcome: None,
      config,
    }
  }

  /// 输入一帧的球框与篮筐框（均可缺失），帧号必须单调递增
  pub fn update(&mut self, ball: Option<BBox>, hoop: Option<BBox>, frame: u64) -> ShotFrameResult {
    self.frame = frame;
    let blocked = self.cooldown.tick();

    if self.hoop.observe(hoop) == HoopFix::Lost {
      self.reset_shot_state(true);
      self.ball_to_hoop_distance = None;
      return self.result(ShotStatus::NoDetection);
    }

    // 只有球与篮筐同时可用时才报告 IN_PROGRESS，其余未判定的帧均为 NO_ACTION
    let ball = ball.map(|b| b.center());
    let status = match (ball, self.hoop.bbox()) {
      (Some(ball), Some(hoop)) => match self.track_with_hoop(ball, hoop, blocked) {
        Some(outcome) => outcome.into(),
        None => ShotStatus::InProgress,
      },
      (None, Some(hoop)) => self
        .track_ball_lost(hoop, blocked)
        .map_or(ShotStatus::NoAction, ShotStatus::from),
      (Some(ball), None) => {
        self.ball_to_hoop_distance = None;
        self.ball_lost_frames = 0;
        self.push_sample(ball);
        ShotStatus::NoAction
      }
      (None, None) => {
        self.instant_speed = None;
        self.ball_to_hoop_distance = None;
        ShotStatus::NoAction
      }
    };
    self.result(status)
  }

  fn track_with_hoop(&mut self, ball: Point, hoop: BBox, blocked: bool) -> Option<ShotOutcome> {
    let sample = self.push_sample(ball);
    self.phase.record(sample);
    self.ball_lost_frames = 0;
    self.ball_to_hoop_distance = Some(ball.distance(&hoop.center()));

    let zones = ShotZones::new(hoop);
    if !self.phase.ball_up() && zones.in_upper_zone(ball) {
      self.phase.start(sample);
      debug!(
        "帧 {}: 球进入篮筐上方区域 y={:.1}, 上沿={:.1}",
        self.frame,
        ball.y,
        zones.upper_zone_y()
      );
    }

    if self.phase.ball_up() && !self.phase.ball_down() && zones.in_lower_zone(ball) {
      self.phase.descend(self.frame);
      debug!(
        "帧 {}: 球进入篮筐下方区域 y={:.1}, 下沿={:.1}",
        self.frame, ball.y, hoop.y2
      );
    }

    if self.phase.ready_to_resolve() && !blocked {
      let crossing = rim_crossing(&hoop, self.phase.trajectory());
      let outcome = match crossing {
        Some(RimCrossing { made: true, .. }) => ShotOutcome::Made,
        _ => ShotOutcome::Missed,
      };
      return Some(self.resolve(outcome, Resolution::Scored, hoop, crossing.map(|c| c.x)));
    }

    None
  }

  fn track_ball_lost(&mut self, hoop: BBox, blocked: bool) -> Option<ShotOutcome> {
    self.instant_speed = None;
    self.ball_to_hoop_distance = None;

    if !self.phase.in_progress() || blocked {
      return None;
    }

    self.ball_lost_frames += 1;
    if self.ball_lost_frames > self.config.ball_loss_timeout
      && self.phase.ball_up()
      && !self.phase.ball_down()
    {
      warn!(
        "帧 {}: 出手后球连续 {} 帧丢失，按未进处理",
        self.frame, self.ball_lost_frames
      );
      return Some(self.resolve(ShotOutcome::Missed, Resolution::BallLost, hoop, None));
    }
    None
  }

  fn push_sample(&mut self, ball: Point) -> TrackPoint {
    let sample = TrackPoint::new(ball, self.frame);
    self.trajectory.push(sample);
    self.instant_speed = self
      .trajectory
      .last_pair()
      .map(|(prev, curr)| instant_speed(prev, curr, self.config.nominal_fps));
    sample
  }

  fn resolve(
    &mut self,
    outcome: ShotOutcome,
    resolution: Resolution,
    hoop: BBox,
    rim_crossing_x: Option<f64>,
  ) -> ShotOutcome {
    self.shots_attempted += 1;
    if outcome.is_made() {
      self.shots_made += 1;
    }
    self.previous_outcome = Some(outcome);

    let finished = self.phase.finish();
    let up_frame = finished.up_frame().unwrap_or(self.frame);
    let down_frame = finished.down_frame();
    let trajectory = finished.into_trajectory();

    self.last_arc_angle = arc_angle(self.trajectory.iter());
    self.last_shot_average_speed = average_speed(&trajectory, self.config.nominal_fps);

    match rim_crossing_x {
      Some(x) => info!(
        "帧 {}: {} 穿越点 x={:.1}, 容差中心 x={:.1}, 命中 {}/{}",
        self.frame,
        outcome,
        x,
        hoop.center().x,
        self.shots_made,
        self.shots_attempted
      ),
      None => info!(
        "帧 {}: {} ({:?}), 命中 {}/{}",
        self.frame, outcome, resolution, self.shots_made, self.shots_attempted
      ),
    }

    self.shots.push(ShotRecord {
      outcome,
      resolution,
      up_frame,
      down_frame,
      resolved_frame: self.frame,
      hoop,
      trajectory,
      rim_crossing_x,
      arc_angle: self.last_arc_angle,
      average_speed: self.last_shot_average_speed,
    });

    self.reset_shot_state(false);
    self.cooldown.start(self.config.cooldown_frames);
    outcome
  }

  // 单次出手复位，保留计数与刚算出的统计
  fn reset_shot_state(&mut self, clear_stats: bool) {
    self.phase = ShotPhase::Idle;
    self.trajectory.clear();
    self.ball_lost_frames = 0;
    if clear_stats {
      self.last_arc_angle = None;
      self.last_shot_average_speed = None;
    }
  }

  /// 完全复位（新视频/新会话），计数一并清零
  pub fn full_reset(&mut self) {
    *self = Self::with_config(self.config.clone());
    debug!("投篮检测器已完全复位");
  }

  fn result(&self, status: ShotStatus) -> ShotFrameResult {
    ShotFrameResult {
      frame: self.frame,
      status,
      makes: self.shots_made,
      attempts: self.shots_attempted,
      last_arc_angle: self.last_arc_angle,
      instant_speed: self.instant_speed,
      last_shot_average_speed: self.last_shot_average_speed,
      ball_to_hoop_distance: self.ball_to_hoop_distance,
      previous_outcome: self.previous_outcome,
    }
  }

  pub fn config(&self) -> &TrackerConfig {
    &self.config
  }

  /// `(命中, 出手)`
  pub fn stats(&self) -> (u32, u32) {
    (self.shots_made, self.shots_attempted)
  }

  pub fn phase(&self) -> &ShotPhase {
    &self.phase
  }

  pub fn hoop_bbox(&self) -> Option<BBox> {
    self.hoop.bbox()
  }

  pub fn trajectory(&self) -> &RingBuffer<TrackPoint> {
    &self.trajectory
  }

  pub fn shot_trajectory(&self) -> &[TrackPoint] {
    self.phase.trajectory()
  }

  pub fn cooldown_remaining(&self) -> u32 {
    self.cooldown.remaining()
  }

  pub fn shots(&self) -> &[ShotRecord] {
    &self.shots
  }

  pub fn last_shot(&self) -> Option<&ShotRecord> {
    self.shots.last()
  }

  pub fn summary(&self) -> SessionSummary {
    SessionSummary::from_shots(self.shots_made, self.shots_attempted, &self.shots)
  }
}

impl Model for ShotTracker {
  type Input = FrameDetections;
  type Output = FrameReport;

  fn infer(&mut self, input: &FrameDetections) -> FrameReport {
    let result = self.update(input.ball, input.hoop, input.index);
    let shot = if result.status.is_resolution() {
      self.last_shot().cloned()
    } else {
      None
    };
    FrameReport {
      result,
      hoop: self.hoop_bbox(),
      ball: input.ball_center(),
      shot,
    }
  }

  fn reset(&mut self) {
    self.full_reset();
  }
}
