// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/task.rs - 任务定义
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

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::{
  frame::FrameDetections,
  input::DetectionFrame,
  model::Model,
  output::Render,
  tracker::{FrameReport, TrackerConfig},
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 一次会话的处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
  /// 送入状态机的帧数
  pub frames: usize,
  /// 帧号未递增而跳过的帧数
  pub skipped: usize,
  pub interrupted: bool,
}

/// 逐帧重放检测日志：筛选 → 状态机 → 输出，会话开始时重置状态机
#[derive(Debug)]
pub struct ReplayTask {
  frame_number: Option<usize>,
  min_ball_confidence: f32,
  min_hoop_confidence: f32,
  stop: Option<Arc<AtomicBool>>,
}

impl Default for ReplayTask {
  fn default() -> Self {
    let config = TrackerConfig::default();
    Self {
      frame_number: None,
      min_ball_confidence: config.min_ball_confidence,
      min_hoop_confidence: config.min_hoop_confidence,
      stop: None,
    }
  }
}

impl ReplayTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_confidence(mut self, min_ball: f32, min_hoop: f32) -> Self {
    self.min_ball_confidence = min_ball;
    self.min_hoop_confidence = min_hoop;
    self
  }

  /// 每帧检查一次，置位后结束当前会话
  pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
    self.stop = Some(stop);
    self
  }

  fn stopped(&self) -> bool {
    self
      .stop
      .as_ref()
      .map(|s| s.load(Ordering::SeqCst))
      .unwrap_or(false)
  }
}

impl<
  E: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<DetectionFrame, E>>,
  M: Model<Input = FrameDetections, Output = FrameReport>,
  O: Render<FrameDetections, FrameReport, Error = RE>,
> Task<I, M, O> for ReplayTask
{
  type Output = ReplayStats;
  type Error = anyhow::Error;

  fn run_task(self, input: I, mut model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    model.reset();

    let mut stats = ReplayStats::default();
    let mut last_index: Option<u64> = None;

    for frame in input {
      if self.stopped() {
        warn!("中断信号接收，退出任务循环");
        stats.interrupted = true;
        break;
      }

      let frame = frame.context("读取检测帧失败")?;
      if let Some(last) = last_index
        && frame.index <= last
      {
        warn!("帧号 {} 未递增（上一帧 {}），跳过", frame.index, last);
        stats.skipped += 1;
        continue;
      }
      last_index = Some(frame.index);

      let detections = frame.select(self.min_ball_confidence, self.min_hoop_confidence);
      debug!(
        "处理第 {} 帧: 球 {}, 篮筐 {}",
        detections.index,
        detections.ball.is_some(),
        detections.hoop.is_some()
      );
      let report = model.infer(&detections);
      output
        .render_result(&detections, &report)
        .with_context(|| format!("第 {} 帧输出失败", detections.index))?;
      stats.frames += 1;

      if self.frame_number.map(|n| stats.frames >= n).unwrap_or(false) {
        info!("达到指定帧数 {}, 退出任务循环", stats.frames);
        break;
      }
    }

    output.finish().context("结束输出失败")?;
    info!(
      "任务完成，处理 {} 帧，跳过 {} 帧",
      stats.frames, stats.skipped
    );
    Ok(stats)
  }
}
