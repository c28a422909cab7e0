// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/output/log_output.rs - 日志输出
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

use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::FrameDetections,
  output::{Render, query_flag},
  tracker::{FrameReport, SessionSummary, ShotRecord, ShotStatus},
};

#[derive(Error, Debug)]
pub enum LogOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

#[derive(Default)]
struct SessionLog {
  makes: u32,
  attempts: u32,
  frames: u64,
  shots: Vec<ShotRecord>,
}

/// 以 tracing 事件输出判定结果：`log:`，`log:?frames` 逐帧输出
pub struct LogOutput {
  every_frame: bool,
  session: Mutex<SessionLog>,
}

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = LogOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogOutputError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(LogOutput {
      every_frame: query_flag(url, "frames"),
      session: Mutex::new(SessionLog::default()),
    })
  }
}

impl LogOutput {
  /// 当前会话统计
  pub fn summary(&self) -> SessionSummary {
    let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
    SessionSummary::from_shots(session.makes, session.attempts, &session.shots)
  }
}

impl Render<FrameDetections, FrameReport> for LogOutput {
  type Error = LogOutputError;

  fn render_result(&self, frame: &FrameDetections, report: &FrameReport) -> Result<(), Self::Error> {
    let result = &report.result;
    let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
    session.frames += 1;
    session.makes = result.makes;
    session.attempts = result.attempts;
    if let Some(shot) = &report.shot {
      session.shots.push(shot.clone());
    }

    match result.status {
      ShotStatus::Made | ShotStatus::Missed => {
        let shot = report.shot.as_ref();
        info!(
          frame = result.frame,
          status = %result.status,
          makes = result.makes,
          attempts = result.attempts,
          arc_angle = ?result.last_arc_angle,
          average_speed = ?result.last_shot_average_speed,
          rim_crossing_x = ?shot.and_then(|s| s.rim_crossing_x),
          resolution = ?shot.map(|s| s.resolution),
          "投篮判定"
        );
      }
      ShotStatus::NoDetection => {
        warn!(frame = result.frame, "篮筐丢失超时，状态已重置");
      }
      _ if self.every_frame => {
        info!(
          frame = result.frame,
          status = %result.status,
          ball = frame.ball.is_some(),
          hoop = frame.hoop.is_some(),
          speed = ?result.instant_speed,
          distance = ?result.ball_to_hoop_distance,
          "帧状态"
        );
      }
      _ => {
        debug!(frame = result.frame, status = %result.status, "帧状态");
      }
    }
    Ok(())
  }

  fn finish(&self) -> Result<(), Self::Error> {
    let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
    let summary = SessionSummary::from_shots(session.makes, session.attempts, &session.shots);
    info!(frames = session.frames, "会话结束: {}", summary);
    *session = SessionLog::default();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Model;
  use crate::frame::BBox;
  use crate::tracker::ShotTracker;

  #[test]
  fn collects_session_summary() {
    let output = LogOutput::from_url(&Url::parse("log:?frames").unwrap()).unwrap();
    assert!(output.every_frame);

    let hoop = Some(BBox::new(100.0, 100.0, 200.0, 150.0));
    let mut tracker = ShotTracker::default();
    for (i, y) in [30.0, 90.0, 160.0].into_iter().enumerate() {
      let frame = FrameDetections::new(
        i as u64 + 1,
        Some(BBox::new(140.0, y - 10.0, 160.0, y + 10.0)),
        hoop,
      );
      let report = tracker.infer(&frame);
      output.render_result(&frame, &report).unwrap();
    }
    let summary = output.summary();
    assert_eq!((summary.makes, summary.attempts), (1, 1));

    output.finish().unwrap();
    assert_eq!(output.summary().attempts, 0);
  }

  #[test]
  fn rejects_other_scheme() {
    assert!(LogOutput::from_url(&Url::parse("jsonl:///tmp/a").unwrap()).is_err());
  }
}
