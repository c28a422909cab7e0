// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/bin/hoopline.rs - 检测日志重放与投篮判定
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

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info, warn};
use url::Url;

use hoopline::{
  FromUrl,
  input::InputWrapper,
  output::OutputSet,
  task::{ReplayTask, Task},
  tracker::{ShotTracker, TrackerConfig},
};

/// Hoopline 参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测日志来源（jsonl:///path/log.jsonl 或 stdin:），每个来源为一个会话
  #[arg(long, value_name = "SOURCE", required = true)]
  pub input: Vec<Url>,
  /// 输出（log:、jsonl:///path、image:///chart.png、folder:///dir）
  #[arg(long, value_name = "OUTPUT", default_value = "log:")]
  pub output: Vec<Url>,
  /// 状态机配置文件（JSON）
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,

  #[arg(long, value_name = "FPS")]
  pub nominal_fps: Option<f64>,
  #[arg(long, value_name = "FRAMES")]
  pub trajectory_frames: Option<usize>,
  #[arg(long, value_name = "FRAMES")]
  pub hoop_loss_timeout: Option<u32>,
  #[arg(long, value_name = "FRAMES")]
  pub ball_loss_timeout: Option<u32>,
  #[arg(long, value_name = "FRAMES")]
  pub cooldown_frames: Option<u32>,
  #[arg(long, value_name = "THRESHOLD")]
  pub min_ball_confidence: Option<f32>,
  #[arg(long, value_name = "THRESHOLD")]
  pub min_hoop_confidence: Option<f32>,

  /// 日志级别（trace、debug、info、warn、error）
  #[arg(long, value_name = "LEVEL", default_value = "info")]
  pub log_level: Level,
}

impl Args {
  fn tracker_config(&self) -> Result<TrackerConfig> {
    let mut config = match &self.config {
      Some(path) => TrackerConfig::from_json_file(path)
        .with_context(|| format!("读取配置文件失败: {}", path.display()))?,
      None => TrackerConfig::default(),
    };
    if let Some(v) = self.nominal_fps {
      config.nominal_fps = v;
    }
    if let Some(v) = self.trajectory_frames {
      config.trajectory_frames = v;
    }
    if let Some(v) = self.hoop_loss_timeout {
      config.hoop_loss_timeout = v;
    }
    if let Some(v) = self.ball_loss_timeout {
      config.ball_loss_timeout = v;
    }
    if let Some(v) = self.cooldown_frames {
      config.cooldown_frames = v;
    }
    if let Some(v) = self.min_ball_confidence {
      config.min_ball_confidence = v;
    }
    if let Some(v) = self.min_hoop_confidence {
      config.min_hoop_confidence = v;
    }
    Ok(config)
  }
}

fn install_stop_handler() -> Result<Arc<AtomicBool>> {
  let stop = Arc::new(AtomicBool::new(false));
  let flag = stop.clone();
  ctrlc::set_handler(move || {
    info!("收到中断信号，准备退出...");
    flag.store(true, Ordering::SeqCst);
    thread::spawn(|| {
      thread::sleep(Duration::from_secs(30));
      warn!("强制退出程序");
      std::process::exit(1);
    });
  })
  .context("无法设置 Ctrl-C 处理函数")?;
  Ok(stop)
}

fn main() -> Result<()> {
  let args = Args::parse();

  tracing_subscriber::fmt()
    .with_max_level(args.log_level)
    .init();

  let config = args.tracker_config()?;
  info!("状态机配置: {:?}", config);
  let mut tracker = ShotTracker::new(config.clone()).context("状态机配置无效")?;

  for url in &args.output {
    info!("输出: {}", url);
  }
  let output = OutputSet::from_urls(&args.output)?;
  let stop = install_stop_handler()?;

  for (session, url) in args.input.iter().enumerate() {
    if stop.load(Ordering::SeqCst) {
      break;
    }
    info!("会话 {}: 输入来源 {}", session + 1, url);
    let input = InputWrapper::from_url(url)?;

    let stats = ReplayTask::default()
      .with_frame_number(args.frame_number)
      .with_confidence(config.min_ball_confidence, config.min_hoop_confidence)
      .with_stop_flag(stop.clone())
      .run_task(input, &mut tracker, &output)
      .with_context(|| format!("会话 {} 处理失败", session + 1))?;

    info!(
      "会话 {} 结束: {}（{} 帧）",
      session + 1,
      tracker.summary(),
      stats.frames
    );
  }

  Ok(())
}
