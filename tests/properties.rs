// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// tests/properties.rs - 状态机不变量
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

use hoopline::frame::BBox;
use hoopline::tracker::{ShotPhase, ShotTracker, TrackerConfig};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
struct Step {
  ball: Option<(f64, f64)>,
  hoop: Option<(f64, f64)>,
}

fn step() -> impl Strategy<Value = Step> {
  (
    prop::option::weighted(0.8, (0.0f64..400.0, 0.0f64..300.0)),
    // 篮筐大多可见，位置轻微抖动
    prop::option::weighted(0.85, (-3.0f64..3.0, -3.0f64..3.0)),
  )
    .prop_map(|(ball, hoop)| Step { ball, hoop })
}

fn ball_box((x, y): (f64, f64)) -> BBox {
  BBox::new(x - 10.0, y - 10.0, x + 10.0, y + 10.0)
}

fn hoop_box((dx, dy): (f64, f64)) -> BBox {
  BBox::new(100.0 + dx, 100.0 + dy, 200.0 + dx, 150.0 + dy)
}

fn feed(tracker: &mut ShotTracker, steps: &[Step]) -> Vec<hoopline::tracker::ShotFrameResult> {
  steps
    .iter()
    .enumerate()
    .map(|(i, s)| tracker.update(s.ball.map(ball_box), s.hoop.map(hoop_box), i as u64))
    .collect()
}

proptest! {
  #[test]
  fn makes_never_exceed_attempts(steps in prop::collection::vec(step(), 1..300)) {
    let mut tracker = ShotTracker::default();
    for (i, s) in steps.iter().enumerate() {
      let result = tracker.update(s.ball.map(ball_box), s.hoop.map(hoop_box), i as u64);
      prop_assert!(result.makes <= result.attempts);
    }
  }

  #[test]
  fn resolution_leaves_tracker_idle(steps in prop::collection::vec(step(), 1..300)) {
    let mut tracker = ShotTracker::default();
    for (i, s) in steps.iter().enumerate() {
      let result = tracker.update(s.ball.map(ball_box), s.hoop.map(hoop_box), i as u64);
      if result.status.is_resolution() {
        prop_assert_eq!(tracker.phase(), &ShotPhase::Idle);
        prop_assert!(!tracker.phase().ball_up() && !tracker.phase().ball_down());
        prop_assert!(tracker.shot_trajectory().is_empty());
        prop_assert!(tracker.trajectory().is_empty());
      }
    }
  }

  #[test]
  fn resolutions_are_separated_by_cooldown(steps in prop::collection::vec(step(), 1..400)) {
    let config = TrackerConfig::default();
    let mut tracker = ShotTracker::new(config.clone()).unwrap();
    let resolved: Vec<u64> = feed(&mut tracker, &steps)
      .into_iter()
      .filter(|r| r.status.is_resolution())
      .map(|r| r.frame)
      .collect();
    for pair in resolved.windows(2) {
      prop_assert!(pair[1] - pair[0] > config.cooldown_frames as u64);
    }
    prop_assert_eq!(resolved.len() as u32, tracker.stats().1);
    prop_assert_eq!(tracker.shots().len(), resolved.len());
  }

  #[test]
  fn replay_is_deterministic(steps in prop::collection::vec(step(), 1..200)) {
    let mut a = ShotTracker::default();
    let mut b = ShotTracker::default();
    prop_assert_eq!(feed(&mut a, &steps), feed(&mut b, &steps));
    prop_assert_eq!(a, b);
  }

  #[test]
  fn full_reset_is_idempotent(steps in prop::collection::vec(step(), 0..200)) {
    let mut tracker = ShotTracker::default();
    feed(&mut tracker, &steps);

    tracker.full_reset();
    let once = tracker.clone();
    tracker.full_reset();
    prop_assert_eq!(&once, &tracker);
    prop_assert_eq!(once, ShotTracker::default());
  }

  #[test]
  fn reset_then_replay_matches_fresh_tracker(
    warmup in prop::collection::vec(step(), 0..100),
    steps in prop::collection::vec(step(), 1..100),
  ) {
    let mut reused = ShotTracker::default();
    feed(&mut reused, &warmup);
    reused.full_reset();

    let mut fresh = ShotTracker::default();
    prop_assert_eq!(feed(&mut reused, &steps), feed(&mut fresh, &steps));
  }
}
