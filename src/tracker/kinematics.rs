// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker/kinematics.rs - 速度、距离与出手角度估计
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

//! 所有速度均按名义帧率换算（像素/秒），不使用真实时间戳。

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::frame::TrackPoint;

const MIN_FIT_SAMPLES: usize = 3;

/// 相邻两帧之间的瞬时速度
pub fn instant_speed(prev: &TrackPoint, curr: &TrackPoint, nominal_fps: f64) -> f64 {
  prev.point().distance(&curr.point()) * nominal_fps
}

/// 轨迹平均速度：累计路程除以 `(n - 1)` 个名义帧间隔
pub fn average_speed(trajectory: &[TrackPoint], nominal_fps: f64) -> Option<f64> {
  if trajectory.len() < 2 {
    return None;
  }

  let total_distance: f64 = trajectory
    .windows(2)
    .map(|w| w[0].point().distance(&w[1].point()))
    .sum();
  let elapsed = (trajectory.len() - 1) as f64 / nominal_fps;
  if elapsed == 0.0 || !elapsed.is_finite() {
    return None;
  }
  Some(total_distance / elapsed)
}

/// 出手角度（度）：对全部采样做二次最小二乘拟合，在第一个采样点处求斜率。
///
/// 图像 y 轴向下，因此取反，使向上出手为正角度。
/// 采样少于 3 个、x 坐标全部相同或拟合失败时返回 `None`。
pub fn arc_angle<'a, I>(samples: I) -> Option<f64>
where
  I: IntoIterator<Item = &'a TrackPoint>,
{
  let samples: Vec<&TrackPoint> = samples.into_iter().collect();
  if samples.len() < MIN_FIT_SAMPLES {
    return None;
  }

  let x0 = samples[0].x;
  if samples.iter().all(|p| p.x == x0) {
    return None;
  }

  let (a, b) = fit_quadratic(&samples)?;
  let slope = 2.0 * a * x0 + b;
  if !slope.is_finite() {
    return None;
  }

  let angle = -slope.atan().to_degrees();
  debug!("二次拟合 a={:.6} b={:.4}, 出手角度 {:.1}°", a, b, angle);
  Some(angle)
}

// 返回 y = a·x² + b·x + c 的 (a, b)。
// 原始 x 的范德蒙矩阵按列 L2 范数缩放后做 SVD 最小二乘，
// 奇异值低于 n·ε·σmax 视为零，秩亏时取缩放基下的最小范数解。
fn fit_quadratic(samples: &[&TrackPoint]) -> Option<(f64, f64)> {
  let n = samples.len();
  let mut design = DMatrix::from_fn(n, 3, |r, c| samples[r].x.powi(2 - c as i32));
  let target = DVector::from_iterator(n, samples.iter().map(|p| p.y));

  let mut norms = [0.0f64; 3];
  for (c, norm) in norms.iter_mut().enumerate() {
    *norm = design.column(c).norm();
    if *norm == 0.0 || !norm.is_finite() {
      return None;
    }
    design.column_mut(c).unscale_mut(*norm);
  }

  let svd = design.svd(true, true);
  let eps = n as f64 * f64::EPSILON * svd.singular_values.max();
  let coeffs = svd.solve(&target, eps).ok()?;
  let a = coeffs[0] / norms[0];
  let b = coeffs[1] / norms[1];
  if !a.is_finite() || !b.is_finite() {
    return None;
  }
  Some((a, b))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tp(x: f64, y: f64, frame: u64) -> TrackPoint {
    TrackPoint { x, y, frame }
  }

  #[test]
  fn instant_speed_uses_nominal_fps() {
    let speed = instant_speed(&tp(0.0, 0.0, 1), &tp(3.0, 4.0, 2), 30.0);
    assert!((speed - 150.0).abs() < 1e-9);
  }

  #[test]
  fn average_speed_over_trajectory() {
    let trajectory = [tp(0.0, 0.0, 1), tp(3.0, 4.0, 2), tp(3.0, 14.0, 3)];
    // 路程 15，耗时 2/30 秒
    let speed = average_speed(&trajectory, 30.0).unwrap();
    assert!((speed - 225.0).abs() < 1e-9);
    assert!(average_speed(&trajectory[..1], 30.0).is_none());
    assert!(average_speed(&[], 30.0).is_none());
  }

  #[test]
  fn arc_angle_of_exact_parabola() {
    // y = 0.01x² - 2x + 300，x0 = 0 处斜率 -2
    let samples: Vec<TrackPoint> = (0..10)
      .map(|i| {
        let x = i as f64 * 20.0;
        tp(x, 0.01 * x * x - 2.0 * x + 300.0, i)
      })
      .collect();
    let angle = arc_angle(&samples).unwrap();
    let expected = -(-2.0f64).atan().to_degrees();
    assert!((angle - expected).abs() < 1e-6, "{} vs {}", angle, expected);
    assert!(angle > 0.0);
  }

  #[test]
  fn arc_angle_uses_first_sample() {
    // 同一条抛物线，从右往左运动，x0 = 180 处斜率 1.6
    let samples: Vec<TrackPoint> = (0..10)
      .rev()
      .map(|i| {
        let x = i as f64 * 20.0;
        tp(x, 0.01 * x * x - 2.0 * x + 300.0, 9 - i)
      })
      .collect();
    let angle = arc_angle(&samples).unwrap();
    let expected = -(1.6f64).atan().to_degrees();
    assert!((angle - expected).abs() < 1e-6);
  }

  #[test]
  fn arc_angle_of_straight_line() {
    let samples = [tp(100.0, 200.0, 1), tp(110.0, 190.0, 2), tp(120.0, 180.0, 3)];
    let angle = arc_angle(&samples).unwrap();
    assert!((angle - 45.0).abs() < 1e-6);
  }

  #[test]
  fn degenerate_inputs_have_no_angle() {
    assert!(arc_angle(&[tp(1.0, 1.0, 1), tp(2.0, 2.0, 2)]).is_none());
    let vertical = [tp(150.0, 30.0, 1), tp(150.0, 90.0, 2), tp(150.0, 160.0, 3)];
    assert!(arc_angle(&vertical).is_none());
  }

  #[test]
  fn rank_deficient_fit_takes_minimum_norm_solution() {
    // 两个采样 x 相同，三个系数只由两个不同的 x 约束
    let samples = [tp(150.0, 30.0, 1), tp(150.0, 90.0, 2), tp(160.0, 160.0, 3)];
    let angle = arc_angle(&samples).unwrap();
    assert!((angle - -84.10385952638235).abs() < 1e-6, "{}", angle);
  }
}
