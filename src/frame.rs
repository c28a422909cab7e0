// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/frame.rs - 帧内检测框与轨迹点定义
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

use serde::{Deserialize, Serialize};

/// 像素坐标系下的点（y 轴向下）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// 欧氏距离（像素）
  pub fn distance(&self, other: &Point) -> f64 {
    (self.x - other.x).hypot(self.y - other.y)
  }
}

/// 轴对齐边界框 `(x1, y1, x2, y2)`，像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
  pub x1: f64,
  pub y1: f64,
  pub x2: f64,
  pub y2: f64,
}

impl BBox {
  pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
    Self { x1, y1, x2, y2 }
  }

  pub fn width(&self) -> f64 {
    self.x2 - self.x1
  }

  pub fn height(&self) -> f64 {
    self.y2 - self.y1
  }

  pub fn center(&self) -> Point {
    Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
  }

  /// 逐坐标算术平均，空序列返回 `None`
  pub fn mean<'a, I>(boxes: I) -> Option<BBox>
  where
    I: IntoIterator<Item = &'a BBox>,
  {
    let mut count = 0usize;
    let mut sum = [0.0f64; 4];
    for bbox in boxes {
      sum[0] += bbox.x1;
      sum[1] += bbox.y1;
      sum[2] += bbox.x2;
      sum[3] += bbox.y2;
      count += 1;
    }
    if count == 0 {
      return None;
    }
    let n = count as f64;
    Some(BBox::new(sum[0] / n, sum[1] / n, sum[2] / n, sum[3] / n))
  }
}

impl From<[f64; 4]> for BBox {
  fn from(v: [f64; 4]) -> Self {
    BBox::new(v[0], v[1], v[2], v[3])
  }
}

impl From<BBox> for [f64; 4] {
  fn from(b: BBox) -> Self {
    [b.x1, b.y1, b.x2, b.y2]
  }
}

/// 带帧号的球心采样 `(x, y, frame_index)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
  pub x: f64,
  pub y: f64,
  pub frame: u64,
}

impl TrackPoint {
  pub fn new(point: Point, frame: u64) -> Self {
    Self {
      x: point.x,
      y: point.y,
      frame,
    }
  }

  pub fn point(&self) -> Point {
    Point::new(self.x, self.y)
  }
}

/// 单帧筛选后的检测结果：每类至多一个框
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameDetections {
  /// 帧索引（调用方保证单调递增）
  pub index: u64,
  pub ball: Option<BBox>,
  pub hoop: Option<BBox>,
}

impl FrameDetections {
  pub fn new(index: u64, ball: Option<BBox>, hoop: Option<BBox>) -> Self {
    Self { index, ball, hoop }
  }

  pub fn ball_center(&self) -> Option<Point> {
    self.ball.map(|b| b.center())
  }
}
