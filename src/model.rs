// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/model.rs - 模型接口与检测结果
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

use crate::frame::{BBox, FrameDetections};

/// 逐帧有状态模型：按帧序调用 `infer`，新会话前调用 `reset`
pub trait Model {
  type Input;
  type Output;

  fn infer(&mut self, input: &Self::Input) -> Self::Output;
  fn reset(&mut self);
}

impl<M: Model + ?Sized> Model for &mut M {
  type Input = M::Input;
  type Output = M::Output;

  fn infer(&mut self, input: &Self::Input) -> Self::Output {
    (**self).infer(input)
  }

  fn reset(&mut self) {
    (**self).reset()
  }
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
  fn from_label_id(id: u32) -> Self;
}

/// 检测器类别：0 为球，1 为篮筐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLabel")]
pub enum ShotLabel {
  Ball,
  Hoop,
  Other(u32),
}

impl WithLabel for ShotLabel {
  fn to_label_str(&self) -> String {
    match self {
      ShotLabel::Ball => "ball".to_string(),
      ShotLabel::Hoop => "hoop".to_string(),
      ShotLabel::Other(id) => format!("class-{}", id),
    }
  }

  fn from_label_id(id: u32) -> Self {
    match id {
      0 => ShotLabel::Ball,
      1 => ShotLabel::Hoop,
      other => ShotLabel::Other(other),
    }
  }
}

// 日志中的类别既可以是类别 ID，也可以是名称
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
  Id(u32),
  Name(String),
}

impl TryFrom<RawLabel> for ShotLabel {
  type Error = String;

  fn try_from(raw: RawLabel) -> Result<Self, Self::Error> {
    match raw {
      RawLabel::Id(id) => Ok(ShotLabel::from_label_id(id)),
      RawLabel::Name(name) => match name.to_ascii_lowercase().as_str() {
        "ball" | "basketball" => Ok(ShotLabel::Ball),
        "hoop" | "rim" | "basket" => Ok(ShotLabel::Hoop),
        other => other
          .parse::<u32>()
          .map(ShotLabel::from_label_id)
          .map_err(|_| format!("未知类别: {}", name)),
      },
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectItem<T> {
  #[serde(rename = "label")]
  pub kind: T,
  pub score: f32,
  pub bbox: BBox, // [x_min, y_min, x_max, y_max]，像素坐标
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult<T> {
  pub items: Box<[DetectItem<T>]>,
}

impl<T> DetectResult<T> {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }
}

impl<T> From<Vec<DetectItem<T>>> for DetectResult<T> {
  fn from(items: Vec<DetectItem<T>>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}

impl DetectResult<ShotLabel> {
  /// 每类只保留分数严格高于阈值的最高分框
  pub fn select_best(&self, index: u64, min_ball: f32, min_hoop: f32) -> FrameDetections {
    let mut ball: Option<&DetectItem<ShotLabel>> = None;
    let mut hoop: Option<&DetectItem<ShotLabel>> = None;

    for item in self.items.iter() {
      let (slot, threshold) = match item.kind {
        ShotLabel::Ball => (&mut ball, min_ball),
        ShotLabel::Hoop => (&mut hoop, min_hoop),
        ShotLabel::Other(_) => continue,
      };
      if item.score <= threshold {
        continue;
      }
      if slot.map(|best| item.score > best.score).unwrap_or(true) {
        *slot = Some(item);
      }
    }

    FrameDetections::new(index, ball.map(|b| b.bbox), hoop.map(|h| h.bbox))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(kind: ShotLabel, score: f32, x: f64) -> DetectItem<ShotLabel> {
    DetectItem {
      kind,
      score,
      bbox: BBox::new(x, 0.0, x + 10.0, 10.0),
    }
  }

  #[test]
  fn select_best_keeps_highest_score_above_threshold() {
    let result = DetectResult::from(vec![
      item(ShotLabel::Ball, 0.45, 1.0),
      item(ShotLabel::Ball, 0.90, 2.0),
      item(ShotLabel::Hoop, 0.20, 3.0),
      item(ShotLabel::Other(7), 0.99, 4.0),
    ]);
    let frame = result.select_best(5, 0.4, 0.25);
    assert_eq!(frame.index, 5);
    assert_eq!(frame.ball.map(|b| b.x1), Some(2.0));
    assert!(frame.hoop.is_none());
  }

  #[test]
  fn threshold_is_strict() {
    let result = DetectResult::from(vec![item(ShotLabel::Hoop, 0.25, 1.0)]);
    assert!(result.select_best(0, 0.4, 0.25).hoop.is_none());
  }

  #[test]
  fn labels_parse_from_ids_and_names() {
    let by_id: DetectItem<ShotLabel> =
      serde_json::from_str(r#"{"label": 1, "score": 0.5, "bbox": [0, 0, 1, 1]}"#).unwrap();
    assert_eq!(by_id.kind, ShotLabel::Hoop);
    let by_name: DetectItem<ShotLabel> =
      serde_json::from_str(r#"{"label": "Ball", "score": 0.5, "bbox": [0, 0, 1, 1]}"#).unwrap();
    assert_eq!(by_name.kind, ShotLabel::Ball);
    assert!(
      serde_json::from_str::<DetectItem<ShotLabel>>(
        r#"{"label": "referee", "score": 0.5, "bbox": [0, 0, 1, 1]}"#
      )
      .is_err()
    );
    assert_eq!(ShotLabel::from_label_id(4).to_label_str(), "class-4");
  }
}
