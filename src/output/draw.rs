// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/output/draw.rs - 投篮轨迹可视化
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

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::{
  frame::{BBox, Point, TrackPoint},
  output::overlay::{BallTrail, ShotFlash},
  tracker::{FrameReport, ShotOutcome, ShotRecord, rim_height},
};

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

const BACKGROUND_COLOR: [u8; 3] = [24, 24, 24];
const HOOP_COLOR: [u8; 3] = [0, 200, 255];
const RIM_COLOR: [u8; 3] = [255, 255, 255];
const BALL_COLOR: [u8; 3] = [255, 140, 0];
const MADE_COLOR: [u8; 3] = [0, 220, 0];
const MISSED_COLOR: [u8; 3] = [230, 0, 0];
const BALL_RADIUS: i32 = 8;
const TRAIL_MAX_RADIUS: f32 = 6.0;
const FLASH_MAX_ALPHA: f32 = 0.35;

fn blend(from: [u8; 3], to: [u8; 3], t: f32) -> [u8; 3] {
  let t = t.clamp(0.0, 1.0);
  let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
  [mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])]
}

fn outcome_color(outcome: ShotOutcome) -> [u8; 3] {
  match outcome {
    ShotOutcome::Made => MADE_COLOR,
    ShotOutcome::Missed => MISSED_COLOR,
  }
}

pub struct Draw {
  width: u32,
  height: u32,
  background: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
  }
}

impl Draw {
  pub fn with_size(width: u32, height: u32) -> Self {
    Self {
      width: width.max(1),
      height: height.max(1),
      background: BACKGROUND_COLOR,
    }
  }

  pub fn size(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  fn canvas(&self) -> RgbImage {
    RgbImage::from_pixel(self.width, self.height, Rgb(self.background))
  }

  // 两像素宽的边框，宽高不足一像素时跳过
  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BBox, color: [u8; 3]) {
    for inset in 0..2 {
      let x = bbox.x1.floor() as i32 + inset;
      let y = bbox.y1.floor() as i32 + inset;
      let w = bbox.width().round() as i32 - 2 * inset;
      let h = bbox.height().round() as i32 - 2 * inset;
      if w < 1 || h < 1 {
        return;
      }
      draw_hollow_rect_mut(image, Rect::at(x, y).of_size(w as u32, h as u32), Rgb(color));
    }
  }

  fn draw_rim(&self, image: &mut RgbImage, hoop: &BBox) {
    let y = rim_height(hoop) as f32;
    draw_line_segment_mut(
      image,
      (hoop.x1 as f32, y),
      (hoop.x2 as f32, y),
      Rgb(RIM_COLOR),
    );
  }

  fn draw_path(&self, image: &mut RgbImage, points: &[TrackPoint], color: [u8; 3]) {
    for pair in points.windows(2) {
      draw_line_segment_mut(
        image,
        (pair[0].x as f32, pair[0].y as f32),
        (pair[1].x as f32, pair[1].y as f32),
        Rgb(color),
      );
    }
    for p in points {
      draw_filled_circle_mut(image, (p.x.round() as i32, p.y.round() as i32), 2, Rgb(color));
    }
  }

  fn draw_trail(&self, image: &mut RgbImage, trail: &BallTrail) {
    for (p, fade) in trail.faded() {
      let radius = (TRAIL_MAX_RADIUS * fade).round().max(1.0) as i32;
      let color = blend(self.background, BALL_COLOR, fade);
      draw_filled_circle_mut(image, (p.x.round() as i32, p.y.round() as i32), radius, Rgb(color));
    }
  }

  fn draw_ball(&self, image: &mut RgbImage, ball: &Point) {
    draw_filled_circle_mut(
      image,
      (ball.x.round() as i32, ball.y.round() as i32),
      BALL_RADIUS,
      Rgb(BALL_COLOR),
    );
  }

  fn tint(&self, image: &mut RgbImage, color: [u8; 3], alpha: f32) {
    for pixel in image.pixels_mut() {
      pixel.0 = blend(pixel.0, color, alpha);
    }
  }

  /// 单帧叠加图：篮筐、篮筐中线、球轨迹尾迹、当前球位置与判定闪烁
  pub fn draw_report(
    &self,
    report: &FrameReport,
    trail: &BallTrail,
    flash: Option<(ShotOutcome, u32)>,
  ) -> RgbImage {
    let mut image = self.canvas();

    if let Some((outcome, remaining)) = flash {
      let alpha = FLASH_MAX_ALPHA * ShotFlash::intensity(remaining);
      self.tint(&mut image, outcome_color(outcome), alpha);
    }

    if let Some(hoop) = &report.hoop {
      self.draw_bbox(&mut image, hoop, HOOP_COLOR);
      self.draw_rim(&mut image, hoop);
    }

    if let Some(shot) = &report.shot {
      self.draw_path(&mut image, &shot.trajectory, outcome_color(shot.outcome));
    }

    self.draw_trail(&mut image, trail);

    if let Some(ball) = &report.ball {
      self.draw_ball(&mut image, ball);
    }

    image
  }

  /// 会话投篮图：每次出手的篮筐、轨迹与过筐点，按结果着色
  pub fn draw_shot_chart(&self, shots: &[ShotRecord]) -> RgbImage {
    let mut image = self.canvas();

    for shot in shots {
      self.draw_bbox(&mut image, &shot.hoop, HOOP_COLOR);
      self.draw_rim(&mut image, &shot.hoop);
    }

    for shot in shots {
      let color = outcome_color(shot.outcome);
      self.draw_path(&mut image, &shot.trajectory, color);
      if let Some(x) = shot.rim_crossing_x {
        let y = rim_height(&shot.hoop);
        draw_filled_circle_mut(&mut image, (x.round() as i32, y.round() as i32), 5, Rgb(color));
      }
    }

    image
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tracker::{Resolution, ShotFrameResult, ShotStatus};

  fn report(ball: Option<Point>, hoop: Option<BBox>) -> FrameReport {
    FrameReport {
      result: ShotFrameResult {
        frame: 1,
        status: ShotStatus::NoAction,
        makes: 0,
        attempts: 0,
        last_arc_angle: None,
        instant_speed: None,
        last_shot_average_speed: None,
        ball_to_hoop_distance: None,
        previous_outcome: None,
      },
      hoop,
      ball,
      shot: None,
    }
  }

  #[test]
  fn blend_endpoints() {
    assert_eq!(blend([0, 0, 0], [200, 100, 50], 0.0), [0, 0, 0]);
    assert_eq!(blend([0, 0, 0], [200, 100, 50], 1.0), [200, 100, 50]);
    assert_eq!(blend([0, 0, 0], [200, 100, 50], 0.5), [100, 50, 25]);
  }

  #[test]
  fn draws_ball_and_hoop() {
    let draw = Draw::with_size(320, 240);
    let image = draw.draw_report(
      &report(
        Some(Point::new(40.0, 40.0)),
        Some(BBox::new(100.0, 100.0, 200.0, 150.0)),
      ),
      &BallTrail::default(),
      None,
    );
    assert_eq!(image.dimensions(), (320, 240));
    assert_eq!(image.get_pixel(40, 40).0, BALL_COLOR);
    assert_eq!(image.get_pixel(100, 120).0, HOOP_COLOR);
    assert_eq!(image.get_pixel(10, 200).0, BACKGROUND_COLOR);
  }

  #[test]
  fn flash_tints_background() {
    let draw = Draw::with_size(16, 16);
    let image = draw.draw_report(
      &report(None, None),
      &BallTrail::default(),
      Some((ShotOutcome::Made, 15)),
    );
    assert_ne!(image.get_pixel(0, 0).0, BACKGROUND_COLOR);
  }

  #[test]
  fn boxes_outside_canvas_are_clipped() {
    let draw = Draw::with_size(64, 64);
    let shot = ShotRecord {
      outcome: ShotOutcome::Missed,
      resolution: Resolution::Scored,
      up_frame: 1,
      down_frame: Some(3),
      resolved_frame: 3,
      hoop: BBox::new(-50.0, 40.0, 500.0, 90.0),
      trajectory: vec![
        TrackPoint::new(Point::new(-10.0, -10.0), 1),
        TrackPoint::new(Point::new(300.0, 300.0), 2),
      ],
      rim_crossing_x: Some(1000.0),
      arc_angle: None,
      average_speed: None,
    };
    let image = draw.draw_shot_chart(&[shot]);
    assert_eq!(image.dimensions(), (64, 64));
  }
}
